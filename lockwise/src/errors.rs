//! Per-signature failure reasons.
//!
//! None of these abort the batch: the driver catches them at the loop
//! boundary, records the signature as skipped, and moves on.

use std::fmt;

/// Reason a signature's verification was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The matching pair graph still contains a cycle between distinct
    /// functions after self-loop pruning.
    CyclicEnvelope,
    /// A function in the envelope has a CFG node with neither predecessors
    /// nor successors.
    DisconnectedCfg {
        /// Name of the offending function.
        function: String,
    },
    /// The event flow graph builder produced an inconsistent result.
    EfgConstruction {
        /// Name of the function whose EFG failed to build.
        function: String,
        /// What went wrong.
        cause: String,
    },
    /// The matching pair graph exceeded the configured node bound.
    SizeLimit {
        /// Actual envelope size.
        size: usize,
        /// Configured bound.
        limit: usize,
    },
    /// The envelope touches a function on the exclusion list.
    ProblematicFunction {
        /// Name of the excluded function.
        name: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CyclicEnvelope => {
                write!(f, "matching pair graph is cyclic after self-loop pruning")
            }
            Self::DisconnectedCfg { function } => {
                write!(f, "function `{function}` has a disconnected CFG node")
            }
            Self::EfgConstruction { function, cause } => {
                write!(f, "event flow graph for `{function}` failed: {cause}")
            }
            Self::SizeLimit { size, limit } => {
                write!(f, "envelope has {size} functions, over the limit of {limit}")
            }
            Self::ProblematicFunction { name } => {
                write!(f, "envelope touches excluded function `{name}`")
            }
        }
    }
}

impl std::error::Error for SkipReason {}

/// Batch-level failure aborting the whole run.
#[derive(Debug)]
pub enum RunError {
    /// The signature query from the configuration is not a valid regex.
    InvalidSignatureQuery(regex::Error),
    /// The feasibility cache file could not be read or written.
    Cache(std::io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignatureQuery(e) => write!(f, "invalid signature query: {e}"),
            Self::Cache(e) => write!(f, "feasibility cache: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidSignatureQuery(e) => Some(e),
            Self::Cache(e) => Some(e),
        }
    }
}

impl From<regex::Error> for RunError {
    fn from(e: regex::Error) -> Self {
        Self::InvalidSignatureQuery(e)
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        Self::Cache(e)
    }
}
