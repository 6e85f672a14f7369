//! Matching pair graph construction.
//!
//! The MPG is the bounded call-graph envelope relevant to one resource
//! signature: every function whose callees can both acquire and release the
//! resource, bounded below by the functions directly containing the
//! acquire/release call sites.

mod builder;

pub use builder::{build_mpg, Mpg, SignatureSites, SiteRef};

#[cfg(test)]
mod tests;
