use serde::Deserialize;
use std::path::PathBuf;

/// Default bound on the matching pair graph's node count.
pub(crate) const DEFAULT_MPG_NODE_LIMIT: usize = 120;

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The main configuration section for lockwise.
    pub lockwise: LockwiseConfig,
    /// The path to the configuration file this was loaded from.
    /// `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
/// Configuration options for lockwise, as written in `.lockwise.toml`.
pub struct LockwiseConfig {
    /// Names of lock-acquisition functions.
    pub acquire_functions: Option<Vec<String>>,
    /// Names of lock-release functions.
    pub release_functions: Option<Vec<String>>,
    /// Acquire functions whose success depends on the returned value
    /// (try-lock style).
    pub multi_state_functions: Option<Vec<String>>,
    /// Regex restricting which resource signatures are verified.
    pub signature_query: Option<String>,
    /// Bound on the matching pair graph's node count.
    pub mpg_node_limit: Option<usize>,
    /// Whether branch-feasibility filtering runs.
    pub feasibility: Option<bool>,
    /// Functions known to defeat precise analysis; envelopes touching them
    /// are skipped.
    pub excluded_functions: Option<Vec<String>>,
    /// Persisted feasibility cache file.
    pub feasibility_cache: Option<PathBuf>,
}

/// Fully-resolved configuration for one verification run, threaded
/// explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Names of lock-acquisition functions.
    pub acquire_functions: Vec<String>,
    /// Names of lock-release functions.
    pub release_functions: Vec<String>,
    /// Try-lock style acquire functions.
    pub multi_state_functions: Vec<String>,
    /// Regex source restricting verified signatures; `None` verifies all.
    pub signature_query: Option<String>,
    /// Bound on the envelope's node count.
    pub mpg_node_limit: usize,
    /// Whether branch-feasibility filtering runs.
    pub feasibility_enabled: bool,
    /// Envelope exclusion list.
    pub excluded_functions: Vec<String>,
    /// Persisted feasibility cache file.
    pub feasibility_cache: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            acquire_functions: vec![
                "pthread_mutex_lock".to_owned(),
                "pthread_spin_lock".to_owned(),
            ],
            release_functions: vec![
                "pthread_mutex_unlock".to_owned(),
                "pthread_spin_unlock".to_owned(),
            ],
            multi_state_functions: vec![
                "pthread_mutex_trylock".to_owned(),
                "pthread_spin_trylock".to_owned(),
            ],
            signature_query: None,
            mpg_node_limit: DEFAULT_MPG_NODE_LIMIT,
            feasibility_enabled: true,
            excluded_functions: Vec::new(),
            feasibility_cache: None,
        }
    }
}

impl LockwiseConfig {
    /// Resolves file-level options into a [`RunConfig`], filling gaps with
    /// the built-in pthread defaults.
    #[must_use]
    pub fn resolve(&self) -> RunConfig {
        let defaults = RunConfig::default();
        RunConfig {
            acquire_functions: self
                .acquire_functions
                .clone()
                .unwrap_or(defaults.acquire_functions),
            release_functions: self
                .release_functions
                .clone()
                .unwrap_or(defaults.release_functions),
            multi_state_functions: self
                .multi_state_functions
                .clone()
                .unwrap_or(defaults.multi_state_functions),
            signature_query: self.signature_query.clone(),
            mpg_node_limit: self.mpg_node_limit.unwrap_or(DEFAULT_MPG_NODE_LIMIT),
            feasibility_enabled: self.feasibility.unwrap_or(true),
            excluded_functions: self.excluded_functions.clone().unwrap_or_default(),
            feasibility_cache: self.feasibility_cache.clone(),
        }
    }
}
