use clap::Parser;
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.lockwise.toml):
  Create this file next to the graph file (or in any ancestor directory)
  to set defaults.

  [lockwise]
  acquire_functions = [\"pthread_mutex_lock\", \"pthread_spin_lock\"]
  release_functions = [\"pthread_mutex_unlock\", \"pthread_spin_unlock\"]
  multi_state_functions = [\"pthread_mutex_trylock\", \"pthread_spin_trylock\"]
  signature_query = \"^&g_\"        # regex over lock-argument text
  mpg_node_limit = 120             # envelope size bound
  feasibility = true               # branch-feasibility filtering
  excluded_functions = [\"longjmp_dispatch\"]
  feasibility_cache = \".lockwise-feasibility\"
";

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Lockwise - interprocedural lock/unlock pairing verification for C codebases",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// Program graph file produced by the C indexer (JSON).
    pub graph: PathBuf,

    /// Lock-acquisition function names (overrides config).
    #[arg(long = "acquire")]
    pub acquire_functions: Vec<String>,

    /// Lock-release function names (overrides config).
    #[arg(long = "release")]
    pub release_functions: Vec<String>,

    /// Try-style acquire function names whose success depends on the
    /// returned value (overrides config).
    #[arg(long = "multi-state")]
    pub multi_state_functions: Vec<String>,

    /// Regex restricting which resource signatures are verified.
    #[arg(long)]
    pub signature_query: Option<String>,

    /// Bound on the matching pair graph's node count; larger envelopes are
    /// skipped.
    #[arg(long)]
    pub mpg_node_limit: Option<usize>,

    /// Disable branch-feasibility filtering and keep all structural pairs.
    #[arg(long)]
    pub no_feasibility: bool,

    /// Functions whose envelopes are skipped outright.
    #[arg(long = "excluded")]
    pub excluded_functions: Vec<String>,

    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Write the verified event flow graphs to this JSON file.
    #[arg(long)]
    pub export_graphs: Option<PathBuf>,

    /// Persist feasibility verdicts between runs. Lines of the form
    /// `file:line = T|F` decide the acquisition branch of a try-style
    /// acquire site and override the built-in heuristics.
    #[arg(long)]
    pub feasibility_cache: Option<PathBuf>,
}
