//! Configuration system for BoundForge.
//!
//! Load engine configuration from TOML or YAML files to control node
//! selection, limits and tolerances without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use boundforge_config::{EngineConfig, NodeSelection};
//! use std::time::Duration;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     selection_policy = "best_bound"
//!     optimality_tolerance = 1e-4
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!     node_count_limit = 100000
//! "#).unwrap();
//!
//! assert_eq!(config.selection_policy, NodeSelection::BestBound);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! assert_eq!(config.max_nodes(), Some(100_000));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use boundforge_config::EngineConfig;
//!
//! let config = EngineConfig::load("boundforge.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use boundforge_core::BoundForgeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default relative gap at which the search stops as optimal.
pub const DEFAULT_OPTIMALITY_TOLERANCE: f64 = 1e-6;

/// Default absolute gap at which the search stops as optimal.
pub const DEFAULT_ABSOLUTE_TOLERANCE: f64 = 1e-9;

/// Default number of explored nodes between progress log lines.
pub const DEFAULT_LOG_FREQUENCY: u64 = 1000;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for BoundForgeError {
    fn from(err: ConfigError) -> Self {
        BoundForgeError::Config(err.to_string())
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Order in which pending nodes are explored.
    #[serde(default)]
    pub selection_policy: NodeSelection,

    /// Limits on the search.
    #[serde(default)]
    pub termination: TerminationConfig,

    /// Relative gap between best pending bound and incumbent at which the
    /// search stops as optimal.
    #[serde(default = "default_optimality_tolerance")]
    pub optimality_tolerance: f64,

    /// Absolute gap at which the search stops as optimal.
    #[serde(default = "default_absolute_tolerance")]
    pub absolute_tolerance: f64,

    /// Worker threads for parallel exploration.
    #[serde(default)]
    pub thread_count: ThreadCount,

    /// Explored nodes between progress log lines.
    #[serde(default = "default_log_frequency")]
    pub log_frequency: u64,
}

fn default_optimality_tolerance() -> f64 {
    DEFAULT_OPTIMALITY_TOLERANCE
}

fn default_absolute_tolerance() -> f64 {
    DEFAULT_ABSOLUTE_TOLERANCE
}

fn default_log_frequency() -> u64 {
    DEFAULT_LOG_FREQUENCY
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection_policy: NodeSelection::default(),
            termination: TerminationConfig::default(),
            optimality_tolerance: DEFAULT_OPTIMALITY_TOLERANCE,
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            thread_count: ThreadCount::default(),
            log_frequency: DEFAULT_LOG_FREQUENCY,
        }
    }
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the node selection policy.
    pub fn with_selection_policy(mut self, policy: NodeSelection) -> Self {
        self.selection_policy = policy;
        self
    }

    /// Sets the wall-clock time limit, rounded up to whole milliseconds.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        let millis = u64::try_from(limit.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);
        self.termination.seconds_spent_limit = None;
        self.termination.millis_spent_limit = Some(millis);
        self
    }

    /// Sets the maximum number of explored nodes.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.termination.node_count_limit = Some(nodes);
        self
    }

    /// Sets the relative optimality gap tolerance.
    pub fn with_optimality_tolerance(mut self, tol: f64) -> Self {
        self.optimality_tolerance = tol;
        self
    }

    /// Sets the absolute optimality gap tolerance.
    pub fn with_absolute_tolerance(mut self, tol: f64) -> Self {
        self.absolute_tolerance = tol;
        self
    }

    /// Sets the worker thread count.
    pub fn with_thread_count(mut self, threads: ThreadCount) -> Self {
        self.thread_count = threads;
        self
    }

    /// Sets the progress log frequency.
    pub fn with_log_frequency(mut self, nodes: u64) -> Self {
        self.log_frequency = nodes;
        self
    }

    /// Returns the wall-clock time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.time_limit()
    }

    /// Returns the explored-node cap, if configured.
    pub fn max_nodes(&self) -> Option<u64> {
        self.termination.node_count_limit
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for negative or non-finite
    /// tolerances, a zero thread count or a zero log frequency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_tolerance("optimality_tolerance", self.optimality_tolerance)?;
        check_tolerance("absolute_tolerance", self.absolute_tolerance)?;
        if self.thread_count == ThreadCount::Count(0) {
            return Err(ConfigError::Invalid(
                "thread_count must be at least 1".to_string(),
            ));
        }
        if self.log_frequency == 0 {
            return Err(ConfigError::Invalid(
                "log_frequency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn check_tolerance(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be a finite, non-negative number (got {value})"
        )))
    }
}

/// Node selection strategy for the B&B tree.
///
/// Among nodes of equal priority the one pushed first is selected first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelection {
    /// Node with the most favorable known bound first.
    BestBound,

    /// Most recently pushed node first.
    #[default]
    DepthFirst,

    /// Shallowest node first.
    BreadthFirst,
}

impl fmt::Display for NodeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSelection::BestBound => write!(f, "BestBound"),
            NodeSelection::DepthFirst => write!(f, "DepthFirst"),
            NodeSelection::BreadthFirst => write!(f, "BreadthFirst"),
        }
    }
}

/// Worker thread count configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// One worker per available CPU.
    #[default]
    Auto,

    /// Specific number of workers.
    Count(usize),
}

impl ThreadCount {
    /// Resolves to a concrete number of workers (at least 1).
    pub fn resolve(&self) -> usize {
        match self {
            ThreadCount::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            ThreadCount::Count(n) => (*n).max(1),
        }
    }
}

/// Termination configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum milliseconds to spend solving (added to the seconds limit).
    pub millis_spent_limit: Option<u64>,

    /// Maximum number of nodes to explore.
    pub node_count_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        match (self.seconds_spent_limit, self.millis_spent_limit) {
            (None, None) => None,
            (secs, millis) => Some(
                Duration::from_secs(secs.unwrap_or(0))
                    + Duration::from_millis(millis.unwrap_or(0)),
            ),
        }
    }
}
