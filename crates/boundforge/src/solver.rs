//! One-call entry points that hide the engine wiring.

use std::path::Path;

use boundforge_config::{ConfigError, EngineConfig};
use boundforge_core::{
    BranchingRule, Candidate, Instance, RelaxationOracle, RepairHeuristic, Result,
};
use boundforge_solver::{Engine, SearchStats, SolverStatus, TerminationReason};
use tracing::warn;

/// Default configuration file looked up by [`load_config`].
pub const CONFIG_FILE: &str = "boundforge.toml";

/// Everything a finished search reports.
#[derive(Debug, Clone)]
pub struct SolveReport<A> {
    pub status: SolverStatus,
    pub reason: Option<TerminationReason>,
    pub solution: Option<Candidate<A>>,
    pub best_bound: Option<f64>,
    pub stats: SearchStats,
}

impl<A> SolveReport<A> {
    /// Objective value of the solution, if one was found.
    pub fn objective(&self) -> Option<f64> {
        self.solution.as_ref().map(|c| c.objective_value)
    }

    /// Returns true if the solution is proven optimal.
    pub fn is_optimal(&self) -> bool {
        self.status == SolverStatus::Optimal
    }

    fn from_engine<I, O, B, H, P, T>(engine: Engine<'_, I, O, B, H, P, T>) -> Self
    where
        O: RelaxationOracle<Assignment = A>,
        P: boundforge_solver::SelectionPolicy,
    {
        let status = engine.status();
        let reason = engine.termination_reason();
        let best_bound = engine.best_bound();
        let stats = engine.stats().clone();
        SolveReport {
            status,
            reason,
            solution: engine.into_solution(),
            best_bound,
            stats,
        }
    }
}

/// Loads the engine configuration from `path`, falling back to defaults.
///
/// A missing file silently yields the defaults; an unreadable or malformed
/// one is logged before falling back.
pub fn load_config(path: impl AsRef<Path>) -> EngineConfig {
    match EngineConfig::load(path.as_ref()) {
        Ok(config) => config,
        Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            EngineConfig::default()
        }
        Err(err) => {
            warn!(
                event = "config_fallback",
                path = %path.as_ref().display(),
                error = %err,
                "Using default engine configuration"
            );
            EngineConfig::default()
        }
    }
}

/// Solves `instance` on the calling thread.
///
/// # Errors
///
/// Returns the configuration or instance error that stopped the engine
/// from starting. Failures during the search are reported in the
/// [`SolveReport`] instead.
pub fn solve<I, O, B, H>(
    instance: &I,
    oracle: O,
    brancher: B,
    repair: H,
    config: EngineConfig,
) -> Result<SolveReport<O::Assignment>>
where
    I: Instance,
    O: RelaxationOracle,
    B: BranchingRule<I, O>,
    H: RepairHeuristic<I, O>,
{
    #[cfg(feature = "console")]
    crate::console::init();

    let mut engine = Engine::new(instance, oracle, brancher, config)?.with_repair(repair);
    engine.solve();
    Ok(SolveReport::from_engine(engine))
}

/// Solves `instance` on `config.thread_count` worker threads.
///
/// # Errors
///
/// Same as [`solve`].
pub fn solve_parallel<I, O, B, H>(
    instance: &I,
    oracle: O,
    brancher: B,
    repair: H,
    config: EngineConfig,
) -> Result<SolveReport<O::Assignment>>
where
    I: Instance + Sync,
    O: RelaxationOracle + Clone + Send,
    O::Var: Send,
    O::Value: Send,
    O::Assignment: Send,
    B: BranchingRule<I, O> + Sync,
    H: RepairHeuristic<I, O> + Sync,
{
    #[cfg(feature = "console")]
    crate::console::init();

    let mut parallel = Engine::new(instance, oracle, brancher, config)?
        .with_repair(repair)
        .into_parallel();
    parallel.solve();
    Ok(SolveReport::from_engine(parallel.into_engine()))
}
