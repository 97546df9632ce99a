//! BoundForge - A generic branch-and-bound engine in Rust
//!
//! Supply an [`Instance`], a [`RelaxationOracle`] and a [`BranchingRule`];
//! the engine supplies node selection, pruning, incumbent tracking and
//! termination.
//!
//! # Example
//!
//! ```rust
//! use boundforge::prelude::*;
//! use boundforge_test::knapsack::{KnapsackBrancher, KnapsackInstance, KnapsackOracle, RoundDownRepair};
//!
//! let instance = KnapsackInstance::new(vec![3.0, 4.0, 5.0, 6.0], vec![2.0, 3.0, 4.0, 5.0], 5.0);
//! let report = boundforge::solve(
//!     &instance,
//!     KnapsackOracle::new(&instance),
//!     KnapsackBrancher,
//!     RoundDownRepair,
//!     EngineConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(report.status, SolverStatus::Optimal);
//! assert_eq!(report.objective(), Some(7.0));
//! ```

// Domain contracts
pub use boundforge_core::{
    BackendError, BoundForgeError, BranchError, Branches, BranchingRule, Candidate, FixingScope,
    Fixings, Instance, NodeId, Outcome, RelaxationOracle, RepairHeuristic, Result, SearchNode,
    Sense,
};

// Configuration
pub use boundforge_config::{ConfigError, EngineConfig, NodeSelection, TerminationConfig, ThreadCount};

// Engine
pub use boundforge_solver::{
    Engine, Incumbent, ParallelEngine, SearchScope, SearchStats, SelectionPolicy, SolverStatus,
    TerminationReason,
};

/// Termination conditions usable with [`Engine::with_termination`].
pub mod termination {
    pub use boundforge_solver::termination::*;
}

#[cfg(feature = "console")]
pub mod console;

mod solver;
pub use solver::{load_config, solve, solve_parallel, SolveReport, CONFIG_FILE};

pub mod prelude {
    pub use super::{
        Branches, BranchingRule, Candidate, EngineConfig, Fixings, Instance, NodeSelection,
        Outcome, RelaxationOracle, RepairHeuristic, SearchNode, Sense, SolverStatus,
        TerminationReason, ThreadCount,
    };
    pub use super::{Engine, ParallelEngine};
}
