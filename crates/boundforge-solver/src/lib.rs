//! BoundForge Solver Engine
//!
//! This crate provides the branch-and-bound search including:
//! - Sequential `Engine` and multi-threaded `ParallelEngine`
//! - Node queue with arena storage and pluggable selection policies
//! - Incumbent tracking, shared across threads when solving in parallel
//! - Termination conditions (node count, time, gap, cancellation)
//! - Search statistics

pub mod arena;
pub mod engine;
pub mod incumbent;
pub mod parallel;
pub(crate) mod process;
pub mod queue;
pub mod scope;
pub mod selection;
pub mod stats;
pub mod status;
pub mod termination;

pub use arena::{NodeArena, NodeHandle};
pub use engine::Engine;
pub use incumbent::{Incumbent, IncumbentStore, SharedIncumbent};
pub use parallel::ParallelEngine;
pub use queue::NodeQueue;
pub use scope::{relative_gap, SearchScope};
pub use selection::{NodeInfo, NodeSelection, SelectionPolicy};
pub use stats::SearchStats;
pub use status::{SolverStatus, TerminationReason};
pub use termination::{
    AndTermination, ExternalTermination, GapTermination, NoTermination, NodeCountTermination,
    OrTermination, Termination, TimeTermination,
};
