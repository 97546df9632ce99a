//! BoundForge Core - contracts and types for branch-and-bound search
//!
//! This crate provides the fundamental abstractions the engine is built on:
//! - `Sense` and `Candidate` for direction-agnostic objective comparison
//! - `Instance` for immutable problem data
//! - `Fixings` and `SearchNode` describing points of the search tree
//! - `RelaxationOracle` with its scoped apply/solve/remove cycle
//! - Branching and repair hook traits
//! - Error types shared by every BoundForge crate

pub mod candidate;
pub mod error;
pub mod fixing;
pub mod hooks;
pub mod instance;
pub mod node;
pub mod oracle;
pub mod sense;

pub use candidate::Candidate;
pub use error::{BackendError, BoundForgeError, BranchError, Result};
pub use fixing::Fixings;
pub use hooks::{Branches, BranchingRule, RepairHeuristic};
pub use instance::Instance;
pub use node::{NodeId, SearchNode};
pub use oracle::{FixingScope, Outcome, RelaxationOracle};
pub use sense::Sense;
