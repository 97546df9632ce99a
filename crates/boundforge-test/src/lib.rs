//! Shared test fixtures for BoundForge crates.
//!
//! This crate provides small problems with complete hook implementations,
//! plus a brute-force solver to check the engine against.
//!
//! - [`knapsack`] - 0-1 knapsack (maximize) with a greedy fractional bound
//! - [`covering`] - weighted set cover (minimize)
//! - [`brute`] - exhaustive enumeration of both problems under fixings
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! boundforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use boundforge_test::knapsack::{KnapsackBrancher, KnapsackInstance, KnapsackOracle};
//! use boundforge_test::brute;
//! ```

pub mod brute;
pub mod covering;
pub mod knapsack;

pub use covering::{CoveringBrancher, CoveringInstance, CoveringOracle, GreedyCoverRepair};
pub use knapsack::{KnapsackBrancher, KnapsackInstance, KnapsackOracle, RoundDownRepair};
