//! Scriptorium Graph
//!
//! This crate turns a flat list of task declarations into a validated
//! dependency graph with a deterministic execution order.
//!
//! Validation happens entirely at build time, before any task executes:
//! - duplicate task ids are rejected
//! - every prerequisite must reference a task in the same set
//! - cycles are rejected, with the offending path reported
//!
//! The topological order breaks ties by declaration order, so two runs over
//! the same declarations always execute tasks in the same sequence.

mod error;
mod graph;

pub use error::GraphError;
pub use graph::TaskGraph;
