//! Grid/agent data model, input parsing and reachability oracle for the
//! MAPF-to-MaxSAT pipeline.
//!
//! This crate owns everything upstream of the SAT encoding: the problem
//! input format, the grid and its per-cell compatible-operations table,
//! and the per-agent Dijkstra/BFS reachability oracle that the variable
//! schema in `mapf-sat` uses to prune unreachable `on` variables.

mod grid;
mod problem;
mod reachability;

pub use grid::{Grid, Op, Tile};
pub use problem::{Agent, Infeasibility, Problem, ProblemError};
pub use reachability::{Reachability, ReachabilityMode, INFINITE};
