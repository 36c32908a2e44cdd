//! Derived views of a graph and its dominating-set solution.

mod adjacency;
mod coverage;

pub use adjacency::AdjacencyIndex;
pub use coverage::{CoverageEntry, CoverageModel, describe_node};
