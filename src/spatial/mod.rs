//! Spatial queries and density-based splat sizing.
//!
//! - `kdtree`: a 3-d k-d tree over point positions with a
//!   nearest-neighbor-excluding-self query
//! - `sizing`: per-point autosize scale factors from nearest-neighbor
//!   spacing

mod kdtree;
mod sizing;

// Re-export public types and functions
pub use kdtree::KdTree;
pub use sizing::{autosize_scales, nearest_neighbor_distances};
