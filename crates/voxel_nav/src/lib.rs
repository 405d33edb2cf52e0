//! voxel_nav - engine-independent 3-D navigation over voxelized space
//!
//! This crate builds a graded octree occupancy index over a cubic volume of
//! space, derives a navigation graph from it, and answers shortest-path and
//! line-of-sight queries against the pair. It is the spatial reasoning core
//! for agents flying through static obstacle fields; rendering, steering and
//! scene loading live in the consuming application.
//!
//! # Features
//!
//! - **Graded octree**: 2x2x2 recursive occupancy index where face-adjacent
//!   leaves never differ by more than one subdivision level
//! - **Center / corner navigation graphs**: waypoint nodes at cell centroids
//!   or deduplicated cell corners, with connected-component labels
//! - **A\*, Theta\*, Lazy Theta\***: label-correcting search with any-angle
//!   smoothing, amortized across multiple destinations per query
//! - **Supercover line of sight**: integer grid walk visiting every voxel a
//!   segment passes through, at cell or half-cell resolution
//!
//! # Example
//!
//! ```ignore
//! use glam::Vec3;
//! use voxel_nav::{Algorithm, Octree, OctreeConfig};
//!
//! // Index the scene geometry, inflated by the agent radius.
//! let tree = Octree::build_from_triangles(OctreeConfig::default(), &triangles, 0.1);
//!
//! // Derive a corner graph (supports any-angle smoothing at cell boundaries).
//! let mut graph = tree.to_corner_graph();
//!
//! // One source, many destinations, mixed outcomes.
//! let paths = graph.find_path(Algorithm::LazyThetaStar, source, &destinations, &tree);
//! for path in paths.iter().flatten() {
//!   println!("{} waypoints", path.len());
//! }
//! ```

pub mod predicates;

pub mod octree;
pub use octree::{Cell, CellId, Octree, OctreeConfig};

// 2-D analogue of the occupancy index.
pub mod quadtree;
pub use quadtree::{Quadtree, QuadtreeConfig};

pub mod graph;
pub use graph::{NavArc, NavGraph, NavNode};

pub mod search;
pub use search::{path_length, Algorithm};
