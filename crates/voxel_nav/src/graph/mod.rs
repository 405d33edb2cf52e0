//! Navigation graph derived from the occupancy index.
//!
//! Permanent nodes are created once per derivation
//! ([`crate::octree::Octree::to_center_graph`] /
//! [`crate::octree::Octree::to_corner_graph`]) and live for the graph's
//! lifetime. Temporary nodes splice arbitrary query positions into the graph
//! for the duration of one path query and are bulk-purged afterwards; they
//! draw indices from a disjoint negative range so the two spaces never
//! collide.
//!
//! # Module structure
//!
//! - [`types`]: nodes, arcs, the graph container, temporary node manager
//! - [`builder`]: center/corner graph derivation and connectivity labels

pub mod builder;
pub mod types;

pub use types::{NavArc, NavGraph, NavNode, NodeLookup};
