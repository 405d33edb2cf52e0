//! Graded octree occupancy index.
//!
//! A perfect 2x2x2 recursive subdivision of a cubic region. Cells live in an
//! arena owned by the tree; parent/child links are arena ids, so there are no
//! reference cycles. Refinement is monotonic: cells are created lazily when a
//! primitive is rasterized and never deleted.
//!
//! # Grading
//!
//! In graded mode (the default), whenever a cell first gains children its six
//! face neighbors are forced to refine until they are at most one level
//! coarser. The resulting "face-adjacent leaves differ by at most one level"
//! invariant is what makes the corner navigation graph topologically sound.
//!
//! # Module structure
//!
//! - [`cell`]: arena cell and id types, octant/face offset tables
//! - [`config`]: volume placement, depth limit, grading switch
//! - [`tree`]: the index itself - refinement, lookup, occupancy queries
//! - [`line_of_sight`]: supercover segment query over the finest grid

pub mod cell;
pub mod config;
pub mod line_of_sight;
pub mod tree;

pub use cell::{Cell, CellId, CHILD_OFFSETS, FACE_OFFSETS};
pub use config::OctreeConfig;
pub use tree::Octree;
