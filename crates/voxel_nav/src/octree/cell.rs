//! Cell - arena-stored octree node.
//!
//! Cells are identified by `(level, index)` where `index` is the cell's
//! integer coordinate in the 2^level grid at its own level. The tree owns all
//! cells in a single arena; a cell's children and parent are arena ids.

/// Arena id of a cell. The root is always id 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellId(pub(crate) u32);

impl CellId {
  /// Arena slot of this id.
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Child octant offsets, octant bits: X (bit 0), Y (bit 1), Z (bit 2).
///
/// `child.index = parent.index * 2 + CHILD_OFFSETS[octant]`
pub const CHILD_OFFSETS: [[i32; 3]; 8] = [
  [0, 0, 0],
  [1, 0, 0],
  [0, 1, 0],
  [1, 1, 0],
  [0, 0, 1],
  [1, 0, 1],
  [0, 1, 1],
  [1, 1, 1],
];

/// Direction offsets for the 6 face neighbors.
pub const FACE_OFFSETS: [[i32; 3]; 6] = [
  [-1, 0, 0], // -X
  [1, 0, 0],  // +X
  [0, -1, 0], // -Y
  [0, 1, 0],  // +Y
  [0, 0, -1], // -Z
  [0, 0, 1],  // +Z
];

/// One octree cell.
///
/// `blocked` is set only on maximal-refinement obstacle leaves;
/// `contains_blocked` aggregates it over the whole subtree (a parent's flag
/// is the OR of its children's, maintained during refinement descent).
#[derive(Clone, Debug)]
pub struct Cell {
  /// Subdivision depth, root = 0.
  pub level: i32,
  /// Grid coordinate at this cell's own level, each axis in `0..2^level`.
  pub index: [i32; 3],
  /// Non-owning back-reference; `None` only for the root.
  pub parent: Option<CellId>,
  /// Arena ids of the 8 children, `None` for leaves.
  pub children: Option<[CellId; 8]>,
  /// Maximal-refinement obstacle leaf.
  pub blocked: bool,
  /// This cell or some descendant is blocked.
  pub contains_blocked: bool,
}

impl Cell {
  pub(crate) fn new(level: i32, index: [i32; 3], parent: Option<CellId>) -> Self {
    Self {
      level,
      index,
      parent,
      children: None,
      blocked: false,
      contains_blocked: false,
    }
  }

  /// A cell with no children is a leaf - the finest representation reached
  /// for its region.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.children.is_none()
  }

  /// A leaf whose region contains no obstacle at any depth.
  #[inline]
  pub fn is_free_leaf(&self) -> bool {
    self.is_leaf() && !self.contains_blocked
  }
}

#[cfg(test)]
#[path = "cell_test.rs"]
mod cell_test;
