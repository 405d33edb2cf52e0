//! Octree - the occupancy index.
//!
//! Pure queries over a persistent structure, plus monotonic refinement
//! operations. Refinement descends from the root, subdividing every cell
//! that intersects the rasterized primitive, marking finest-level leaves as
//! blocked and OR-ing `contains_blocked` into every cell visited on the way
//! down (children exactly partition their parent, so an intersecting cell
//! always yields at least one intersecting finest-level descendant).

use glam::Vec3;

use super::cell::{Cell, CellId, CHILD_OFFSETS, FACE_OFFSETS};
use super::config::OctreeConfig;
use crate::predicates;

/// Primitive being rasterized into the index.
enum Primitive {
  Point(Vec3),
  Sphere { center: Vec3, radius: f32 },
  Triangle([Vec3; 3]),
}

/// Graded octree occupancy index over a cubic volume.
pub struct Octree {
  config: OctreeConfig,
  cells: Vec<Cell>,
}

impl Octree {
  /// Create an empty index: a single free root cell.
  pub fn new(config: OctreeConfig) -> Self {
    Self {
      config,
      cells: vec![Cell::new(0, [0, 0, 0], None)],
    }
  }

  /// Build an index from triangle soup, inflating each triangle by `margin`
  /// along its face normal (agent-radius safety expansion).
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "octree::build_from_triangles")
  )]
  pub fn build_from_triangles(config: OctreeConfig, triangles: &[[Vec3; 3]], margin: f32) -> Self {
    let mut tree = Self::new(config);
    for tri in triangles {
      tree.divide_triangle(tri, true);
      if margin > 0.0 {
        let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
        if normal != Vec3::ZERO {
          let offset = normal * margin;
          tree.divide_triangle(&[tri[0] + offset, tri[1] + offset, tri[2] + offset], true);
          tree.divide_triangle(&[tri[0] - offset, tri[1] - offset, tri[2] - offset], true);
        }
      }
    }
    tree
  }

  /// The configuration this index was built with.
  #[inline]
  pub fn config(&self) -> &OctreeConfig {
    &self.config
  }

  /// Arena id of the root cell.
  #[inline]
  pub fn root(&self) -> CellId {
    CellId(0)
  }

  /// Access a cell by id.
  #[inline]
  pub fn cell(&self, id: CellId) -> &Cell {
    &self.cells[id.index()]
  }

  /// Number of cells in the arena.
  #[inline]
  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  /// Iterate over the ids of all cells.
  pub fn cell_ids(&self) -> impl Iterator<Item = CellId> {
    (0..self.cells.len() as u32).map(CellId)
  }

  /// Iterate over the ids of all leaves free of obstacles.
  pub fn free_leaves(&self) -> impl Iterator<Item = CellId> + '_ {
    self
      .cell_ids()
      .filter(|&id| self.cell(id).is_free_leaf())
  }

  /// World-space minimum corner of a cell.
  #[inline]
  pub fn cell_min(&self, id: CellId) -> Vec3 {
    let cell = self.cell(id);
    let size = self.config.cell_size(cell.level);
    self.config.origin
      + Vec3::new(
        cell.index[0] as f32 * size,
        cell.index[1] as f32 * size,
        cell.index[2] as f32 * size,
      )
  }

  /// World-space center of a cell.
  #[inline]
  pub fn cell_center(&self, id: CellId) -> Vec3 {
    let size = self.config.cell_size(self.cell(id).level);
    self.cell_min(id) + Vec3::splat(size * 0.5)
  }

  /// Edge length of a cell.
  #[inline]
  pub fn cell_size(&self, id: CellId) -> f32 {
    self.config.cell_size(self.cell(id).level)
  }

  /// Map a world position to its finest-grid integer coordinate.
  ///
  /// The result may be out of range for positions outside the volume;
  /// occupancy queries treat that per their `outside_is_blocked` flag.
  #[inline]
  pub fn position_to_index(&self, p: Vec3) -> [i32; 3] {
    let inv = 1.0 / self.config.finest_cell_size();
    let rel = p - self.config.origin;
    [
      (rel.x * inv).floor() as i32,
      (rel.y * inv).floor() as i32,
      (rel.z * inv).floor() as i32,
    ]
  }

  /// Find the cell at `(index, level)`, descending from the root by integer
  /// shifts.
  ///
  /// Returns the coarsest existing cell along the path when deeper cells
  /// were never created: a result whose level is less than requested means
  /// the region is uniformly free (or blocked) at coarser granularity.
  /// `None` when the coordinate is outside the volume.
  pub fn find(&self, index: [i32; 3], level: i32) -> Option<CellId> {
    let extent = 1i32 << level;
    if index.iter().any(|&i| i < 0 || i >= extent) {
      return None;
    }
    let mut id = self.root();
    for depth in 0..level {
      let Some(children) = self.cell(id).children else {
        return Some(id);
      };
      let shift = level - depth - 1;
      let octant = (((index[0] >> shift) & 1)
        | (((index[1] >> shift) & 1) << 1)
        | (((index[2] >> shift) & 1) << 2)) as usize;
      id = children[octant];
    }
    Some(id)
  }

  /// Check whether the finest-grid cell at `index` is obstacle-occupied.
  ///
  /// Descends only while an ancestor still reports a blocked descendant;
  /// most of an empty volume short-circuits at the first level or two.
  pub fn is_blocked(&self, index: [i32; 3], outside_is_blocked: bool) -> bool {
    let extent = self.config.cells_per_axis();
    if index.iter().any(|&i| i < 0 || i >= extent) {
      return outside_is_blocked;
    }
    let mut id = self.root();
    for depth in 0..self.config.max_level {
      let cell = self.cell(id);
      if !cell.contains_blocked {
        return false;
      }
      let Some(children) = cell.children else {
        // A childless cell still reporting a blocked descendant is a
        // maximal-refinement obstacle leaf.
        return cell.blocked;
      };
      let shift = self.config.max_level - depth - 1;
      let octant = (((index[0] >> shift) & 1)
        | (((index[1] >> shift) & 1) << 1)
        | (((index[2] >> shift) & 1) << 2)) as usize;
      id = children[octant];
    }
    let cell = self.cell(id);
    debug_assert!(
      cell.blocked == cell.contains_blocked,
      "finest-level leaf flags must agree"
    );
    cell.blocked
  }

  /// `is_blocked` against a coordinate on the doubled-resolution grid, as
  /// used by corner-resolution line-of-sight (nodes sit on cell corners, so
  /// adjacency must resolve half-cell offsets). Arithmetic shift floors
  /// negative coordinates onto the correct finest cell.
  #[inline]
  pub fn is_blocked_double(&self, index: [i32; 3], outside_is_blocked: bool) -> bool {
    self.is_blocked(
      [index[0] >> 1, index[1] >> 1, index[2] >> 1],
      outside_is_blocked,
    )
  }

  /// Refine every cell containing `p` down to max depth, optionally marking
  /// the resulting leaf as blocked.
  pub fn divide_point(&mut self, p: Vec3, mark_blocked: bool) {
    self.divide(self.root(), &Primitive::Point(p), mark_blocked);
  }

  /// Refine every cell intersecting the sphere down to max depth.
  pub fn divide_sphere(&mut self, center: Vec3, radius: f32, mark_blocked: bool) {
    self.divide(self.root(), &Primitive::Sphere { center, radius }, mark_blocked);
  }

  /// Refine every cell intersecting the triangle down to max depth.
  pub fn divide_triangle(&mut self, triangle: &[Vec3; 3], mark_blocked: bool) {
    self.divide(self.root(), &Primitive::Triangle(*triangle), mark_blocked);
  }

  fn cell_intersects(&self, id: CellId, primitive: &Primitive) -> bool {
    let min = self.cell_min(id);
    let max = min + Vec3::splat(self.cell_size(id));
    match primitive {
      Primitive::Point(p) => predicates::point_in_aabb(*p, min, max),
      Primitive::Sphere { center, radius } => {
        predicates::sphere_intersects_aabb(*center, *radius, min, max)
      }
      Primitive::Triangle([a, b, c]) => predicates::triangle_intersects_aabb(*a, *b, *c, min, max),
    }
  }

  fn divide(&mut self, id: CellId, primitive: &Primitive, mark_blocked: bool) {
    if !self.cell_intersects(id, primitive) {
      return;
    }
    let level = self.cell(id).level;
    if level < self.config.max_level {
      self.create_children(id);
      if mark_blocked {
        self.cells[id.index()].contains_blocked = true;
      }
      let children = self.cell(id).children.unwrap();
      for child in children {
        self.divide(child, primitive, mark_blocked);
      }
    } else {
      let cell = &mut self.cells[id.index()];
      cell.blocked |= mark_blocked;
      cell.contains_blocked |= mark_blocked;
    }
  }

  /// Give a cell its 8 children if it does not have them yet.
  ///
  /// In graded mode, a cell that first gains children also forces each of
  /// its 6 face neighbors to refine one step whenever the neighbor is
  /// coarser, which keeps the grading invariant without a second pass.
  pub(crate) fn create_children(&mut self, id: CellId) {
    if self.cell(id).children.is_some() {
      return;
    }
    let (level, index) = {
      let cell = self.cell(id);
      (cell.level, cell.index)
    };
    debug_assert!(
      level < self.config.max_level,
      "cannot subdivide past max_level"
    );

    let mut children = [CellId(0); 8];
    for (octant, offset) in CHILD_OFFSETS.iter().enumerate() {
      let child_index = [
        index[0] * 2 + offset[0],
        index[1] * 2 + offset[1],
        index[2] * 2 + offset[2],
      ];
      let child_id = CellId(self.cells.len() as u32);
      self.cells.push(Cell::new(level + 1, child_index, Some(id)));
      children[octant] = child_id;
    }
    self.cells[id.index()].children = Some(children);

    if self.config.graded && level > 0 {
      for dir in FACE_OFFSETS {
        let neighbor = [index[0] + dir[0], index[1] + dir[1], index[2] + dir[2]];
        if let Some(found) = self.find(neighbor, level) {
          if self.cell(found).level < level {
            self.create_children(found);
          }
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
