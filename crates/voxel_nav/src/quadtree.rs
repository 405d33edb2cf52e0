//! Graded quadtree - the 2-D analogue of the octree occupancy index.
//!
//! Same arena layout and grading rule as [`crate::octree`], over a square
//! region with 2x2 subdivision. Rasterizes points and segments (the 2-D
//! obstacle primitives) instead of triangles and spheres.

use glam::Vec2;

use crate::predicates;

/// Child quadrant offsets, quadrant bits: X (bit 0), Y (bit 1).
const CHILD_OFFSETS_2D: [[i32; 2]; 4] = [[0, 0], [1, 0], [0, 1], [1, 1]];

/// Direction offsets for the 4 edge neighbors.
const EDGE_OFFSETS_2D: [[i32; 2]; 4] = [[-1, 0], [1, 0], [0, -1], [0, 1]];

/// Configuration for a quadtree occupancy index.
#[derive(Clone, Copy, Debug)]
pub struct QuadtreeConfig {
  /// Edge length of the square region.
  pub size: f32,
  /// Minimum corner of the region.
  pub origin: Vec2,
  /// Maximum subdivision depth.
  pub max_level: i32,
  /// Enforce the graded invariant across edge neighbors.
  pub graded: bool,
}

impl QuadtreeConfig {
  /// Cell edge length at a given level.
  #[inline]
  pub fn cell_size(&self, level: i32) -> f32 {
    self.size / (1u64 << level) as f32
  }
}

impl Default for QuadtreeConfig {
  fn default() -> Self {
    Self {
      size: 16.0,
      origin: Vec2::splat(-8.0),
      max_level: 8,
      graded: true,
    }
  }
}

#[derive(Clone, Debug)]
struct QuadCell {
  level: i32,
  index: [i32; 2],
  children: Option<[u32; 4]>,
  blocked: bool,
  contains_blocked: bool,
}

impl QuadCell {
  fn new(level: i32, index: [i32; 2]) -> Self {
    Self {
      level,
      index,
      children: None,
      blocked: false,
      contains_blocked: false,
    }
  }
}

enum Primitive2 {
  Point(Vec2),
  Segment(Vec2, Vec2),
}

/// Graded quadtree occupancy index over a square region.
pub struct Quadtree {
  config: QuadtreeConfig,
  cells: Vec<QuadCell>,
}

impl Quadtree {
  /// Create an empty index: a single free root cell.
  pub fn new(config: QuadtreeConfig) -> Self {
    Self {
      config,
      cells: vec![QuadCell::new(0, [0, 0])],
    }
  }

  /// The configuration this index was built with.
  #[inline]
  pub fn config(&self) -> &QuadtreeConfig {
    &self.config
  }

  /// Number of cells in the arena.
  #[inline]
  pub fn cell_count(&self) -> usize {
    self.cells.len()
  }

  /// Map a position to its finest-grid integer coordinate.
  #[inline]
  pub fn position_to_index(&self, p: Vec2) -> [i32; 2] {
    let inv = 1.0 / self.config.cell_size(self.config.max_level);
    let rel = p - self.config.origin;
    [(rel.x * inv).floor() as i32, (rel.y * inv).floor() as i32]
  }

  /// Find the cell at `(index, level)`; the coarsest existing cell along the
  /// path when the region was never refined, `None` outside the region.
  pub fn find(&self, index: [i32; 2], level: i32) -> Option<u32> {
    let extent = 1i32 << level;
    if index.iter().any(|&i| i < 0 || i >= extent) {
      return None;
    }
    let mut id = 0u32;
    for depth in 0..level {
      let Some(children) = self.cells[id as usize].children else {
        return Some(id);
      };
      let shift = level - depth - 1;
      let quadrant =
        (((index[0] >> shift) & 1) | (((index[1] >> shift) & 1) << 1)) as usize;
      id = children[quadrant];
    }
    Some(id)
  }

  /// Level of a cell (test support).
  pub fn cell_level(&self, id: u32) -> i32 {
    self.cells[id as usize].level
  }

  /// Check whether the finest-grid cell at `index` is obstacle-occupied.
  pub fn is_blocked(&self, index: [i32; 2], outside_is_blocked: bool) -> bool {
    let extent = 1i32 << self.config.max_level;
    if index.iter().any(|&i| i < 0 || i >= extent) {
      return outside_is_blocked;
    }
    let mut id = 0u32;
    for depth in 0..self.config.max_level {
      let cell = &self.cells[id as usize];
      if !cell.contains_blocked {
        return false;
      }
      let Some(children) = cell.children else {
        return cell.blocked;
      };
      let shift = self.config.max_level - depth - 1;
      let quadrant =
        (((index[0] >> shift) & 1) | (((index[1] >> shift) & 1) << 1)) as usize;
      id = children[quadrant];
    }
    self.cells[id as usize].blocked
  }

  /// Refine every cell containing `p` down to max depth.
  pub fn divide_point(&mut self, p: Vec2, mark_blocked: bool) {
    self.divide(0, &Primitive2::Point(p), mark_blocked);
  }

  /// Refine every cell crossed by the segment down to max depth.
  pub fn divide_segment(&mut self, p1: Vec2, p2: Vec2, mark_blocked: bool) {
    self.divide(0, &Primitive2::Segment(p1, p2), mark_blocked);
  }

  fn cell_bounds(&self, id: u32) -> (Vec2, Vec2) {
    let cell = &self.cells[id as usize];
    let size = self.config.cell_size(cell.level);
    let min = self.config.origin + Vec2::new(cell.index[0] as f32, cell.index[1] as f32) * size;
    (min, min + Vec2::splat(size))
  }

  fn cell_intersects(&self, id: u32, primitive: &Primitive2) -> bool {
    let (min, max) = self.cell_bounds(id);
    match primitive {
      Primitive2::Point(p) => p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y,
      Primitive2::Segment(p1, p2) => predicates::segment_crosses_rect(*p1, *p2, min, max),
    }
  }

  fn divide(&mut self, id: u32, primitive: &Primitive2, mark_blocked: bool) {
    if !self.cell_intersects(id, primitive) {
      return;
    }
    let level = self.cells[id as usize].level;
    if level < self.config.max_level {
      self.create_children(id);
      if mark_blocked {
        self.cells[id as usize].contains_blocked = true;
      }
      let children = self.cells[id as usize].children.unwrap();
      for child in children {
        self.divide(child, primitive, mark_blocked);
      }
    } else {
      let cell = &mut self.cells[id as usize];
      cell.blocked |= mark_blocked;
      cell.contains_blocked |= mark_blocked;
    }
  }

  fn create_children(&mut self, id: u32) {
    if self.cells[id as usize].children.is_some() {
      return;
    }
    let (level, index) = {
      let cell = &self.cells[id as usize];
      (cell.level, cell.index)
    };
    let mut children = [0u32; 4];
    for (quadrant, offset) in CHILD_OFFSETS_2D.iter().enumerate() {
      let child_index = [index[0] * 2 + offset[0], index[1] * 2 + offset[1]];
      children[quadrant] = self.cells.len() as u32;
      self.cells.push(QuadCell::new(level + 1, child_index));
    }
    self.cells[id as usize].children = Some(children);

    if self.config.graded && level > 0 {
      for dir in EDGE_OFFSETS_2D {
        let neighbor = [index[0] + dir[0], index[1] + dir[1]];
        if let Some(found) = self.find(neighbor, level) {
          if self.cells[found as usize].level < level {
            self.create_children(found);
          }
        }
      }
    }
  }
}

#[cfg(test)]
#[path = "quadtree_test.rs"]
mod quadtree_test;
