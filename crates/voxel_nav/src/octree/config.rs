//! OctreeConfig - volume placement, depth limit, and grading switch.

use glam::Vec3;

/// Configuration for an octree occupancy index.
#[derive(Clone, Copy, Debug)]
pub struct OctreeConfig {
  /// Edge length of the cubic volume in world units.
  pub size: f32,
  /// Minimum corner of the volume in world space.
  pub origin: Vec3,
  /// Maximum subdivision depth; finest cells are `size / 2^max_level` wide.
  pub max_level: i32,
  /// Enforce the graded invariant (face-adjacent leaves differ by <= 1
  /// level) incrementally during refinement.
  pub graded: bool,
}

impl OctreeConfig {
  /// Create a config for a cube centered on `center`.
  pub fn centered(center: Vec3, size: f32, max_level: i32) -> Self {
    Self {
      size,
      origin: center - Vec3::splat(size * 0.5),
      max_level,
      ..Self::default()
    }
  }

  /// Cell edge length at a given level.
  #[inline]
  pub fn cell_size(&self, level: i32) -> f32 {
    self.size / (1u64 << level) as f32
  }

  /// Edge length of the finest cells.
  #[inline]
  pub fn finest_cell_size(&self) -> f32 {
    self.cell_size(self.max_level)
  }

  /// Number of finest cells per axis.
  #[inline]
  pub fn cells_per_axis(&self) -> i32 {
    1 << self.max_level
  }
}

impl Default for OctreeConfig {
  fn default() -> Self {
    Self {
      size: 16.0,
      origin: Vec3::splat(-8.0),
      max_level: 8,
      graded: true,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
