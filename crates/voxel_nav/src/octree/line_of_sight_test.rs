use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::octree::OctreeConfig;
use crate::predicates;

fn config() -> OctreeConfig {
  OctreeConfig {
    size: 16.0,
    origin: Vec3::splat(-8.0),
    max_level: 6,
    graded: true,
  }
}

/// A populated test scene: two spheres and a slanted triangle.
fn populated_tree() -> Octree {
  let mut tree = Octree::new(config());
  tree.divide_sphere(Vec3::new(-2.0, 0.0, 0.0), 1.5, true);
  tree.divide_sphere(Vec3::new(3.0, 2.0, -1.0), 1.0, true);
  tree.divide_triangle(
    &[
      Vec3::new(0.0, -5.0, 2.0),
      Vec3::new(4.0, -5.0, 5.0),
      Vec3::new(2.0, -1.0, 3.0),
    ],
    true,
  );
  tree
}

/// Reference: scan every voxel whose closed box the segment intersects.
///
/// O(segment bounding volume), used only to validate the walk.
fn brute_force_clear(tree: &Octree, p1: Vec3, p2: Vec3, double_resolution: bool) -> bool {
  let scale = if double_resolution { 2 } else { 1 };
  let cell = tree.config().finest_cell_size() / scale as f32;
  let origin = tree.config().origin;

  let to_grid = |p: Vec3| -> [i32; 3] {
    [
      ((p.x - origin.x) / cell).floor() as i32,
      ((p.y - origin.y) / cell).floor() as i32,
      ((p.z - origin.z) / cell).floor() as i32,
    ]
  };
  let a = to_grid(p1);
  let b = to_grid(p2);
  let lo = [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])];
  let hi = [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])];

  for x in lo[0]..=hi[0] {
    for y in lo[1]..=hi[1] {
      for z in lo[2]..=hi[2] {
        let min = origin + Vec3::new(x as f32, y as f32, z as f32) * cell;
        let max = min + Vec3::splat(cell);
        if !predicates::segment_intersects_aabb(p1, p2, min, max) {
          continue;
        }
        let blocked = if double_resolution {
          tree.is_blocked_double([x, y, z], false)
        } else {
          tree.is_blocked([x, y, z], false)
        };
        if blocked {
          return false;
        }
      }
    }
  }
  true
}

/// Sight through an empty volume is always clear.
#[test]
fn test_clear_volume() {
  let tree = Octree::new(config());
  assert!(tree.line_of_sight(Vec3::splat(-7.0), Vec3::splat(7.0), false, false));
  assert!(tree.line_of_sight(Vec3::splat(-7.0), Vec3::splat(7.0), false, true));
}

/// A segment through a blocked sphere is rejected; one passing beside it is
/// not.
#[test]
fn test_sphere_blocks_sight() {
  let tree = populated_tree();
  assert!(!tree.line_of_sight(
    Vec3::new(-6.0, 0.0, 0.0),
    Vec3::new(6.0, 0.0, 0.0),
    false,
    false
  ));
  assert!(tree.line_of_sight(
    Vec3::new(-6.0, 5.0, 0.0),
    Vec3::new(6.0, 5.0, 0.0),
    false,
    false
  ));
}

/// Zero-length segments degenerate to a single voxel probe.
#[test]
fn test_degenerate_segment() {
  let tree = populated_tree();
  let free = Vec3::new(6.0, 6.0, 6.0);
  let solid = Vec3::new(-2.0, 0.0, 0.0);
  assert!(tree.line_of_sight(free, free, false, false));
  assert!(!tree.line_of_sight(solid, solid, false, false));
}

/// Segments leaving the volume obey `outside_is_blocked`.
#[test]
fn test_outside_volume() {
  let tree = Octree::new(config());
  let inside = Vec3::ZERO;
  let outside = Vec3::new(12.0, 0.0, 0.0);
  assert!(tree.line_of_sight(inside, outside, false, false));
  assert!(!tree.line_of_sight(inside, outside, true, false));
}

/// An axis-aligned sight line cannot cut the corner between two diagonally
/// touching blocked cells.
#[test]
fn test_no_corner_cutting() {
  let mut tree = Octree::new(config());
  // Two diagonal blocks meeting at the grid corner nearest the origin.
  let cell = tree.config().finest_cell_size();
  tree.divide_point(Vec3::new(-0.5 * cell, -0.5 * cell, 0.5 * cell), true);
  tree.divide_point(Vec3::new(0.5 * cell, 0.5 * cell, 0.5 * cell), true);

  // Diagonal through the shared corner in the XY plane.
  let p1 = Vec3::new(-cell, cell, 0.5 * cell);
  let p2 = Vec3::new(cell, -cell, 0.5 * cell);
  assert!(
    !tree.line_of_sight(p1, p2, false, false),
    "the tie step must widen to the diagonal-adjacency voxels"
  );
}

/// The walk agrees with the brute-force voxel scan on randomized segments
/// over a populated index, at both sampling resolutions.
#[test]
fn test_matches_brute_force() {
  let tree = populated_tree();
  let mut rng = StdRng::seed_from_u64(0x5eed);
  let mut blocked_seen = 0;

  for i in 0..10_000 {
    let double_resolution = i % 2 == 1;
    let p1 = Vec3::new(
      rng.gen_range(-7.0f32..7.0),
      rng.gen_range(-7.0f32..7.0),
      rng.gen_range(-7.0f32..7.0),
    );
    let dir = Vec3::new(
      rng.gen_range(-1.0f32..1.0),
      rng.gen_range(-1.0f32..1.0),
      rng.gen_range(-1.0f32..1.0),
    );
    let p2 = p1 + dir * rng.gen_range(0.0f32..2.0);

    let expected = brute_force_clear(&tree, p1, p2, double_resolution);
    let actual = tree.line_of_sight(p1, p2, false, double_resolution);
    assert_eq!(
      actual, expected,
      "walk disagrees with brute force for {:?} -> {:?} (double = {})",
      p1, p2, double_resolution
    );
    if !expected {
      blocked_seen += 1;
    }
  }
  assert!(
    blocked_seen > 100,
    "scene should block a meaningful share of random segments"
  );
}
