use glam::Vec2;

use super::*;

fn small_config() -> QuadtreeConfig {
  QuadtreeConfig {
    size: 16.0,
    origin: Vec2::splat(-8.0),
    max_level: 5,
    graded: true,
  }
}

/// An empty quadtree is a single free root.
#[test]
fn test_empty() {
  let tree = Quadtree::new(small_config());
  assert_eq!(tree.cell_count(), 1);
  assert!(!tree.is_blocked([0, 0], false));
  assert!(tree.is_blocked([-1, 0], true));
}

/// Point rasterization blocks exactly the containing finest cell.
#[test]
fn test_divide_point() {
  let mut tree = Quadtree::new(small_config());
  let p = Vec2::new(1.3, -2.7);
  tree.divide_point(p, true);
  assert!(tree.is_blocked(tree.position_to_index(p), false));
  assert!(!tree.is_blocked(tree.position_to_index(Vec2::new(-5.0, 5.0)), false));
}

/// Segment rasterization blocks every finest cell along the segment.
#[test]
fn test_divide_segment() {
  let mut tree = Quadtree::new(small_config());
  let p1 = Vec2::new(-4.0, -4.0);
  let p2 = Vec2::new(4.0, 4.0);
  tree.divide_segment(p1, p2, true);

  // Sample points along the segment all land in blocked cells.
  for i in 0..=8 {
    let t = i as f32 / 8.0;
    let p = p1.lerp(p2, t);
    assert!(
      tree.is_blocked(tree.position_to_index(p), false),
      "segment sample {:?} must be blocked",
      p
    );
  }
  assert!(!tree.is_blocked(tree.position_to_index(Vec2::new(-4.0, 4.0)), false));
}

/// Edge-adjacent leaves differ by at most one level after refinement.
#[test]
fn test_grading() {
  let mut tree = Quadtree::new(small_config());
  tree.divide_point(Vec2::new(-7.9, -7.9), true);

  // Walk the finest grid; for every leaf, its edge neighbors resolved at
  // the leaf's own level may be at most one level coarser.
  let extent = 1i32 << 5;
  for x in 0..extent {
    for y in 0..extent {
      let id = tree.find([x, y], 5).unwrap();
      let level = tree.cell_level(id);
      for dir in [[-1, 0], [1, 0], [0, -1], [0, 1]] {
        let neighbor = [x + dir[0], y + dir[1]];
        if let Some(n) = tree.find(neighbor, 5) {
          let n_level = tree.cell_level(n);
          assert!(
            (level - n_level).abs() <= 1,
            "graded invariant violated at {:?}: {} vs {}",
            [x, y],
            level,
            n_level
          );
        }
      }
    }
  }
}
