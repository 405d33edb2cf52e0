//! Geometric predicates used by the occupancy indices.
//!
//! All tests operate on axis-aligned boxes given as min/max corners and treat
//! boxes as closed: touching counts as intersecting. The rasterizers in
//! [`crate::octree`] and [`crate::quadtree`] call these per cell, so they are
//! written as small branch-light pure functions.

use glam::{Vec2, Vec3};

/// Check if a point lies inside a box (half-open: min inclusive, max
/// exclusive, matching cell ownership in the octree).
#[inline]
pub fn point_in_aabb(p: Vec3, min: Vec3, max: Vec3) -> bool {
  p.x >= min.x && p.x < max.x && p.y >= min.y && p.y < max.y && p.z >= min.z && p.z < max.z
}

/// Check if a sphere intersects a box (closest-point distance test).
#[inline]
pub fn sphere_intersects_aabb(center: Vec3, radius: f32, min: Vec3, max: Vec3) -> bool {
  let closest = center.clamp(min, max);
  (closest - center).length_squared() <= radius * radius
}

/// Check if the segment `p1..p2` intersects a box (slab clipping).
pub fn segment_intersects_aabb(p1: Vec3, p2: Vec3, min: Vec3, max: Vec3) -> bool {
  let d = p2 - p1;
  let mut t_min = 0.0f32;
  let mut t_max = 1.0f32;

  for axis in 0..3 {
    let (o, dir, lo, hi) = (p1[axis], d[axis], min[axis], max[axis]);
    if dir.abs() < f32::EPSILON {
      // Parallel to the slab: either always inside it or never.
      if o < lo || o > hi {
        return false;
      }
    } else {
      let inv = 1.0 / dir;
      let (t1, t2) = ((lo - o) * inv, (hi - o) * inv);
      let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
      t_min = t_min.max(near);
      t_max = t_max.min(far);
      if t_min > t_max {
        return false;
      }
    }
  }
  true
}

/// Check if a triangle intersects a box.
///
/// Separating axis test over the 13 candidate axes (3 box axes, the triangle
/// normal, and the 9 edge cross products).
pub fn triangle_intersects_aabb(a: Vec3, b: Vec3, c: Vec3, min: Vec3, max: Vec3) -> bool {
  let center = (min + max) * 0.5;
  let half = (max - min) * 0.5;

  // Triangle in box-local space.
  let v0 = a - center;
  let v1 = b - center;
  let v2 = c - center;

  // Box axes: compare triangle AABB against half extents.
  for axis in 0..3 {
    let lo = v0[axis].min(v1[axis]).min(v2[axis]);
    let hi = v0[axis].max(v1[axis]).max(v2[axis]);
    if lo > half[axis] || hi < -half[axis] {
      return false;
    }
  }

  let e0 = v1 - v0;
  let e1 = v2 - v1;
  let e2 = v0 - v2;

  // Triangle plane: distance from the box center against the projection
  // radius. All three vertices lie on the plane, so v0 suffices.
  let n = e0.cross(e1);
  let r = half.x * n.x.abs() + half.y * n.y.abs() + half.z * n.z.abs();
  if v0.dot(n).abs() > r {
    return false;
  }

  // Edge cross products: axis = unit(box axis) x edge.
  let edges = [e0, e1, e2];
  for edge in edges {
    for axis in 0..3 {
      let mut u = Vec3::ZERO;
      u[axis] = 1.0;
      let sep = u.cross(edge);
      let p0 = v0.dot(sep);
      let p1 = v1.dot(sep);
      let p2 = v2.dot(sep);
      let r = half.x * sep.x.abs() + half.y * sep.y.abs() + half.z * sep.z.abs();
      let lo = p0.min(p1).min(p2);
      let hi = p0.max(p1).max(p2);
      if lo > r || hi < -r {
        return false;
      }
    }
  }
  true
}

/// 2x2 determinant of two 2-D vectors.
#[inline]
pub fn det2(v1: Vec2, v2: Vec2) -> f32 {
  v1.x * v2.y - v1.y * v2.x
}

/// 2-D analogue: check if the segment `p1..p2` crosses a rectangle.
///
/// Bounding-box rejection first, then the rectangle's corners must straddle
/// the segment's supporting line.
pub fn segment_crosses_rect(p1: Vec2, p2: Vec2, min: Vec2, max: Vec2) -> bool {
  let seg_min = p1.min(p2);
  let seg_max = p1.max(p2);
  if seg_min.x >= max.x || seg_max.x < min.x || seg_min.y >= max.y || seg_max.y < min.y {
    return false;
  }

  let v = p2 - p1;
  let corners = [
    min,
    Vec2::new(max.x, min.y),
    Vec2::new(min.x, max.y),
    max,
  ];
  let mut has_left = false;
  let mut has_right = false;
  for corner in corners {
    let side = det2(corner - p1, v);
    has_left |= side >= 0.0;
    has_right |= side <= 0.0;
  }
  has_left && has_right
}

#[cfg(test)]
#[path = "predicates_test.rs"]
mod predicates_test;
