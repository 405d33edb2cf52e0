//! Supercover line-of-sight query.
//!
//! Walks the finest-resolution integer grid between two world positions,
//! visiting every voxel the segment passes through, and probes occupancy for
//! each. The walk is an Amanatides-Woo style traversal: per axis it tracks
//! the parameter of the next grid-plane crossing and always steps the axis
//! with the smallest one. When two or three crossings coincide (the segment
//! passes through a grid edge or corner) the walk widens to the
//! diagonal-adjacency voxels on both sides, so a query can never slip
//! between two diagonally-touching blocked cells.
//!
//! Cost is O(path length in voxels); the per-voxel probe prunes through
//! `contains_blocked` so long empty spans stay cheap.

use glam::Vec3;

use super::tree::Octree;

/// Two crossing parameters closer than this are treated as one grid corner.
const TIE_EPSILON: f64 = 1e-9;

impl Octree {
  /// Check that the straight segment `p1..p2` passes through no blocked
  /// voxel.
  ///
  /// `double_resolution` samples on the half-cell grid; required when the
  /// segment endpoints sit on cell corners (corner navigation graphs), where
  /// full-cell sampling cannot resolve which side of a boundary the segment
  /// hugs. `outside_is_blocked` decides how voxels beyond the indexed volume
  /// count.
  pub fn line_of_sight(
    &self,
    p1: Vec3,
    p2: Vec3,
    outside_is_blocked: bool,
    double_resolution: bool,
  ) -> bool {
    let scale = if double_resolution { 2.0 } else { 1.0 };
    let cell = f64::from(self.config().finest_cell_size()) / scale;
    let origin = self.config().origin;

    let g1 = [
      (f64::from(p1.x - origin.x)) / cell,
      (f64::from(p1.y - origin.y)) / cell,
      (f64::from(p1.z - origin.z)) / cell,
    ];
    let g2 = [
      (f64::from(p2.x - origin.x)) / cell,
      (f64::from(p2.y - origin.y)) / cell,
      (f64::from(p2.z - origin.z)) / cell,
    ];

    let probe = |v: [i32; 3]| -> bool {
      if double_resolution {
        self.is_blocked_double(v, outside_is_blocked)
      } else {
        self.is_blocked(v, outside_is_blocked)
      }
    };

    let a = [
      g1[0].floor() as i32,
      g1[1].floor() as i32,
      g1[2].floor() as i32,
    ];
    let b = [
      g2[0].floor() as i32,
      g2[1].floor() as i32,
      g2[2].floor() as i32,
    ];

    if probe(a) {
      return false;
    }

    let mut step = [0i32; 3];
    let mut t_max = [f64::INFINITY; 3];
    let mut t_delta = [f64::INFINITY; 3];
    for axis in 0..3 {
      let d = g2[axis] - g1[axis];
      if d > 0.0 {
        step[axis] = 1;
        t_delta[axis] = 1.0 / d;
        t_max[axis] = (f64::from(a[axis]) + 1.0 - g1[axis]) / d;
      } else if d < 0.0 {
        step[axis] = -1;
        t_delta[axis] = -1.0 / d;
        // When g1 sits exactly on a plane, floor() put us in the upper
        // voxel and the first crossing happens immediately at t = 0.
        t_max[axis] = (f64::from(a[axis]) - g1[axis]) / d;
      }
    }

    let mut v = a;
    // Each iteration advances at least one axis by one voxel.
    let bound = (0..3).map(|i| (b[i] - a[i]).abs() as u32).sum::<u32>();
    for _ in 0..bound {
      if v == b {
        break;
      }
      // Only axes that still have ground to cover are candidates; this also
      // guards the walk against accumulated float drift overshooting `b`.
      let mut best = f64::INFINITY;
      for axis in 0..3 {
        if v[axis] != b[axis] && t_max[axis] < best {
          best = t_max[axis];
        }
      }
      let mut tied = [false; 3];
      let mut tie_count = 0;
      for axis in 0..3 {
        if v[axis] != b[axis] && t_max[axis] - best <= TIE_EPSILON {
          tied[axis] = true;
          tie_count += 1;
        }
      }
      debug_assert!(tie_count > 0, "walk must always have a steppable axis");

      if tie_count == 1 {
        let axis = (0..3).find(|&i| tied[i]).unwrap();
        v[axis] += step[axis];
        t_max[axis] += t_delta[axis];
        if probe(v) {
          return false;
        }
      } else {
        // Grid edge or corner: the segment grazes every voxel around the
        // tie, so probe each single-axis sidestep (and, for a corner, each
        // two-axis sidestep) before taking the diagonal.
        for axis in 0..3 {
          if tied[axis] {
            let mut side = v;
            side[axis] += step[axis];
            if probe(side) {
              return false;
            }
          }
        }
        if tie_count == 3 {
          for skip in 0..3 {
            let mut side = v;
            for axis in 0..3 {
              if axis != skip {
                side[axis] += step[axis];
              }
            }
            if probe(side) {
              return false;
            }
          }
        }
        for axis in 0..3 {
          if tied[axis] {
            v[axis] += step[axis];
            t_max[axis] += t_delta[axis];
          }
        }
        if probe(v) {
          return false;
        }
      }
    }
    true
  }
}

#[cfg(test)]
#[path = "line_of_sight_test.rs"]
mod line_of_sight_test;
