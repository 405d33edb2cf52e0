//! Center and corner graph derivation, plus connectivity labeling.
//!
//! Both builders wire arcs only between same-or-larger free neighbors: a
//! cell never connects directly to a coarser neighbor's interior from the
//! coarse side, because the coarse cell cannot know which of the finer
//! cells on the shared face are free. Each finer cell adds its own arcs
//! back instead. This is what forbids "tunneling" through a region that
//! merely looks free at a coarse level.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::octree::{Octree, CHILD_OFFSETS, FACE_OFFSETS};

use super::types::{NavGraph, NodeLookup};

impl Octree {
  /// Derive a navigation graph with one node per unblocked leaf centroid.
  ///
  /// For each leaf `u` and face direction, the neighbor is resolved at `u`'s
  /// own level:
  /// - equal level and free: `u` adds `u -> v` (the reverse is added when
  ///   `v` runs its own iteration);
  /// - strictly coarser and free: `u` adds both directions, since the
  ///   coarse side's lookup never resolves to `u`;
  /// - subdivided at `u`'s level: skipped, each finer child wires itself.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "graph::to_center_graph")
  )]
  pub fn to_center_graph(&self) -> NavGraph {
    let mut graph = NavGraph::new(NodeLookup::Center(HashMap::new()), false);

    for id in self.free_leaves() {
      let cell = self.cell(id);
      let node = graph.add_node(self.cell_center(id));
      let NodeLookup::Center(map) = graph.lookup_mut() else {
        unreachable!("center builder owns a center lookup");
      };
      map.insert((cell.level, cell.index), node);
    }

    for id in self.free_leaves() {
      let (level, index) = {
        let cell = self.cell(id);
        (cell.level, cell.index)
      };
      let NodeLookup::Center(map) = graph.lookup() else {
        unreachable!()
      };
      let u = map[&(level, index)];

      for dir in FACE_OFFSETS {
        let neighbor = [index[0] + dir[0], index[1] + dir[1], index[2] + dir[2]];
        let Some(found) = self.find(neighbor, level) else {
          continue;
        };
        let cell = self.cell(found);
        if !cell.is_free_leaf() {
          continue;
        }
        let NodeLookup::Center(map) = graph.lookup() else {
          unreachable!()
        };
        let v = map[&(cell.level, cell.index)];
        if cell.level == level {
          graph.add_arc_euclidean(u, v);
        } else {
          graph.add_arc_euclidean(u, v);
          graph.add_arc_euclidean(v, u);
        }
      }
    }

    calculate_connectivity(&mut graph);
    graph
  }

  /// Derive a navigation graph with one node per distinct corner of every
  /// unblocked leaf.
  ///
  /// Corners are deduplicated through the absolute finest-grid coordinate;
  /// corners shared between leaves of different sizes merge there, which is
  /// what connects regions across grading boundaries. Arcs run along every
  /// free leaf's 12 cell edges (deduplicated by node pair). The resulting
  /// graph addresses obstacle boundaries directly, which is what any-angle
  /// smoothing needs.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "graph::to_corner_graph")
  )]
  pub fn to_corner_graph(&self) -> NavGraph {
    let mut graph = NavGraph::new(NodeLookup::Corner(HashMap::new()), true);
    let max_level = self.config().max_level;

    for id in self.free_leaves() {
      let cell = self.cell(id);
      let scale = 1i32 << (max_level - cell.level);
      for offset in CHILD_OFFSETS {
        let corner = [
          (cell.index[0] + offset[0]) * scale,
          (cell.index[1] + offset[1]) * scale,
          (cell.index[2] + offset[2]) * scale,
        ];
        let position = self.config().origin
          + glam::Vec3::new(corner[0] as f32, corner[1] as f32, corner[2] as f32)
            * self.config().finest_cell_size();
        let known = {
          let NodeLookup::Corner(map) = graph.lookup() else {
            unreachable!("corner builder owns a corner lookup");
          };
          map.contains_key(&corner)
        };
        if !known {
          let node = graph.add_node(position);
          let NodeLookup::Corner(map) = graph.lookup_mut() else {
            unreachable!()
          };
          map.insert(corner, node);
        }
      }
    }

    // Second pass: arcs along cell edges. Pairs of octants differing in
    // exactly one bit are the 12 cube edges.
    let mut seen: HashSet<(i32, i32)> = HashSet::new();
    for id in self.free_leaves() {
      let cell = self.cell(id);
      let scale = 1i32 << (max_level - cell.level);
      let corner_of = |octant: usize| {
        let offset = CHILD_OFFSETS[octant];
        [
          (cell.index[0] + offset[0]) * scale,
          (cell.index[1] + offset[1]) * scale,
          (cell.index[2] + offset[2]) * scale,
        ]
      };
      let NodeLookup::Corner(map) = graph.lookup() else {
        unreachable!()
      };
      let mut edges: Vec<(i32, i32)> = Vec::with_capacity(12);
      for octant in 0..8usize {
        for bit in 0..3usize {
          if octant & (1 << bit) == 0 {
            let a = map[&corner_of(octant)];
            let b = map[&corner_of(octant | (1 << bit))];
            edges.push((a.min(b), a.max(b)));
          }
        }
      }
      for (a, b) in edges {
        if seen.insert((a, b)) {
          graph.add_arc_euclidean(a, b);
          graph.add_arc_euclidean(b, a);
        }
      }
    }

    calculate_connectivity(&mut graph);
    graph
  }
}

/// Flood fill over arcs assigning a connected-component label to every
/// permanent node. Queries between differing components are rejected without
/// search.
pub fn calculate_connectivity(graph: &mut NavGraph) {
  let count = graph.node_count();
  let mut labels = vec![-1i32; count];
  let mut next = 0i32;
  let mut queue = VecDeque::new();

  for start in 0..count {
    if labels[start] >= 0 {
      continue;
    }
    labels[start] = next;
    queue.push_back(start as i32);
    while let Some(index) = queue.pop_front() {
      for arc_index in 0..graph.node(index).arcs.len() {
        let to = graph.node(index).arcs[arc_index].to;
        debug_assert!(to >= 0, "permanent arcs never point at temporaries");
        if labels[to as usize] < 0 {
          labels[to as usize] = next;
          queue.push_back(to);
        }
      }
    }
    next += 1;
  }

  for (index, label) in labels.into_iter().enumerate() {
    graph.node_mut(index as i32).connect_index = label;
  }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
