//! A*, Theta*, and Lazy Theta* over a navigation graph.
//!
//! One source, one-or-many destinations. Destinations are processed in
//! order over a single shared `SearchState`: g values measure cost from the
//! source and stay valid when the destination changes, so each phase only
//! re-keys the open frontier's heuristic and resumes. Commanding many
//! queries toward one region this way shares most of the expansion work.

use glam::Vec3;

use crate::graph::NavGraph;
use crate::octree::Octree;

use super::state::SearchState;

/// Small slack when deciding whether a relaxation actually improves a
/// node, so float noise cannot reopen nodes forever.
const IMPROVEMENT_EPSILON: f32 = 1e-6;

/// Search variant used by [`NavGraph::find_path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
  /// Classic label-correcting A*; paths follow graph arcs exactly.
  AStar,
  /// Any-angle: successors attach to their grandparent whenever line of
  /// sight holds, checked eagerly at relaxation time.
  ThetaStar,
  /// Any-angle with the line-of-sight check deferred to closure time;
  /// nodes failing it re-parent to their best closed neighbor.
  LazyThetaStar,
}

/// Total Euclidean length of a waypoint polyline.
pub fn path_length(path: &[Vec3]) -> f32 {
  path
    .windows(2)
    .map(|pair| pair[0].distance(pair[1]))
    .sum()
}

impl NavGraph {
  /// Find paths from `source` to each destination position, in order.
  ///
  /// Both endpoints are spliced into the graph as temporary nodes bound to
  /// the corner/center nodes of their containing free cells, and removed
  /// again before returning. Each result is an ordered list of world-space
  /// waypoints starting at `source` and ending at the destination, or
  /// `None` when that destination is unreachable (different component,
  /// blocked or out-of-volume position, or exhausted frontier).
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "search::find_path", fields(destinations = destinations.len()))
  )]
  pub fn find_path(
    &mut self,
    algorithm: Algorithm,
    source: Vec3,
    destinations: &[Vec3],
    tree: &Octree,
  ) -> Vec<Option<Vec<Vec3>>> {
    let bounding = self.bounding_nodes(tree, source);
    if bounding.is_empty() {
      return vec![None; destinations.len()];
    }
    let source_node = self.add_temporary_node(source, &bounding);

    let mut destination_nodes = Vec::with_capacity(destinations.len());
    for &destination in destinations {
      let bounding = self.bounding_nodes(tree, destination);
      if bounding.is_empty() {
        destination_nodes.push(None);
      } else {
        destination_nodes.push(Some(self.add_temporary_node(destination, &bounding)));
      }
    }

    let reachable: Vec<i32> = destination_nodes.iter().flatten().copied().collect();
    let node_paths = self.find_path_nodes(algorithm, source_node, &reachable, tree);

    let mut node_paths = node_paths.into_iter();
    let results = destination_nodes
      .iter()
      .map(|destination| match destination {
        None => None,
        Some(_) => node_paths
          .next()
          .expect("one node result per spliced destination")
          .map(|nodes| self.pull_waypoints(&nodes, tree)),
      })
      .collect();

    self.remove_temporary_nodes();
    results
  }

  /// Single-destination convenience wrapper around [`Self::find_path`].
  pub fn find_path_single(
    &mut self,
    algorithm: Algorithm,
    source: Vec3,
    destination: Vec3,
    tree: &Octree,
  ) -> Option<Vec<Vec3>> {
    self
      .find_path(algorithm, source, &[destination], tree)
      .into_iter()
      .next()
      .flatten()
  }

  /// Node-level search: paths as node index sequences, without endpoint
  /// splicing or string pulling.
  pub fn find_path_nodes(
    &self,
    algorithm: Algorithm,
    source: i32,
    destinations: &[i32],
    tree: &Octree,
  ) -> Vec<Option<Vec<i32>>> {
    let source_component = self.node(source).connect_index;
    let mut state = SearchState::new();
    let mut seeded = false;
    let mut results = Vec::with_capacity(destinations.len());

    for &destination in destinations {
      if self.node(destination).connect_index != source_component {
        results.push(None);
        continue;
      }
      if destination == source {
        results.push(Some(vec![source]));
        continue;
      }
      if state.is_closed(destination) {
        results.push(Some(self.backtrack(source, destination, &state)));
        continue;
      }

      let destination_position = self.node(destination).position;
      if !seeded {
        let h = self.node(source).position.distance(destination_position);
        state.open_node(source, 0.0, h, source);
        seeded = true;
      } else {
        state.retarget(|index| self.node(index).position.distance(destination_position));
      }

      let found = self.run_search(algorithm, source, destination, &mut state, tree);
      results.push(found.then(|| self.backtrack(source, destination, &state)));
    }
    results
  }

  fn run_search(
    &self,
    algorithm: Algorithm,
    source: i32,
    destination: i32,
    state: &mut SearchState,
    tree: &Octree,
  ) -> bool {
    let destination_position = self.node(destination).position;

    while let Some(index) = state.pop() {
      if algorithm == Algorithm::LazyThetaStar && index != source {
        self.validate_parent(index, state, tree);
      }
      state.close(index);
      if index == destination {
        return true;
      }

      let record = state.records[&index];
      let grandparent = (record.parent, state.records[&record.parent].g);

      for arc in &self.node(index).arcs {
        let to = arc.to;
        // Temporary nodes are endpoint splices, not waypoints. Routing
        // through another query's splice would cross a coarse cell for the
        // two unit arcs instead of the geometric distance.
        if to < 0 && to != destination {
          continue;
        }
        let to_position = self.node(to).position;

        let mut candidate_g = record.g + arc.distance;
        let mut candidate_parent = index;
        if index != source {
          let (parent, parent_g) = grandparent;
          let via = parent_g + self.node(parent).position.distance(to_position);
          let attach = match algorithm {
            Algorithm::AStar => false,
            Algorithm::ThetaStar => {
              via <= candidate_g && self.node_line_of_sight(parent, to, tree)
            }
            // Optimistically assume visibility; closure validates it.
            Algorithm::LazyThetaStar => via <= candidate_g,
          };
          if attach {
            candidate_g = via;
            candidate_parent = parent;
          }
        }

        let improves = state
          .records
          .get(&to)
          .map_or(true, |known| candidate_g + IMPROVEMENT_EPSILON < known.g);
        if improves {
          let h = to_position.distance(destination_position);
          state.open_node(to, candidate_g, h, candidate_parent);
        }
      }
    }
    false
  }

  /// Lazy Theta* closure step: if the tentative parent turns out not to be
  /// visible, re-parent to the closed neighbor offering the best g.
  ///
  /// The fallback candidates need no visibility test of their own: an arc
  /// only exists between mutually reachable nodes, so stepping along one is
  /// always traversable and the resulting g stays valid.
  fn validate_parent(&self, index: i32, state: &mut SearchState, tree: &Octree) {
    let parent = state.records[&index].parent;
    if self.node_line_of_sight(parent, index, tree) {
      return;
    }
    let mut best_g = f32::INFINITY;
    let mut best_parent = parent;
    for arc in &self.node(index).arcs {
      if state.is_closed(arc.to) {
        let g = state.records[&arc.to].g + arc.distance;
        if g < best_g {
          best_g = g;
          best_parent = arc.to;
        }
      }
    }
    debug_assert!(
      best_g.is_finite(),
      "a popped node always has at least one closed neighbor"
    );
    let record = state.records.get_mut(&index).expect("popped node has a record");
    record.g = best_g;
    record.parent = best_parent;
    record.f = record.g + record.h;
  }

  fn backtrack(&self, source: i32, destination: i32, state: &SearchState) -> Vec<i32> {
    let mut path = vec![destination];
    let mut current = destination;
    while current != source {
      current = state.records[&current].parent;
      path.push(current);
    }
    path.reverse();
    path
  }

  /// String pulling: drop a waypoint whenever its two neighbors have direct
  /// line of sight, and repeat until no waypoint can be dropped.
  ///
  /// Visibility along a path is not monotone: a waypoint may see past a
  /// neighbor it cannot see, once the waypoints in between have collapsed.
  /// A single backward scan therefore misses collapses that removing other
  /// waypoints would enable; the pass iterates to a fixpoint instead.
  fn pull_waypoints(&self, nodes: &[i32], tree: &Octree) -> Vec<Vec3> {
    let mut points: Vec<Vec3> = nodes.iter().map(|&n| self.node(n).position).collect();
    let mut changed = true;
    while changed {
      changed = false;
      let mut i = points.len().saturating_sub(1);
      while i >= 2 {
        if tree.line_of_sight(points[i], points[i - 2], false, self.corner_resolution) {
          points.remove(i - 1);
          changed = true;
          if i + 1 > points.len() {
            i = points.len() - 1;
          }
        } else {
          i -= 1;
        }
      }
    }
    points
  }

  fn node_line_of_sight(&self, from: i32, to: i32, tree: &Octree) -> bool {
    tree.line_of_sight(
      self.node(from).position,
      self.node(to).position,
      false,
      self.corner_resolution,
    )
  }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
