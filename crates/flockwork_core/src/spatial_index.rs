use crate::error::{FlockError, Result};
use flockwork_data::{AgentPosition, Axis, NeighborSet};
use glam::Vec3;
use rayon::prelude::*;
use std::collections::HashMap;

/// Agents ordered by one coordinate, plus the reverse lookup from agent index
/// to rank in that order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortedAxisView {
    axis: Axis,
    entries: Vec<AgentPosition>,
    ranks: HashMap<usize, usize>,
}

impl SortedAxisView {
    #[must_use]
    pub fn new(axis: Axis, capacity: usize) -> Self {
        Self {
            axis,
            entries: Vec::with_capacity(capacity),
            ranks: HashMap::with_capacity(capacity),
        }
    }

    fn rebuild(&mut self, source: &[AgentPosition]) {
        let axis = self.axis;
        self.entries.clear();
        self.entries.extend_from_slice(source);
        // Stable sort: ties keep agent-index order, so equal input gives equal views.
        self.entries.par_sort_by(|a, b| {
            axis.component(a.position)
                .total_cmp(&axis.component(b.position))
        });

        self.ranks.clear();
        self.ranks.extend(
            self.entries
                .iter()
                .enumerate()
                .map(|(rank, entry)| (entry.index, rank)),
        );
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.ranks.clear();
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn entries(&self) -> &[AgentPosition] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn rank_of(&self, index: usize) -> Option<usize> {
        self.ranks.get(&index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy)]
struct AxisWalk {
    cursor: isize,
    step: isize,
}

/// Approximate neighbor index built from three per-axis sorted views.
///
/// Rebuilt from scratch every step. A neighbor query walks outward from the
/// agent's rank in each view, on the side its heading points to, and unions
/// whatever it passes over. That is a cheap filter rather than a proximity
/// test: an agent can be picked up through one axis while being far away on
/// the other two. Exact distance checks happen during integration.
///
/// # Performance Characteristics
/// - Rebuild: three O(n log n) sorts, run concurrently with Rayon
/// - Query: O(max_count) steps plus one hash lookup per axis
///
/// # Examples
/// ```
/// use flockwork_core::spatial_index::SpatialIndex;
/// use glam::Vec3;
///
/// let positions = vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)];
/// let mut index = SpatialIndex::with_capacity(positions.len());
/// index.rebuild(&positions).unwrap();
///
/// let neighbors = index.query_neighbors(0, Vec3::X, 5.0, 21);
/// assert!(neighbors.contains(1));
/// assert!(!neighbors.contains(2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialIndex {
    capacity: usize,
    views: [SortedAxisView; 3],
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl SpatialIndex {
    /// Creates an empty index able to hold up to `capacity` agents.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            views: Axis::ALL.map(|axis| SortedAxisView::new(axis, capacity)),
        }
    }

    /// Changes the allocated capacity and drops all indexed agents.
    ///
    /// Every query answers empty until the next [`SpatialIndex::rebuild`].
    pub fn reallocate(&mut self, capacity: usize) {
        self.capacity = capacity;
        for view in &mut self.views {
            view.clear();
            view.entries.reserve(capacity);
            view.ranks.reserve(capacity);
        }
        tracing::debug!(capacity, "Reallocated spatial index");
    }

    /// Replaces the indexed agents with `positions`, where agent `i` is
    /// `positions[i]`.
    ///
    /// Fails with [`FlockError::CapacityMismatch`] when there are more
    /// positions than the index was allocated for. On failure the previous
    /// contents are left untouched.
    pub fn rebuild(&mut self, positions: &[Vec3]) -> Result<()> {
        if positions.len() > self.capacity {
            return Err(FlockError::capacity(positions.len(), self.capacity));
        }

        let source: Vec<AgentPosition> = positions
            .iter()
            .enumerate()
            .map(|(index, &position)| AgentPosition { index, position })
            .collect();

        let [x, y, z] = &mut self.views;
        rayon::join(
            || x.rebuild(&source),
            || rayon::join(|| y.rebuild(&source), || z.rebuild(&source)),
        );

        tracing::debug!(agents = source.len(), "Rebuilt spatial index");
        Ok(())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of agents indexed by the last rebuild.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views[0].len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn view(&self, axis: Axis) -> &SortedAxisView {
        &self.views[axis.slot()]
    }

    #[inline]
    #[must_use]
    pub fn rank_of(&self, axis: Axis, index: usize) -> Option<usize> {
        self.view(axis).rank_of(index)
    }

    /// Position recorded for `index` at the last rebuild.
    #[inline]
    #[must_use]
    pub fn position_of(&self, index: usize) -> Option<Vec3> {
        let view = &self.views[0];
        view.rank_of(index).map(|rank| view.entries[rank].position)
    }

    /// Collects an approximate neighbor set for `index`.
    ///
    /// See [`SpatialIndex::query_into`].
    #[must_use]
    pub fn query_neighbors(
        &self,
        index: usize,
        heading: Vec3,
        max_axis_distance: f32,
        max_count: usize,
    ) -> NeighborSet {
        let mut neighbors = NeighborSet::with_capacity(max_count + 1);
        self.query_into(index, heading, max_axis_distance, max_count, &mut neighbors);
        neighbors
    }

    /// Collects an approximate neighbor set for `index` into `result`.
    ///
    /// The axes are advanced round-robin, one entry at a time, in the
    /// direction of the matching `heading` component. An axis whose heading
    /// component is exactly zero is not walked, unless the whole heading is
    /// zero, in which case every axis is walked toward positive coordinates.
    /// An axis stops at the end of its view or at the first entry further than
    /// `max_axis_distance` along that axis. The query ends as soon as the set
    /// holds more than `max_count` indices.
    ///
    /// `result` never contains `index` itself, and is left empty when `index`
    /// was not part of the last rebuild.
    pub fn query_into(
        &self,
        index: usize,
        heading: Vec3,
        max_axis_distance: f32,
        max_count: usize,
        result: &mut NeighborSet,
    ) {
        result.clear();
        let Some(origin) = self.position_of(index) else {
            tracing::trace!(index, indexed = self.len(), "Query for unindexed agent");
            return;
        };

        let stationary = heading == Vec3::ZERO;
        let mut walks: [Option<AxisWalk>; 3] = [None; 3];
        for view in &self.views {
            let component = view.axis.component(heading);
            let step = if stationary || component > 0.0 {
                1
            } else if component < 0.0 {
                -1
            } else {
                continue;
            };
            walks[view.axis.slot()] = view.rank_of(index).map(|rank| AxisWalk {
                cursor: rank as isize + step,
                step,
            });
        }

        while walks.iter().any(Option::is_some) {
            for view in &self.views {
                let slot = view.axis.slot();
                let Some(walk) = walks[slot] else {
                    continue;
                };

                let entry = usize::try_from(walk.cursor)
                    .ok()
                    .and_then(|rank| view.entries.get(rank));
                let Some(entry) = entry else {
                    walks[slot] = None;
                    continue;
                };

                let gap = view.axis.component(entry.position) - view.axis.component(origin);
                if gap.abs() > max_axis_distance {
                    walks[slot] = None;
                    continue;
                }

                if entry.index != index {
                    result.insert(entry.index);
                }
                walks[slot] = Some(AxisWalk {
                    cursor: walk.cursor + walk.step,
                    ..walk
                });

                if result.len() > max_count {
                    return;
                }
            }
        }
    }
}
