//! Spatial indexing structure for range queries over event positions.
//!
//! A uniform 3D grid over the event bounding box, stored in the offset-array
//! pattern (compressed sparse rows): `cell_offsets[i]..cell_offsets[i + 1]`
//! spans the entries of cell `i`. Each entry carries the event position so a
//! query filters exact distances without touching the event arena.
//!
//! The counting pass of the build runs in parallel; placement is sequential
//! so entry order inside a cell is deterministic, which keeps per-voxel
//! summation order stable across runs.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use fieldvox_data::{Aabb, Event, Vec3};
use rayon::prelude::*;

use crate::event::ActiveSet;

/// Grid cells per axis are capped so tiny cutoffs cannot explode memory.
const MAX_CELLS_PER_AXIS: usize = 128;

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    origin: Vec3,
    cell_size: f32,
    dims: [usize; 3],
    cell_offsets: Vec<usize>,
    /// (position, event index), sorted by cell.
    entries: Vec<(Vec3, u32)>,
}

impl SpatialIndex {
    /// Builds the index over the active events.
    ///
    /// `cell_size` is normally the query radius (the functor's cutoff), so a
    /// range query touches at most 3³ cell neighborhoods; it is clamped below
    /// so the grid never exceeds `MAX_CELLS_PER_AXIS` per axis.
    #[must_use]
    pub fn build(events: &[Event], active: &ActiveSet, bbox: &Aabb, cell_size: f32) -> Self {
        let origin = if bbox.is_empty() { Vec3::ZERO } else { bbox.min() };
        let extent = bbox.extent();
        let cell_size = Self::clamp_cell_size(bbox, cell_size);

        let dims = [
            Self::axis_cells(extent.x, cell_size),
            Self::axis_cells(extent.y, cell_size),
            Self::axis_cells(extent.z, cell_size),
        ];
        let cell_count = dims[0] * dims[1] * dims[2];

        let cell_of = |p: Vec3| -> Option<usize> {
            if !p.is_finite() {
                return None;
            }
            let local = p - origin;
            let cx = Self::axis_index(local.x, cell_size, dims[0])?;
            let cy = Self::axis_index(local.y, cell_size, dims[1])?;
            let cz = Self::axis_index(local.z, cell_size, dims[2])?;
            Some((cz * dims[1] + cy) * dims[0] + cx)
        };

        // Parallel counting pass, sequential placement.
        let atomic_counts: Vec<AtomicUsize> =
            (0..cell_count).map(|_| AtomicUsize::new(0)).collect();
        events.par_iter().enumerate().for_each(|(i, ev)| {
            if active.contains(i) {
                if let Some(cell) = cell_of(ev.position) {
                    atomic_counts[cell].fetch_add(1, AtomicOrdering::Relaxed);
                }
            }
        });
        let counts: Vec<usize> = atomic_counts.into_iter().map(AtomicUsize::into_inner).collect();

        let mut cell_offsets = vec![0usize; cell_count + 1];
        let mut total = 0;
        for (i, &count) in counts.iter().enumerate() {
            cell_offsets[i] = total;
            total += count;
        }
        cell_offsets[cell_count] = total;

        let mut entries = vec![(Vec3::ZERO, 0u32); total];
        let mut cursors = cell_offsets[..cell_count].to_vec();
        for (i, ev) in events.iter().enumerate() {
            if !active.contains(i) {
                continue;
            }
            if let Some(cell) = cell_of(ev.position) {
                entries[cursors[cell]] = (ev.position, i as u32);
                cursors[cell] += 1;
            }
        }

        Self {
            origin,
            cell_size,
            dims,
            cell_offsets,
            entries,
        }
    }

    /// Number of indexed events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visits every indexed event within `radius` of `point` with its
    /// squared distance. Coincident positions are reported at distance zero.
    pub fn within<F: FnMut(u32, f32)>(&self, point: Vec3, radius: f32, mut visit: F) {
        if self.entries.is_empty() || !point.is_finite() || !(radius >= 0.0) {
            return;
        }
        let radius2 = radius * radius;
        let local = point - self.origin;
        let (x0, x1) = Self::axis_range(local.x, radius, self.cell_size, self.dims[0]);
        let (y0, y1) = Self::axis_range(local.y, radius, self.cell_size, self.dims[1]);
        let (z0, z1) = Self::axis_range(local.z, radius, self.cell_size, self.dims[2]);

        for cz in z0..z1 {
            for cy in y0..y1 {
                for cx in x0..x1 {
                    let cell = (cz * self.dims[1] + cy) * self.dims[0] + cx;
                    let start = self.cell_offsets[cell];
                    let end = self.cell_offsets[cell + 1];
                    for &(pos, idx) in &self.entries[start..end] {
                        let d2 = pos.distance2(point);
                        if d2 <= radius2 {
                            visit(idx, d2);
                        }
                    }
                }
            }
        }
    }

    fn clamp_cell_size(bbox: &Aabb, cell_size: f32) -> f32 {
        let max_dim = bbox.max_dimension().max(1e-3);
        let floor = max_dim / MAX_CELLS_PER_AXIS as f32;
        if cell_size.is_finite() && cell_size > floor {
            cell_size
        } else {
            floor
        }
    }

    fn axis_cells(extent: f32, cell_size: f32) -> usize {
        ((extent / cell_size).ceil() as usize).max(1)
    }

    fn axis_index(local: f32, cell_size: f32, cells: usize) -> Option<usize> {
        let c = (local / cell_size).floor();
        if c < 0.0 || !c.is_finite() {
            return None;
        }
        // Positions exactly on the max corner land one past the last cell.
        Some((c as usize).min(cells - 1))
    }

    /// Half-open cell range covering `[local - radius, local + radius]`,
    /// clamped to the grid.
    fn axis_range(local: f32, radius: f32, cell_size: f32, cells: usize) -> (usize, usize) {
        let lo = ((local - radius) / cell_size).floor();
        let hi = ((local + radius) / cell_size).floor();
        if hi < 0.0 || lo >= cells as f32 {
            return (0, 0);
        }
        let lo = if lo < 0.0 { 0 } else { lo as usize };
        let hi = (hi as usize).min(cells - 1);
        (lo, hi + 1)
    }
}
