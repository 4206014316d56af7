//! Region-parallel voxelization driver.
//!
//! The grid is decomposed into z-slab regions sized by the configured block
//! budget. Regions run in parallel on the rayon pool with disjoint writes
//! into a scratch buffer; the functor and spatial index are shared
//! read-only. The scratch is swapped into the output volume only when every
//! region completed, so a failed or cancelled pass never leaves a
//! mixed-frame image behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use crate::error::VoxelizeError;
use crate::kernel::FieldFunctor;
use crate::sources::EventSource;
use crate::volume::{Volume, VolumeDescriptor};

pub struct Voxelizer {
    descriptor: VolumeDescriptor,
    /// Z-slabs per region.
    region_depth: usize,
    cancel: Arc<AtomicBool>,
    scratch: Vec<f32>,
}

impl Voxelizer {
    /// Partitions the grid of `descriptor` into regions of at most
    /// `max_block_size` bytes of output each.
    ///
    /// The source's bounding box is fixed after construction, so the
    /// partitioning is computed once and reused across frames.
    #[must_use]
    pub fn new(descriptor: &VolumeDescriptor, max_block_size: usize) -> Self {
        let [nx, ny, _] = descriptor.resolution;
        let slab_bytes = nx * ny * std::mem::size_of::<f32>();
        let region_depth = (max_block_size / slab_bytes.max(1)).max(1);
        Self {
            descriptor: *descriptor,
            region_depth,
            cancel: Arc::new(AtomicBool::new(false)),
            scratch: Vec::new(),
        }
    }

    /// Cooperative shutdown flag; setting it aborts in-flight passes at the
    /// next region boundary or voxel row.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Number of regions the grid decomposes into.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.descriptor.resolution[2].div_ceil(self.region_depth)
    }

    /// Samples the functor at every voxel center for the frame at `time`.
    ///
    /// Loads the source first; on any failure the volume keeps its previous
    /// content. Returns the number of event records processed by the load.
    pub fn sample(
        &mut self,
        source: &mut dyn EventSource,
        functor: &FieldFunctor,
        time: f64,
        volume: &mut Volume,
    ) -> Result<usize, VoxelizeError> {
        assert_eq!(
            volume.descriptor().resolution,
            self.descriptor.resolution,
            "volume geometry changed after partitioning"
        );
        // The load must be complete and visible before any region queries
        // the spatial index; the exclusive borrow ends here.
        let processed = source.load(time)?;
        let store = source.store();

        let started = Instant::now();
        let [nx, ny, _] = self.descriptor.resolution;
        let slab_len = nx * ny;
        let descriptor = self.descriptor;
        let region_depth = self.region_depth;
        let cancel = &self.cancel;

        self.scratch.resize(descriptor.voxel_count(), 0.0);
        self.scratch
            .par_chunks_mut(region_depth * slab_len)
            .enumerate()
            .try_for_each(|(region, chunk)| {
                let z_base = region * region_depth;
                for (dz, slab) in chunk.chunks_mut(slab_len).enumerate() {
                    let z = z_base + dz;
                    for y in 0..ny {
                        if cancel.load(Ordering::Relaxed) {
                            return Err(VoxelizeError::Cancelled);
                        }
                        let row = &mut slab[y * nx..(y + 1) * nx];
                        for (x, voxel) in row.iter_mut().enumerate() {
                            *voxel = functor.evaluate(store, descriptor.voxel_center(x, y, z));
                        }
                    }
                }
                Ok(())
            })?;

        volume.swap_data(&mut self.scratch);
        info!(
            time,
            voxels = descriptor.voxel_count(),
            events = processed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "voxelization pass complete"
        );
        Ok(processed)
    }
}
