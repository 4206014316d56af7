//! Shared fixtures for the integration suites.

use fieldvox_data::{CircuitGeometry, Vec3};

/// A small circuit: `cells` cells spaced 10 um apart on the x axis, each with
/// `segments` reported compartments stacked along y. The first compartment of
/// every cell is its soma.
pub fn grid_geometry(cells: usize, segments: usize) -> CircuitGeometry {
    let mut positions = Vec::with_capacity(cells * segments);
    let mut cell_offsets = Vec::with_capacity(cells);
    for c in 0..cells {
        cell_offsets.push(positions.len());
        for s in 0..segments {
            positions.push(Vec3::new(c as f32 * 10.0, s as f32 * 2.0, 0.0));
        }
    }
    CircuitGeometry {
        gids: (1..=cells as u64).collect(),
        positions,
        cell_offsets,
    }
}
