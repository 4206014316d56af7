//! Prepared circuit geometry.
//!
//! Circuit-format parsing is outside this workspace; callers resolve their
//! morphology files into these plain structures before constructing a source.

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Per-compartment geometry for a set of reported cells.
///
/// `positions` is frame-ordered: index `i` of a report frame is the value of
/// the compartment at `positions[i]`. `cell_offsets[c]` is the index of the
/// first reported compartment of cell `c`; by convention this is the somatic
/// segment.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CircuitGeometry {
    pub gids: Vec<u64>,
    pub positions: Vec<Vec3>,
    pub cell_offsets: Vec<usize>,
}

impl CircuitGeometry {
    /// Number of reported compartments.
    #[must_use]
    pub fn compartment_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.gids.len()
    }

    /// True when offsets are strictly increasing, in bounds, and one per gid.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.gids.len() != self.cell_offsets.len() {
            return false;
        }
        let mut last = None;
        for &off in &self.cell_offsets {
            if off >= self.positions.len() {
                return false;
            }
            if let Some(prev) = last {
                if off <= prev {
                    return false;
                }
            }
            last = Some(off);
        }
        true
    }

    /// Extracts the per-cell somatic positions.
    #[must_use]
    pub fn somas(&self) -> SomaGeometry {
        SomaGeometry {
            gids: self.gids.clone(),
            positions: self
                .cell_offsets
                .iter()
                .map(|&off| self.positions[off])
                .collect(),
        }
    }
}

/// One position per cell, restricted to the somatic segment.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SomaGeometry {
    pub gids: Vec<u64>,
    pub positions: Vec<Vec3>,
}

/// Static synapse locations for density sampling.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SynapsePositions {
    pub positions: Vec<Vec3>,
}
