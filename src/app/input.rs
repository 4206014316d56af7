//! Input loading: scene files and spike files.
//!
//! A scene file is a JSON bundle with the prepared circuit geometry and,
//! depending on the source variant, a report or synapse positions. Spike
//! files are plain text, one `time gid` pair per line, `#` comments.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use fieldvox_core::config::{SamplingConfig, SourceKind};
use fieldvox_core::sources::{
    CompartmentSource, EventSource, SomaSource, SpikeSource, SpikeStream, SynapseSource,
};
use fieldvox_data::{CircuitGeometry, InMemoryReport, SpikeRecord, SynapsePositions};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Prepared input bundle: geometry plus whichever payloads the scene carries.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Scene {
    #[serde(default)]
    pub geometry: CircuitGeometry,
    #[serde(default)]
    pub report: Option<InMemoryReport>,
    #[serde(default)]
    pub synapses: Option<SynapsePositions>,
}

/// Loads a JSON scene file.
pub fn load_scene(path: &Path) -> Result<Scene> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scene `{}`", path.display()))?;
    let scene: Scene =
        serde_json::from_str(&text).with_context(|| format!("parsing `{}`", path.display()))?;
    info!(
        cells = scene.geometry.cell_count(),
        compartments = scene.geometry.compartment_count(),
        "scene loaded"
    );
    Ok(scene)
}

/// Loads a plain-text spike file (`time gid` per line).
pub fn load_spikes(path: &Path) -> Result<Vec<SpikeRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading spikes `{}`", path.display()))?;
    let mut records = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(time), Some(gid)) = (fields.next(), fields.next()) else {
            bail!("{}:{}: expected `time gid`", path.display(), lineno + 1);
        };
        records.push(SpikeRecord {
            time: time
                .parse()
                .with_context(|| format!("{}:{}: bad timestamp", path.display(), lineno + 1))?,
            gid: gid
                .parse()
                .with_context(|| format!("{}:{}: bad gid", path.display(), lineno + 1))?,
        });
    }
    info!(spikes = records.len(), path = %path.display(), "spike file loaded");
    Ok(records)
}

/// Builds the configured event source from a scene.
pub fn build_source(config: &SamplingConfig, scene: &Scene) -> Result<Box<dyn EventSource>> {
    Ok(match config.source {
        SourceKind::Compartments => {
            let report = scene
                .report
                .clone()
                .context("scene has no report; compartment sources need one")?;
            Box::new(CompartmentSource::new(&scene.geometry, Box::new(report), config)?)
        }
        SourceKind::Somas => {
            let report = scene
                .report
                .clone()
                .context("scene has no report; soma sources need one")?;
            Box::new(SomaSource::new(&scene.geometry, Box::new(report), config)?)
        }
        SourceKind::Spikes => {
            let path = config
                .spikes
                .as_ref()
                .context("spike sources need a spikes=path parameter")?;
            let records = load_spikes(path)?;
            let dt = config.dt.unwrap_or(config.duration);
            let stream = SpikeStream::replay(records, dt, config.duration);
            Box::new(SpikeSource::new(&scene.geometry.somas(), Arc::clone(&stream), config)?)
        }
        SourceKind::Synapses => {
            let synapses = scene
                .synapses
                .clone()
                .context("scene has no synapse positions")?;
            Box::new(SynapseSource::new(&synapses, config)?)
        }
    })
}
