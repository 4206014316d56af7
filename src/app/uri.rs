//! Volume descriptor URI parsing.
//!
//! The descriptor is a URI-like string whose scheme selects the source
//! variant and whose query carries a comma-separated `key=value` parameter
//! list:
//!
//! ```text
//! fieldvox://scene.json?target=column,report=voltage,maxError=0.001
//! fieldvoxsomas://scene.json?report=soma
//! fieldvoxspikes://scene.json?duration=1,dt=1,spikes=out.dat
//! fieldvoxsynapses://scene.json?resolution=2
//! ```
//!
//! Parsing happens entirely in the front end; the engine receives only the
//! resolved `SamplingConfig`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use fieldvox_core::config::{SamplingConfig, SourceKind};
use fieldvox_core::kernel::KernelKind;

/// A parsed volume descriptor: resolved config plus the scene data path.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeUri {
    pub config: SamplingConfig,
    pub scene: Option<PathBuf>,
}

/// Parses a volume descriptor string.
pub fn parse(uri: &str) -> Result<VolumeUri> {
    parse_with(uri, &SamplingConfig::default())
}

/// Parses a volume descriptor string over caller-supplied defaults
/// (e.g. a TOML config file); URI parameters take precedence.
pub fn parse_with(uri: &str, defaults: &SamplingConfig) -> Result<VolumeUri> {
    let (scheme, rest) = uri
        .split_once("://")
        .with_context(|| format!("`{uri}` is not a volume URI"))?;

    let source = match scheme.to_ascii_lowercase().as_str() {
        "fieldvox" | "fieldvoxcompartments" => SourceKind::Compartments,
        "fieldvoxsomas" => SourceKind::Somas,
        "fieldvoxspikes" => SourceKind::Spikes,
        "fieldvoxsynapses" => SourceKind::Synapses,
        other => bail!("unknown volume scheme `{other}`"),
    };

    let (path, query) = match rest.split_once('?') {
        Some((p, q)) => (p, q),
        None => (rest, ""),
    };

    let mut config = SamplingConfig {
        source,
        ..defaults.clone()
    };

    for pair in query.split(',').filter(|s| !s.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("parameter `{pair}` is not key=value"))?;
        apply_parameter(&mut config, key, value)?;
    }

    config.validate()?;
    Ok(VolumeUri {
        config,
        scene: if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        },
    })
}

fn apply_parameter(config: &mut SamplingConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "target" => config.target = Some(value.to_string()),
        "report" => config.report = Some(value.to_string()),
        "magnitude" => config.magnitude = Some(parse_num(key, value)?),
        "functor" => {
            config.functor = Some(match value.to_ascii_lowercase().as_str() {
                "field" => KernelKind::Field,
                "lfp" => KernelKind::Lfp,
                "density" => KernelKind::Density,
                "frequency" => KernelKind::Frequency,
                other => bail!("unknown functor `{other}`"),
            });
        }
        "resolution" => config.resolution = parse_num(key, value)?,
        "maxBlockSize" => {
            config.max_block_size = value
                .parse()
                .with_context(|| format!("`{value}` is not a valid maxBlockSize"))?;
        }
        "maxError" => config.max_error = parse_num(key, value)?,
        "reference" => config.cutoff_reference = parse_num(key, value)?,
        "dt" => config.dt = Some(parse_num(key, value)?),
        "duration" => config.duration = parse_num(key, value)?,
        "spikes" => config.spikes = Some(PathBuf::from(value)),
        "dyecurve" => config.dyecurve = Some(PathBuf::from(value)),
        other => bail!("unknown parameter `{other}`"),
    }
    Ok(())
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .ok()
        .with_context(|| format!("`{value}` is not a valid {key}"))
}
