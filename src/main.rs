use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fieldvox_core::error::{LoadError, VoxelizeError};
use fieldvox_core::frame::FrameRange;
use fieldvox_core::kernel::FieldFunctor;
use fieldvox_core::volume::{ScalarPrecision, Volume, VolumeDescriptor};
use fieldvox_core::voxelizer::Voxelizer;
use fieldvox_core::SamplingConfig;
use fieldvox_lib::app::{init_logging, input, uri, writer};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sample simulation events into voxel volumes", long_about = None)]
struct Args {
    /// Volume URI: fieldvox[somas|spikes|synapses]://scene.json?key=value,...
    #[arg(long, default_value = "fieldvox://")]
    volume: String,

    /// Optional TOML config supplying parameter defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Size of the output volume (voxels per side)
    #[arg(short, long, default_value_t = 256)]
    size: usize,

    /// Type of the data in the output volume
    #[arg(short, long, value_enum, default_value = "float")]
    datatype: Datatype,

    /// Timestamp to load in the report (ms)
    #[arg(short, long)]
    time: Option<f64>,

    /// Time range [start end) to load in the report (ms)
    #[arg(long, num_args = 2)]
    times: Option<Vec<f64>>,

    /// Frame to load in the report
    #[arg(short, long)]
    frame: Option<u32>,

    /// Frame range [start end) to load in the report
    #[arg(long, num_args = 2)]
    frames: Option<Vec<u32>>,

    /// Name of the output volume file; contains the frame number when a
    /// range is requested
    #[arg(short, long, default_value = "volume")]
    output: PathBuf,

    /// Worker threads for region-parallel sampling (default: all cores)
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Datatype {
    Char,
    Short,
    Int,
    Float,
}

impl From<Datatype> for ScalarPrecision {
    fn from(d: Datatype) -> Self {
        match d {
            Datatype::Char => Self::U8,
            Datatype::Short => Self::U16,
            Datatype::Int => Self::U32,
            Datatype::Float => Self::F32,
        }
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring worker threads")?;
    }

    let defaults = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config `{}`", path.display()))?;
            toml::from_str::<SamplingConfig>(&text)
                .with_context(|| format!("parsing config `{}`", path.display()))?
        }
        None => SamplingConfig::default(),
    };

    let parsed = uri::parse_with(&args.volume, &defaults)?;
    let scene_path = parsed
        .scene
        .clone()
        .context("volume URI carries no scene path")?;
    let scene = input::load_scene(&scene_path)?;
    let mut source = input::build_source(&parsed.config, &scene)?;

    let descriptor = VolumeDescriptor::fit(
        &source.bounding_box(),
        args.size,
        ScalarPrecision::from(args.datatype),
    );
    info!(
        origin = ?descriptor.origin,
        spacing = descriptor.spacing,
        size = args.size,
        "output volume geometry"
    );

    let range = select_frames(&args, source.frame_time(0), source.dt())?;
    let functor = FieldFunctor::for_config(&parsed.config);
    let mut volume = Volume::new(descriptor);
    let mut voxelizer = Voxelizer::new(&descriptor, parsed.config.max_block_size);

    let digits = range.end.max(1).to_string().len();
    for frame in range.start..range.end {
        let time = source.frame_time(frame);
        match voxelizer.sample(source.as_mut(), &functor, time, &mut volume) {
            Ok(events) => {
                let base = if range.len() > 1 {
                    let name = format!(
                        "{}{frame:0digits$}",
                        args.output.file_name().unwrap_or_default().to_string_lossy()
                    );
                    args.output.with_file_name(name)
                } else {
                    args.output.clone()
                };
                writer::write_volume(&volume, &base)?;
                info!(frame, events, output = %base.display(), "frame sampled");
            }
            Err(VoxelizeError::Load(LoadError::NotReady { frame })) => {
                warn!(frame, "frame not complete yet; skipping");
            }
            Err(VoxelizeError::Load(LoadError::OutOfRange)) => {
                error!(frame, "frame outside the source range; stopping");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Resolves the requested frame selection; just frame 0 by default.
/// Timestamps are relative to the source's frame-0 anchor.
fn select_frames(args: &Args, start: f64, dt: f64) -> Result<FrameRange> {
    let mut range = FrameRange::new(0, 1);
    if let Some(time) = args.time {
        let frame = ((time - start) / dt) as u32;
        range = FrameRange::new(frame, frame + 1);
    }
    if let Some(times) = &args.times {
        range = FrameRange::new(
            ((times[0] - start) / dt) as u32,
            ((times[1] - start) / dt) as u32,
        );
    }
    if let Some(frame) = args.frame {
        range = FrameRange::new(frame, frame + 1);
    }
    if let Some(frames) = &args.frames {
        range = FrameRange::new(frames[0], frames[1]);
    }
    anyhow::ensure!(!range.is_empty(), "requested frame range is empty");
    Ok(range)
}
