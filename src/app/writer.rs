//! MHD volume export.
//!
//! Writes a MetaImage pair: a text `.mhd` header and a raw little-endian
//! `.raw` payload. Integer precisions rescale the sampled range onto the
//! full type range; float output keeps the raw sampled values.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use fieldvox_core::volume::{ScalarPrecision, Volume};
use tracing::info;

/// Writes `volume` as `<base>.mhd` + `<base>.raw`.
pub fn write_volume(volume: &Volume, base: &Path) -> Result<()> {
    let desc = volume.descriptor();
    let mhd_path = base.with_extension("mhd");
    let raw_path = base.with_extension("raw");
    let raw_name = raw_path
        .file_name()
        .context("output path has no file name")?
        .to_string_lossy()
        .into_owned();

    let element_type = match desc.precision {
        ScalarPrecision::U8 => "MET_UCHAR",
        ScalarPrecision::U16 => "MET_USHORT",
        ScalarPrecision::U32 => "MET_UINT",
        ScalarPrecision::F32 => "MET_FLOAT",
    };

    let header = format!(
        "ObjectType = Image\n\
         NDims = 3\n\
         BinaryData = True\n\
         BinaryDataByteOrderMSB = False\n\
         CompressedData = False\n\
         TransformMatrix = 1 0 0 0 1 0 0 0 1\n\
         Offset = {} {} {}\n\
         ElementSpacing = {} {} {}\n\
         DimSize = {} {} {}\n\
         ElementType = {}\n\
         ElementDataFile = {}\n",
        desc.origin.x,
        desc.origin.y,
        desc.origin.z,
        desc.spacing,
        desc.spacing,
        desc.spacing,
        desc.resolution[0],
        desc.resolution[1],
        desc.resolution[2],
        element_type,
        raw_name,
    );
    fs::write(&mhd_path, header)
        .with_context(|| format!("writing `{}`", mhd_path.display()))?;

    let mut raw = fs::File::create(&raw_path)
        .with_context(|| format!("writing `{}`", raw_path.display()))?;
    match desc.precision {
        ScalarPrecision::F32 => {
            let mut bytes = Vec::with_capacity(volume.data().len() * 4);
            for &v in volume.data() {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            raw.write_all(&bytes)?;
        }
        ScalarPrecision::U8 => write_rescaled::<u8>(&mut raw, volume.data())?,
        ScalarPrecision::U16 => write_rescaled::<u16>(&mut raw, volume.data())?,
        ScalarPrecision::U32 => write_rescaled::<u32>(&mut raw, volume.data())?,
    }

    info!(path = %mhd_path.display(), voxels = volume.data().len(), "volume written");
    Ok(())
}

trait RescaleTarget: Copy {
    const MAX: f64;
    fn from_f64(v: f64) -> Self;
    fn push_le(self, out: &mut Vec<u8>);
}

macro_rules! impl_rescale_target {
    ($t:ty) => {
        impl RescaleTarget for $t {
            const MAX: f64 = <$t>::MAX as f64;
            fn from_f64(v: f64) -> Self {
                // The inherent `<$t>::MAX` shadows the trait const here, so
                // qualify to get the f64 bound.
                v.round().clamp(0.0, <Self as RescaleTarget>::MAX) as $t
            }
            fn push_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }
        }
    };
}

impl_rescale_target!(u8);
impl_rescale_target!(u16);
impl_rescale_target!(u32);

/// Rescales the sampled min..max range onto the full integer range.
fn write_rescaled<T: RescaleTarget>(out: &mut fs::File, data: &[f32]) -> Result<()> {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &v in data {
        min = min.min(v);
        max = max.max(v);
    }
    let span = f64::from(max) - f64::from(min);

    let mut bytes = Vec::with_capacity(data.len() * std::mem::size_of::<T>());
    for &v in data {
        let normalized = if span > 0.0 {
            (f64::from(v) - f64::from(min)) / span
        } else {
            0.0
        };
        T::from_f64(normalized * T::MAX).push_le(&mut bytes);
    }
    out.write_all(&bytes)?;
    Ok(())
}
