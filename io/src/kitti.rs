//! KITTI velodyne binary I/O
//!
//! A `.bin` scan is a headerless stream of little-endian `f32` records:
//!
//! ```text
//! ┌───────┬───────┬───────┬───────────────┐
//! │ x:f32 │ y:f32 │ z:f32 │ intensity:f32 │
//! │ 4B    │ 4B    │ 4B    │ 4B            │
//! └───────┴───────┴───────┴───────────────┘
//! ```
//!
//! The record count is `byte_length / 16`.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::{Error, PointCloud, Result};

/// Size of one `(x, y, z, intensity)` record in bytes.
pub const RECORD_BYTES: usize = 16;

/// Handling of a partial record at the end of the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailingBytes {
    /// Ignore the leftover bytes (logged at `warn`).
    #[default]
    Drop,
    /// Fail with [`Error::InvalidInput`].
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KittiReadOptions {
    pub trailing: TrailingBytes,
}

impl KittiReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject streams whose length is not a whole number of records.
    pub fn strict() -> Self {
        Self {
            trailing: TrailingBytes::Reject,
        }
    }

    pub fn with_trailing(mut self, trailing: TrailingBytes) -> Self {
        self.trailing = trailing;
        self
    }
}

/// Read a KITTI scan from a reader, dropping any trailing partial record.
pub fn read_kitti_bin<R: Read>(reader: R) -> Result<PointCloud> {
    read_kitti_bin_with(reader, &KittiReadOptions::default())
}

pub fn read_kitti_bin_with<R: Read>(mut reader: R, options: &KittiReadOptions) -> Result<PointCloud> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode_kitti_bin(&bytes, options)
}

/// Load a KITTI scan from disk.
///
/// A missing file surfaces as [`Error::Io`] with kind `NotFound`.
pub fn load_kitti_bin<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    load_kitti_bin_with(path, &KittiReadOptions::default())
}

pub fn load_kitti_bin_with<P: AsRef<Path>>(path: P, options: &KittiReadOptions) -> Result<PointCloud> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let cloud = decode_kitti_bin(&bytes, options)?;
    tracing::debug!(path = %path.display(), points = cloud.len(), "loaded kitti scan");
    Ok(cloud)
}

/// Decode an in-memory KITTI record buffer.
pub fn decode_kitti_bin(bytes: &[u8], options: &KittiReadOptions) -> Result<PointCloud> {
    let remainder = bytes.len() % RECORD_BYTES;
    if remainder != 0 {
        match options.trailing {
            TrailingBytes::Drop => {
                tracing::warn!(
                    len = bytes.len(),
                    dropped = remainder,
                    "kitti stream has a partial trailing record"
                );
            }
            TrailingBytes::Reject => {
                return Err(Error::InvalidInput(format!(
                    "KITTI stream length {} is not a multiple of {} ({} trailing bytes)",
                    bytes.len(),
                    RECORD_BYTES,
                    remainder
                )));
            }
        }
    }

    let count = bytes.len() / RECORD_BYTES;
    let mut points = Vec::with_capacity(count);
    let mut intensities = Vec::with_capacity(count);

    for record in bytes.chunks_exact(RECORD_BYTES) {
        let field = |offset: usize| {
            f32::from_le_bytes([
                record[offset],
                record[offset + 1],
                record[offset + 2],
                record[offset + 3],
            ])
        };
        points.push(Point3::new(field(0), field(4), field(8)));
        intensities.push(field(12));
    }

    Ok(PointCloud {
        points,
        intensities: Some(intensities),
    })
}

/// Write a cloud as KITTI records. Points without intensity are written with 0.0.
pub fn write_kitti_bin<W: Write>(writer: &mut W, cloud: &PointCloud) -> Result<()> {
    for (i, p) in cloud.points.iter().enumerate() {
        let intensity = cloud.intensity(i).unwrap_or(0.0);
        for v in [p.x, p.y, p.z, intensity] {
            writer.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

pub fn save_kitti_bin<P: AsRef<Path>>(path: P, cloud: &PointCloud) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_kitti_bin(&mut writer, cloud)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn records() -> Vec<[f32; 4]> {
        vec![
            [1.0, 2.0, 3.0, 0.5],
            [-4.25, 0.0, 1e-7, 1.0],
            [f32::MAX, f32::MIN_POSITIVE, -0.0, 0.0],
        ]
    }

    #[test]
    fn test_write_then_read_is_bit_exact() {
        let cloud = PointCloud::from_xyzi(&records());
        let mut buf = Vec::new();
        write_kitti_bin(&mut buf, &cloud).unwrap();
        assert_eq!(buf.len(), 3 * RECORD_BYTES);

        let read = read_kitti_bin(Cursor::new(&buf)).unwrap();
        assert_eq!(read.len(), 3);
        for (a, b) in read.points.iter().zip(&cloud.points) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
            assert_eq!(a.z.to_bits(), b.z.to_bits());
        }
        assert_eq!(read.intensities, cloud.intensities);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut bytes = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 4.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x80, 0x3f]);

        let cloud = decode_kitti_bin(&bytes, &KittiReadOptions::default()).unwrap();
        assert_eq!(cloud.points, vec![Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(cloud.intensity(0), Some(4.0));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut buf = Vec::new();
        write_kitti_bin(&mut buf, &PointCloud::from_xyzi(&records())).unwrap();
        buf.extend_from_slice(&[1, 2, 3, 4, 5]);

        let lenient = read_kitti_bin(Cursor::new(&buf)).unwrap();
        assert_eq!(lenient.len(), 3);

        let err = read_kitti_bin_with(Cursor::new(&buf), &KittiReadOptions::strict()).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("5 trailing bytes"));
    }

    #[test]
    fn test_empty_and_short_streams() {
        let empty = read_kitti_bin(Cursor::new(Vec::<u8>::new())).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.intensities, Some(Vec::new()));

        let short = read_kitti_bin(Cursor::new(vec![0u8; 15])).unwrap();
        assert!(short.is_empty());
    }

    #[test]
    fn test_write_without_intensity() {
        let cloud = PointCloud::new(vec![Point3::new(1.0, 1.0, 1.0)]);
        let mut buf = Vec::new();
        write_kitti_bin(&mut buf, &cloud).unwrap();
        let read = read_kitti_bin(Cursor::new(&buf)).unwrap();
        assert_eq!(read.intensity(0), Some(0.0));
    }
}
