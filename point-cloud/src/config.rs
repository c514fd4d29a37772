//! Voxel grid configuration.

use serde::{Deserialize, Serialize};
use ts_core::env::read_env;
use ts_core::{Error, Result};

/// Voxel edge length used by the KITTI processing pipeline (meters).
pub const DEFAULT_VOXEL_SIZE: f32 = 0.5;

/// Environment variable overriding [`VoxelGridConfig::voxel_size`].
pub const VOXEL_SIZE_ENV: &str = "TENSORSTREAM_VOXEL_SIZE";

/// Floating-point width of the per-voxel running sums.
///
/// Input and output points are always `f32`; this only controls the
/// accumulator. `Single` matches the historical behaviour bit for bit but
/// loses precision once a voxel holds many points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccumulatorPrecision {
    Single,
    #[default]
    Double,
}

/// What to do with points that have a NaN or infinite coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonFinitePolicy {
    /// Bucket them like any other point. NaN maps to cell 0 and ±Inf
    /// saturates to `i32::MIN`/`i32::MAX`, so they poison exactly one centroid.
    Propagate,
    /// Fail the whole call with `InvalidArgument`.
    #[default]
    Reject,
    /// Drop them and count them in the downsampling stats.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoxelGridConfig {
    /// Voxel edge length. Must be finite and strictly positive.
    pub voxel_size: f32,
    pub precision: AccumulatorPrecision,
    pub non_finite: NonFinitePolicy,
}

impl Default for VoxelGridConfig {
    fn default() -> Self {
        Self {
            voxel_size: DEFAULT_VOXEL_SIZE,
            precision: AccumulatorPrecision::Double,
            non_finite: NonFinitePolicy::Reject,
        }
    }
}

impl VoxelGridConfig {
    pub fn new(voxel_size: f32) -> Self {
        Self {
            voxel_size,
            ..Self::default()
        }
    }

    /// Settings used for KITTI velodyne scans.
    pub fn kitti() -> Self {
        Self::new(DEFAULT_VOXEL_SIZE)
    }

    pub fn fine() -> Self {
        Self::new(0.1)
    }

    pub fn coarse() -> Self {
        Self::new(1.0)
    }

    /// Single-precision sums and no input validation, matching a plain
    /// `f32` sorted-map aggregation bit for bit.
    pub fn reference(voxel_size: f32) -> Self {
        Self {
            voxel_size,
            precision: AccumulatorPrecision::Single,
            non_finite: NonFinitePolicy::Propagate,
        }
    }

    pub fn with_voxel_size(mut self, voxel_size: f32) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    pub fn with_precision(mut self, precision: AccumulatorPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_non_finite(mut self, policy: NonFinitePolicy) -> Self {
        self.non_finite = policy;
        self
    }

    /// Default configuration with the voxel size taken from
    /// `TENSORSTREAM_VOXEL_SIZE` when it is set.
    pub fn from_env() -> Result<Self> {
        let config = match read_env::<f32>(VOXEL_SIZE_ENV)? {
            Some(size) => Self::new(size),
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_voxel_size(self.voxel_size)
    }
}

pub(crate) fn validate_voxel_size(voxel_size: f32) -> Result<()> {
    if !voxel_size.is_finite() || voxel_size <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "voxel size must be finite and > 0, got {voxel_size}"
        )));
    }
    Ok(())
}
