//! Voxel grid downsampling.
//!
//! Space is cut into axis-aligned cubes of edge `voxel_size`. Every input
//! point is assigned to the cube containing it, and each occupied cube is
//! replaced by the mean of its points.
//!
//! # Output order
//!
//! Centroids are returned in ascending [`VoxelKey`] order: by x cell, then y
//! cell, then z cell. The order depends only on the set of occupied cells,
//! never on the order of the input points.

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use ts_core::{Error, PointCloud, Result};

use crate::config::{AccumulatorPrecision, NonFinitePolicy, VoxelGridConfig};

/// Integer cell coordinates of a voxel. Orders lexicographically (x, y, z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct VoxelKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelKey {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Cell containing `p`: `floor(coord / voxel_size)` on each axis.
    ///
    /// Flooring keeps negative coordinates in the right cell (-0.1 with size
    /// 1.0 is cell -1, not 0). Quotients outside the `i32` range saturate,
    /// and NaN maps to 0.
    #[inline]
    pub fn from_point(p: &Point3<f32>, voxel_size: f32) -> Self {
        Self {
            x: cell_index(p.x, voxel_size),
            y: cell_index(p.y, voxel_size),
            z: cell_index(p.z, voxel_size),
        }
    }
}

#[inline]
fn cell_index(coord: f32, voxel_size: f32) -> i32 {
    (coord / voxel_size).floor() as i32
}

#[derive(Debug, Clone, Copy)]
enum Sums {
    Single(Vector3<f32>),
    Double(Vector3<f64>),
}

/// Running sum and count for the points of one voxel.
#[derive(Debug, Clone, Copy)]
pub struct VoxelAccumulator {
    sums: Sums,
    count: u32,
}

impl VoxelAccumulator {
    pub fn new(precision: AccumulatorPrecision) -> Self {
        let sums = match precision {
            AccumulatorPrecision::Single => Sums::Single(Vector3::zeros()),
            AccumulatorPrecision::Double => Sums::Double(Vector3::zeros()),
        };
        Self { sums, count: 0 }
    }

    #[inline]
    pub fn push(&mut self, p: &Point3<f32>) {
        match &mut self.sums {
            Sums::Single(s) => *s += p.coords,
            Sums::Double(s) => *s += p.coords.map(f64::from),
        }
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean of the pushed points, or `None` if nothing was pushed.
    pub fn centroid(&self) -> Option<Point3<f32>> {
        if self.count == 0 {
            return None;
        }
        let c = match self.sums {
            Sums::Single(s) => {
                let n = self.count as f32;
                Point3::new(s.x / n, s.y / n, s.z / n)
            }
            Sums::Double(s) => {
                let n = f64::from(self.count);
                Point3::new((s.x / n) as f32, (s.y / n) as f32, (s.z / n) as f32)
            }
        };
        Some(c)
    }
}

/// Counters describing one downsampling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownsampleStats {
    pub input_points: usize,
    pub output_points: usize,
    /// Points dropped under [`NonFinitePolicy::Skip`].
    pub skipped_points: usize,
    /// Largest number of input points merged into a single centroid.
    pub max_points_per_voxel: u32,
}

/// Voxel grid downsampler.
///
/// Holds only validated configuration; each call builds and discards its own
/// accumulator table, so one grid can be shared freely across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGrid {
    config: VoxelGridConfig,
}

impl VoxelGrid {
    pub fn new(config: VoxelGridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_voxel_size(voxel_size: f32) -> Result<Self> {
        Self::new(VoxelGridConfig::new(voxel_size))
    }

    pub fn config(&self) -> &VoxelGridConfig {
        &self.config
    }

    pub fn voxel_size(&self) -> f32 {
        self.config.voxel_size
    }

    pub fn key_for(&self, p: &Point3<f32>) -> VoxelKey {
        VoxelKey::from_point(p, self.config.voxel_size)
    }

    /// One centroid per occupied voxel, in ascending key order.
    pub fn downsample(&self, points: &[Point3<f32>]) -> Result<Vec<Point3<f32>>> {
        self.downsample_with_stats(points).map(|(out, _)| out)
    }

    pub fn downsample_with_stats(
        &self,
        points: &[Point3<f32>],
    ) -> Result<(Vec<Point3<f32>>, DownsampleStats)> {
        let (grid, skipped) = self.accumulate(points)?;

        let mut out = Vec::with_capacity(grid.len());
        let mut max_count = 0;
        for acc in grid.values() {
            max_count = max_count.max(acc.count());
            if let Some(c) = acc.centroid() {
                out.push(c);
            }
        }

        let stats = DownsampleStats {
            input_points: points.len(),
            output_points: out.len(),
            skipped_points: skipped,
            max_points_per_voxel: max_count,
        };
        tracing::debug!(
            voxel_size = self.config.voxel_size,
            input = stats.input_points,
            output = stats.output_points,
            skipped = stats.skipped_points,
            "voxel downsample"
        );
        Ok((out, stats))
    }

    /// Downsample a cloud's geometry. The result carries no intensity.
    pub fn downsample_cloud(&self, cloud: &PointCloud) -> Result<PointCloud> {
        self.downsample(&cloud.points).map(PointCloud::new)
    }

    /// Build the key -> accumulator table for `points`.
    ///
    /// Returns the table and the number of points skipped as non-finite.
    pub fn accumulate(
        &self,
        points: &[Point3<f32>],
    ) -> Result<(BTreeMap<VoxelKey, VoxelAccumulator>, usize)> {
        let mut grid: BTreeMap<VoxelKey, VoxelAccumulator> = BTreeMap::new();
        let mut skipped = 0;

        for (i, p) in points.iter().enumerate() {
            if !is_finite(p) {
                match self.config.non_finite {
                    NonFinitePolicy::Propagate => {}
                    NonFinitePolicy::Reject => {
                        return Err(Error::InvalidArgument(format!(
                            "point {i} has a non-finite coordinate ({}, {}, {})",
                            p.x, p.y, p.z
                        )));
                    }
                    NonFinitePolicy::Skip => {
                        skipped += 1;
                        continue;
                    }
                }
            }

            grid.entry(self.key_for(p))
                .or_insert_with(|| VoxelAccumulator::new(self.config.precision))
                .push(p);
        }

        if skipped > 0 {
            tracing::warn!(skipped, "dropped points with non-finite coordinates");
        }
        Ok((grid, skipped))
    }
}

#[inline]
fn is_finite(p: &Point3<f32>) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// Downsample `points` with a voxel grid of edge `voxel_size`.
///
/// Returns one centroid per occupied voxel, sorted by voxel key (x, then y,
/// then z). Empty input gives empty output. Fails with
/// [`Error::InvalidArgument`] if `voxel_size` is not finite and positive, or
/// if any point has a non-finite coordinate.
pub fn voxel_downsample(points: &[Point3<f32>], voxel_size: f32) -> Result<Vec<Point3<f32>>> {
    VoxelGrid::with_voxel_size(voxel_size)?.downsample(points)
}

/// [`voxel_downsample`] over a [`PointCloud`]. Intensity is not carried over.
pub fn voxel_downsample_cloud(cloud: &PointCloud, voxel_size: f32) -> Result<PointCloud> {
    VoxelGrid::with_voxel_size(voxel_size)?.downsample_cloud(cloud)
}
