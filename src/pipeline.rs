//! Scan pipeline: load a velodyne scan, drop intensity, voxel downsample.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use ts_core::{PointCloud, Result};
use ts_io::{has_car, load_kitti_bin_with, KittiDataset, KittiReadOptions};
use ts_point_cloud::{VoxelGrid, VoxelGridConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub voxel: VoxelGridConfig,
    pub read: KittiReadOptions,
}

impl PipelineConfig {
    pub fn new(voxel: VoxelGridConfig) -> Self {
        Self {
            voxel,
            read: KittiReadOptions::default(),
        }
    }

    pub fn with_read_options(mut self, read: KittiReadOptions) -> Self {
        self.read = read;
        self
    }

    /// Default pipeline with the voxel size taken from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(VoxelGridConfig::from_env()?))
    }
}

/// Summary of one processed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub filename: String,
    pub original_points: usize,
    pub processed_points: usize,
    pub skipped_points: usize,
    pub latency_ms: f64,
}

/// A downsampled training frame with its binary target.
#[derive(Debug, Clone)]
pub struct Sample {
    pub id: String,
    pub points: PointCloud,
    pub report: ScanReport,
    pub has_car: bool,
}

/// Load and downsample one KITTI `.bin` scan.
pub fn process_scan<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Result<(PointCloud, ScanReport)> {
    let path = path.as_ref();
    let grid = VoxelGrid::new(config.voxel)?;

    let start = Instant::now();
    let raw = load_kitti_bin_with(path, &config.read)?;
    let (centroids, stats) = grid.downsample_with_stats(&raw.points)?;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    let report = ScanReport {
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        original_points: raw.len(),
        processed_points: centroids.len(),
        skipped_points: stats.skipped_points,
        latency_ms,
    };
    tracing::debug!(
        file = %report.filename,
        original = report.original_points,
        processed = report.processed_points,
        latency_ms = report.latency_ms,
        "processed scan"
    );

    Ok((PointCloud::new(centroids), report))
}

/// Load, downsample and label frame `index` of a dataset split.
pub fn process_dataset_sample(
    dataset: &KittiDataset,
    index: usize,
    config: &PipelineConfig,
) -> Result<Sample> {
    let id = dataset.id(index)?.to_string();
    let (points, report) = process_scan(dataset.velodyne_path(index)?, config)?;
    let labels = dataset.load_labels(index)?;

    Ok(Sample {
        id,
        points,
        report,
        has_car: has_car(&labels),
    })
}
