pub use ts_core as core;
pub use ts_io as io;
pub use ts_point_cloud as point_cloud;

pub mod pipeline;

pub use pipeline::{process_dataset_sample, process_scan, PipelineConfig, Sample, ScanReport};
pub use ts_core::{Error, PointCloud, Result};
pub use ts_io::{load_kitti_bin, KittiDataset, Split};
pub use ts_point_cloud::{voxel_downsample, VoxelGrid, VoxelGridConfig};

/// Load a KITTI scan and voxel downsample its geometry with the default
/// configuration (0.5 m voxels, intensity dropped).
///
/// Priority order for the voxel size:
/// 1. `TENSORSTREAM_VOXEL_SIZE` env var
/// 2. the 0.5 m default
pub fn load_and_downsample<P: AsRef<std::path::Path>>(path: P) -> Result<PointCloud> {
    process_scan(path, &PipelineConfig::from_env()?).map(|(cloud, _)| cloud)
}
