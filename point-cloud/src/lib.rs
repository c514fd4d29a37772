//! Point Cloud Operations
//!
//! CPU voxel grid downsampling for 3D point clouds.
//!
//! # Module Organization
//!
//! - `config`: [`VoxelGridConfig`] and its accumulation / validation policies
//! - `voxel`: the [`VoxelGrid`] aggregator, [`VoxelKey`] binning and the
//!   [`voxel_downsample`] entry point
//!
//! # Usage
//!
//! ```rust
//! use nalgebra::Point3;
//! use ts_point_cloud::voxel_downsample;
//!
//! let points = vec![
//!     Point3::new(0.1, 0.1, 0.1),
//!     Point3::new(0.3, 0.3, 0.3),
//!     Point3::new(1.5, 0.1, 0.1),
//! ];
//! let centroids = voxel_downsample(&points, 1.0).unwrap();
//! assert_eq!(centroids.len(), 2);
//! ```

pub mod config;
pub mod voxel;

pub use config::*;
pub use voxel::*;

pub use ts_core::{Error, PointCloud, Result};
