//! Point Cloud File I/O
//!
//! Reading and writing KITTI data:
//! - [`kitti`]: velodyne `.bin` scans (flat little-endian `f32` x, y, z, intensity records)
//! - [`label`]: `label_2` object annotations
//! - [`dataset`]: indexing a KITTI training directory into train/val splits

pub mod dataset;
pub mod kitti;
pub mod label;

pub use dataset::{KittiDataset, Split};
pub use kitti::{
    decode_kitti_bin, load_kitti_bin, load_kitti_bin_with, read_kitti_bin, read_kitti_bin_with,
    save_kitti_bin, write_kitti_bin, KittiReadOptions, TrailingBytes,
};
pub use label::{
    contains_kind, has_car, load_kitti_labels, parse_kitti_label_line, read_kitti_labels,
    KittiObject, ObjectKind,
};

pub use ts_core::{Error, PointCloud, Result};
