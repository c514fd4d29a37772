//! KITTI object dataset index.
//!
//! Expects the standard training layout:
//!
//! ```text
//! <root>/velodyne/000000.bin
//! <root>/label_2/000000.txt
//! ```
//!
//! Frame ids are sorted, then the first 90% form the training split and the
//! remainder the validation split.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::kitti::{load_kitti_bin_with, KittiReadOptions};
use crate::label::{load_kitti_labels, KittiObject};
use crate::{Error, PointCloud, Result};

pub const VELODYNE_DIR: &str = "velodyne";
pub const LABEL_DIR: &str = "label_2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Split {
    Train,
    Val,
}

#[derive(Debug, Clone)]
pub struct KittiDataset {
    root: PathBuf,
    split: Split,
    ids: Vec<String>,
    read_options: KittiReadOptions,
}

impl KittiDataset {
    pub fn open<P: AsRef<Path>>(root: P, split: Split) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut ids = Vec::new();
        for entry in fs::read_dir(root.join(VELODYNE_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("bin") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();

        let split_idx = train_len(ids.len());
        let ids = match split {
            Split::Train => ids[..split_idx].to_vec(),
            Split::Val => ids[split_idx..].to_vec(),
        };
        tracing::debug!(root = %root.display(), ?split, frames = ids.len(), "opened kitti dataset");

        Ok(Self {
            root,
            split,
            ids,
            read_options: KittiReadOptions::default(),
        })
    }

    pub fn with_read_options(mut self, options: KittiReadOptions) -> Self {
        self.read_options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, index: usize) -> Result<&str> {
        self.ids
            .get(index)
            .map(String::as_str)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.ids.len(),
            })
    }

    pub fn velodyne_path(&self, index: usize) -> Result<PathBuf> {
        let id = self.id(index)?;
        Ok(self.root.join(VELODYNE_DIR).join(format!("{id}.bin")))
    }

    pub fn label_path(&self, index: usize) -> Result<PathBuf> {
        let id = self.id(index)?;
        Ok(self.root.join(LABEL_DIR).join(format!("{id}.txt")))
    }

    pub fn load_points(&self, index: usize) -> Result<PointCloud> {
        load_kitti_bin_with(self.velodyne_path(index)?, &self.read_options)
    }

    pub fn load_labels(&self, index: usize) -> Result<Vec<KittiObject>> {
        load_kitti_labels(self.label_path(index)?)
    }
}

/// Number of frames in the training split: `floor(0.9 * n)`.
fn train_len(n: usize) -> usize {
    n * 9 / 10
}
