use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// An owned set of 3D points with optional per-point intensity.
///
/// Points and intensities are stored as parallel contiguous buffers; when
/// `intensities` is present it always has exactly `points.len()` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub points: Vec<Point3<f32>>,
    pub intensities: Option<Vec<f32>>,
}

impl PointCloud {
    pub fn new(points: Vec<Point3<f32>>) -> Self {
        Self {
            points,
            intensities: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(Vec::with_capacity(capacity))
    }

    pub fn with_intensities(mut self, intensities: Vec<f32>) -> crate::Result<Self> {
        if intensities.len() == self.points.len() {
            self.intensities = Some(intensities);
            Ok(self)
        } else {
            Err(crate::Error::InvalidInput(format!(
                "Intensity count {} does not match point count {}",
                intensities.len(),
                self.points.len()
            )))
        }
    }

    /// Build a cloud from flat `[x, y, z, intensity]` records.
    pub fn from_xyzi(records: &[[f32; 4]]) -> Self {
        let points = records
            .iter()
            .map(|r| Point3::new(r[0], r[1], r[2]))
            .collect();
        let intensities = records.iter().map(|r| r[3]).collect();
        Self {
            points,
            intensities: Some(intensities),
        }
    }

    /// Drop the intensity channel, keeping only geometry.
    pub fn xyz(&self) -> PointCloud {
        PointCloud::new(self.points.clone())
    }

    /// Intensity of point `index`, or 0.0 when the cloud carries none.
    pub fn intensity(&self, index: usize) -> Option<f32> {
        if index >= self.points.len() {
            return None;
        }
        Some(
            self.intensities
                .as_ref()
                .and_then(|i| i.get(index).copied())
                .unwrap_or(0.0),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<Point3<f32>>> for PointCloud {
    fn from(points: Vec<Point3<f32>>) -> Self {
        Self::new(points)
    }
}
