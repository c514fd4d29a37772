//! KITTI object label files (`label_2/<id>.txt`).
//!
//! One object per line, whitespace separated:
//! `type truncated occluded alpha left top right bottom h w l x y z rotation_y [score]`

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const LABEL_FIELDS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Car,
    Van,
    Truck,
    Pedestrian,
    PersonSitting,
    Cyclist,
    Tram,
    Misc,
    DontCare,
    Other(String),
}

impl ObjectKind {
    /// Map a KITTI type string; unknown names become [`ObjectKind::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "Car" => ObjectKind::Car,
            "Van" => ObjectKind::Van,
            "Truck" => ObjectKind::Truck,
            "Pedestrian" => ObjectKind::Pedestrian,
            "Person_sitting" => ObjectKind::PersonSitting,
            "Cyclist" => ObjectKind::Cyclist,
            "Tram" => ObjectKind::Tram,
            "Misc" => ObjectKind::Misc,
            "DontCare" => ObjectKind::DontCare,
            other => ObjectKind::Other(other.to_string()),
        }
    }
}

/// One annotated object in camera coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KittiObject {
    pub kind: ObjectKind,
    pub truncated: f32,
    pub occluded: i32,
    pub alpha: f32,
    /// 2D box in image pixels: left, top, right, bottom.
    pub bbox: [f32; 4],
    /// height, width, length (meters).
    pub dimensions: [f32; 3],
    pub location: [f32; 3],
    pub rotation_y: f32,
    /// Present only in detection results.
    pub score: Option<f32>,
}

pub fn parse_kitti_label_line(line: &str) -> Result<KittiObject> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < LABEL_FIELDS {
        return Err(Error::Parse(format!(
            "KITTI label needs at least {} fields, got {}",
            LABEL_FIELDS,
            parts.len()
        )));
    }

    let num = |i: usize| -> Result<f32> {
        parts[i]
            .parse()
            .map_err(|_| Error::Parse(format!("Invalid number in field {}: {}", i, parts[i])))
    };

    let occluded = parts[2]
        .parse::<f32>()
        .map(|v| v as i32)
        .map_err(|_| Error::Parse(format!("Invalid occlusion state: {}", parts[2])))?;

    let score = match parts.get(LABEL_FIELDS) {
        Some(_) => Some(num(LABEL_FIELDS)?),
        None => None,
    };

    Ok(KittiObject {
        kind: ObjectKind::from_name(parts[0]),
        truncated: num(1)?,
        occluded,
        alpha: num(3)?,
        bbox: [num(4)?, num(5)?, num(6)?, num(7)?],
        dimensions: [num(8)?, num(9)?, num(10)?],
        location: [num(11)?, num(12)?, num(13)?],
        rotation_y: num(14)?,
        score,
    })
}

/// Parse every non-blank line of a label stream.
pub fn read_kitti_labels<R: BufRead>(reader: R) -> Result<Vec<KittiObject>> {
    let mut objects = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        objects.push(parse_kitti_label_line(&line)?);
    }
    Ok(objects)
}

pub fn load_kitti_labels<P: AsRef<Path>>(path: P) -> Result<Vec<KittiObject>> {
    read_kitti_labels(BufReader::new(File::open(path)?))
}

pub fn contains_kind(objects: &[KittiObject], kind: &ObjectKind) -> bool {
    objects.iter().any(|o| &o.kind == kind)
}

/// Binary scene target: does the frame contain at least one car?
pub fn has_car(objects: &[KittiObject]) -> bool {
    contains_kind(objects, &ObjectKind::Car)
}
