use std::fs;
use std::io::Write;

use tempfile::tempdir;
use tensorstream::io::{save_kitti_bin, KittiReadOptions};
use tensorstream::point_cloud::{NonFinitePolicy, VoxelKey};
use tensorstream::{
    process_dataset_sample, process_scan, Error, KittiDataset, PipelineConfig, PointCloud, Split,
    VoxelGridConfig,
};

/// Ring of points around the sensor at a fixed height, like one lidar beam.
fn ring(n: usize, radius: f32, z: f32) -> Vec<[f32; 4]> {
    (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            [radius * a.cos(), radius * a.sin(), z, 0.3]
        })
        .collect()
}

#[test]
fn test_scan_downsample_end_to_end() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("000042.bin");
    let mut records = ring(2_000, 10.0, -1.7);
    records.extend(ring(2_000, 20.0, -1.7));
    save_kitti_bin(&path, &PointCloud::from_xyzi(&records)).unwrap();

    let (down, report) = process_scan(&path, &PipelineConfig::default()).unwrap();
    assert_eq!(report.filename, "000042.bin");
    assert_eq!(report.original_points, 4_000);
    assert_eq!(report.processed_points, down.len());
    assert!(down.len() > 0 && down.len() < 4_000);

    let keys: Vec<VoxelKey> = down.points.iter().map(|p| VoxelKey::from_point(p, 0.5)).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));

    let coarse = PipelineConfig::new(VoxelGridConfig::coarse());
    let (down_coarse, _) = process_scan(&path, &coarse).unwrap();
    assert!(down_coarse.len() <= down.len());
}

#[test]
fn test_scan_with_nan_points() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nan.bin");
    let mut records = ring(100, 5.0, 0.0);
    records.push([f32::NAN, 0.0, 0.0, 0.0]);
    save_kitti_bin(&path, &PointCloud::from_xyzi(&records)).unwrap();

    let err = process_scan(&path, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let skip = PipelineConfig::new(VoxelGridConfig::default().with_non_finite(NonFinitePolicy::Skip));
    let (_, report) = process_scan(&path, &skip).unwrap();
    assert_eq!(report.skipped_points, 1);
    assert_eq!(report.original_points, 101);
}

#[test]
fn test_strict_read_propagates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.bin");
    save_kitti_bin(&path, &PointCloud::from_xyzi(&ring(10, 1.0, 0.0))).unwrap();
    fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap()
        .write_all(&[0u8; 3])
        .unwrap();

    assert!(process_scan(&path, &PipelineConfig::default()).is_ok());
    let strict = PipelineConfig::default().with_read_options(KittiReadOptions::strict());
    assert!(matches!(
        process_scan(&path, &strict),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_dataset_sample() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("velodyne")).unwrap();
    fs::create_dir(dir.path().join("label_2")).unwrap();
    for i in 0..3 {
        let id = format!("{i:06}");
        save_kitti_bin(
            dir.path().join("velodyne").join(format!("{id}.bin")),
            &PointCloud::from_xyzi(&ring(500, 8.0 + i as f32, -1.0)),
        )
        .unwrap();
        let kind = if i == 1 { "Car" } else { "Cyclist" };
        fs::write(
            dir.path().join("label_2").join(format!("{id}.txt")),
            format!("{kind} 0.00 0 0.0 1 1 2 2 1.5 1.6 3.9 0.0 1.7 20.0 0.0\n"),
        )
        .unwrap();
    }

    // floor(0.9 * 3) = 2 training frames
    let train = KittiDataset::open(dir.path(), Split::Train).unwrap();
    assert_eq!(train.len(), 2);

    let config = PipelineConfig::default();
    let first = process_dataset_sample(&train, 0, &config).unwrap();
    let second = process_dataset_sample(&train, 1, &config).unwrap();
    assert_eq!(first.id, "000000");
    assert!(!first.has_car);
    assert!(second.has_car);
    assert_eq!(second.report.original_points, 500);
    assert_eq!(second.points.len(), second.report.processed_points);

    assert!(matches!(
        process_dataset_sample(&train, 2, &config),
        Err(Error::IndexOutOfRange { index: 2, len: 2 })
    ));
}

#[test]
fn test_load_and_downsample_default() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.bin");
    save_kitti_bin(&path, &PointCloud::from_xyzi(&[[0.1, 0.1, 0.1, 1.0], [0.2, 0.1, 0.1, 1.0]]))
        .unwrap();

    let down = tensorstream::load_and_downsample(&path).unwrap();
    assert_eq!(down.len(), 1);

    let missing = tensorstream::load_and_downsample(dir.path().join("missing.bin")).unwrap_err();
    assert_eq!(missing.io_kind(), Some(std::io::ErrorKind::NotFound));
}
