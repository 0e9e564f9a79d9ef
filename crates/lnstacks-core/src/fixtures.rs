//! Stack files for unit tests.

use std::path::Path;

use hdf5::File;
use ndarray::{arr0, Array1, Array3, ArrayD};

use crate::models::MRC_HEADER_LEN;

/// Optional metadata datasets written next to the stack.
#[derive(Default)]
pub struct Hdf5Fixture {
    pub rotation_angle: Option<Array1<f64>>,
    pub energy: Option<f64>,
    pub x_pixel_size: Option<f32>,
    pub y_pixel_size: Option<f32>,
}

pub fn write_hdf5_stack(path: &Path, tree: &str, dataset: &str, data: &Array3<f32>, meta: &Hdf5Fixture) {
    let file = File::create(path).unwrap();
    let group = file.create_group(tree).unwrap();
    group
        .new_dataset_builder()
        .with_data(data)
        .create(dataset)
        .unwrap();

    if let Some(angles) = &meta.rotation_angle {
        group
            .new_dataset_builder()
            .with_data(angles)
            .create("rotation_angle")
            .unwrap();
    }
    if let Some(energy) = meta.energy {
        group
            .new_dataset_builder()
            .with_data(&arr0(energy))
            .create("energy")
            .unwrap();
    }
    if let Some(x) = meta.x_pixel_size {
        group
            .new_dataset_builder()
            .with_data(&arr0(x))
            .create("x_pixel_size")
            .unwrap();
    }
    if let Some(y) = meta.y_pixel_size {
        group
            .new_dataset_builder()
            .with_data(&arr0(y))
            .create("y_pixel_size")
            .unwrap();
    }
}

/// Raw MRC bytes: header words `[cols, rows, frames, 2, 0, 0, 0, cols, rows, frames]`
/// followed by `samples` as little-endian float32.
pub fn mrc_bytes(cols: u32, rows: u32, frames: u32, samples: &[f32]) -> Vec<u8> {
    let words = [cols, rows, frames, 2, 0, 0, 0, cols, rows, frames];
    let mut bytes = Vec::with_capacity(MRC_HEADER_LEN + samples.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes.resize(MRC_HEADER_LEN, 0);
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    bytes
}

pub fn write_mrc_stack(path: &Path, cols: u32, rows: u32, frames: u32, samples: &[f32]) {
    std::fs::write(path, mrc_bytes(cols, rows, frames, samples)).unwrap();
}

/// Read `<tree>/<dataset>` of an output file.
pub fn read_stack(path: &Path, tree: &str, dataset: &str) -> ArrayD<f32> {
    let file = File::open(path).unwrap();
    let group = file.group(tree).unwrap();
    group.dataset(dataset).unwrap().read_dyn::<f32>().unwrap()
}
