// Copyright @yucwang 2023

use crate::core::mesh::FaceType;
use crate::io::off_utils::load_off_from_file;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector3f };

use indicatif::{ProgressBar, ProgressStyle};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ShapeFilterError {
    Io(std::io::Error),
}

impl From<std::io::Error> for ShapeFilterError {
    fn from(err: std::io::Error) -> Self {
        ShapeFilterError::Io(err)
    }
}

impl fmt::Display for ShapeFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeFilterError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for ShapeFilterError {}

/// One row of the per-file statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    pub file_name: String,
    pub class_name: String,
    pub vertex_count: usize,
    pub face_count: usize,
    pub face_type: FaceType,
    pub edge_count: usize,
    pub bounding_box: AABB,
}

impl ShapeRecord {
    pub fn bounding_box_size(&self) -> Vector3f {
        self.bounding_box.diagnal()
    }
}

/// Aggregate row over a batch of records.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDistributions {
    pub average_vertex_count: usize,
    pub average_face_count: usize,
    pub face_types_present: Vec<FaceType>,
    pub average_edge_count: usize,
    pub average_bounding_box_size: Vector3f,
    pub vertex_count_range: (usize, usize),
    pub face_count_range: (usize, usize),
    pub edge_count_range: (usize, usize),
    /// Smallest and largest box size, compared by vector length.
    pub bounding_box_size_range: (Vector3f, Vector3f),
}

impl ShapeDistributions {
    pub fn from_records(records: &[ShapeRecord]) -> Option<Self> {
        let first = records.first()?;
        let first_size = first.bounding_box_size();

        let mut sum_vertex = 0usize;
        let mut sum_face = 0usize;
        let mut sum_edge = 0usize;
        let mut sum_size = Vector3f::zeros();
        let mut face_types_present: Vec<FaceType> = Vec::new();
        let mut vertex_range = (first.vertex_count, first.vertex_count);
        let mut face_range = (first.face_count, first.face_count);
        let mut edge_range = (first.edge_count, first.edge_count);
        let mut size_range = (first_size, first_size);

        for record in records {
            sum_vertex += record.vertex_count;
            sum_face += record.face_count;
            sum_edge += record.edge_count;

            let size = record.bounding_box_size();
            sum_size += size;

            if !face_types_present.contains(&record.face_type) {
                face_types_present.push(record.face_type);
            }

            vertex_range = (vertex_range.0.min(record.vertex_count), vertex_range.1.max(record.vertex_count));
            face_range = (face_range.0.min(record.face_count), face_range.1.max(record.face_count));
            edge_range = (edge_range.0.min(record.edge_count), edge_range.1.max(record.edge_count));

            if size.norm() < size_range.0.norm() {
                size_range.0 = size;
            }
            if size.norm() > size_range.1.norm() {
                size_range.1 = size;
            }
        }

        let n = records.len();
        Some(Self {
            average_vertex_count: sum_vertex / n,
            average_face_count: sum_face / n,
            face_types_present,
            average_edge_count: sum_edge / n,
            average_bounding_box_size: sum_size / (n as Float),
            vertex_count_range: vertex_range,
            face_count_range: face_range,
            edge_count_range: edge_range,
            bounding_box_size_range: size_range,
        })
    }
}

fn is_off_file(path: &Path) -> bool {
    path.is_file()
        && path.file_name()
               .and_then(|n| n.to_str())
               .map_or(false, |n| n.contains(".off"))
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn class_label(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Loads every `.off` file directly inside `dir`, in file-name order.
///
/// Files that fail to load are skipped with a warning; only an unreadable
/// directory is an error.
pub fn collect_shape_records<P: AsRef<Path>>(dir: P) -> Result<Vec<ShapeRecord>, ShapeFilterError> {
    let dir = dir.as_ref();
    log::info!("Collecting shape statistics from: {}.", dir.display());

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_off_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} shapes")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut records = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_off_from_file(path) {
            Ok((_, stats)) => records.push(ShapeRecord {
                file_name: file_label(path),
                class_name: class_label(path),
                vertex_count: stats.vertex_count,
                face_count: stats.face_count,
                face_type: stats.face_type,
                edge_count: stats.edge_count,
                bounding_box: stats.bounding_box,
            }),
            Err(err) => log::warn!("Skipping {}: {}.", path.display(), err),
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    log::info!("Collected {} of {} shapes.", records.len(), paths.len());
    Ok(records)
}
