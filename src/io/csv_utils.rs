// Copyright @yucwang 2023

use crate::core::shape_filter::{ ShapeDistributions, ShapeRecord };
use crate::math::constants::Vector3f;

use std::fs;
use std::path::Path;

pub const SHAPE_RECORDS_HEADER: &str =
    "File Name,Class,Vertex Count,Face Count,Face Type,Edge Count,Bounding Box Size";

pub const DISTRIBUTIONS_HEADER: &str =
    "Average Vertex Count,Average Face Count,Face Types Present,Average Edge Count,\
Average Bounding Box Size,Vertex Count Range,Face Count Range,Edge Count Range,Bounding Box Size Range";

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn format_vec3(v: &Vector3f) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}

fn format_range<T: std::fmt::Display>(min: T, max: T) -> String {
    format!("{} - {}", min, max)
}

fn join_row(fields: &[String]) -> String {
    fields.iter()
          .map(|f| escape_field(f))
          .collect::<Vec<_>>()
          .join(",")
}

pub fn shape_records_to_csv(records: &[ShapeRecord]) -> String {
    let mut csv = String::new();
    csv.push_str(SHAPE_RECORDS_HEADER);
    csv.push('\n');

    for record in records {
        let row = [
            record.file_name.clone(),
            record.class_name.clone(),
            record.vertex_count.to_string(),
            record.face_count.to_string(),
            record.face_type.to_string(),
            record.edge_count.to_string(),
            format_vec3(&record.bounding_box_size()),
        ];
        csv.push_str(&join_row(&row));
        csv.push('\n');
    }

    csv
}

pub fn distributions_to_csv(dist: &ShapeDistributions) -> String {
    let face_types = dist.face_types_present
                         .iter()
                         .map(|t| t.as_str())
                         .collect::<Vec<_>>()
                         .join(" ");
    let row = [
        dist.average_vertex_count.to_string(),
        dist.average_face_count.to_string(),
        face_types,
        dist.average_edge_count.to_string(),
        format_vec3(&dist.average_bounding_box_size),
        format_range(dist.vertex_count_range.0, dist.vertex_count_range.1),
        format_range(dist.face_count_range.0, dist.face_count_range.1),
        format_range(dist.edge_count_range.0, dist.edge_count_range.1),
        format_range(format_vec3(&dist.bounding_box_size_range.0),
                     format_vec3(&dist.bounding_box_size_range.1)),
    ];

    let mut csv = String::new();
    csv.push_str(DISTRIBUTIONS_HEADER);
    csv.push('\n');
    csv.push_str(&join_row(&row));
    csv.push('\n');
    csv
}

pub fn write_shape_records_csv<P: AsRef<Path>>(records: &[ShapeRecord], path: P) -> Result<(), std::io::Error> {
    log::info!("Writing {} shape records to: {}.", records.len(), path.as_ref().display());
    fs::write(path, shape_records_to_csv(records))
}

pub fn write_distributions_csv<P: AsRef<Path>>(dist: &ShapeDistributions, path: P) -> Result<(), std::io::Error> {
    log::info!("Writing shape distributions to: {}.", path.as_ref().display());
    fs::write(path, distributions_to_csv(dist))
}
