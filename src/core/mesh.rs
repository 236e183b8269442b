// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::constants::{ UInt, Vector3f };

use std::fmt;
use std::vec::Vec;

/// Vertex positions plus a flat triangle index buffer.
///
/// Every index in `face_indices` is smaller than `vertices.len()`, and the
/// buffer length is always a multiple of three.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    vertices: Vec<Vector3f>,
    face_indices: Vec<UInt>,
}

impl IndexedMesh {
    pub(crate) fn new(vertices: Vec<Vector3f>, face_indices: Vec<UInt>) -> Self {
        debug_assert!(face_indices.len() % 3 == 0);
        debug_assert!(face_indices.iter().all(|&i| (i as usize) < vertices.len()));
        Self { vertices, face_indices }
    }

    pub fn vertices(&self) -> &[Vector3f] {
        &self.vertices
    }

    pub fn face_indices(&self) -> &[UInt] {
        &self.face_indices
    }

    pub fn triangle_count(&self) -> usize {
        self.face_indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [UInt; 3]> + '_ {
        self.face_indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn bounding_box(&self) -> AABB {
        AABB::from_points(&self.vertices)
    }

    pub fn into_buffers(self) -> (Vec<Vector3f>, Vec<UInt>) {
        (self.vertices, self.face_indices)
    }
}

/// Which polygon sizes the faces of a file declared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FaceType {
    Triangles,
    Quads,
    Mixed,
    /// No face declared 3 or 4 vertices (this includes files without faces).
    Unknown,
}

impl FaceType {
    pub fn classify(has_triangles: bool, has_quads: bool) -> Self {
        match (has_triangles, has_quads) {
            (true, true) => FaceType::Mixed,
            (true, false) => FaceType::Triangles,
            (false, true) => FaceType::Quads,
            (false, false) => FaceType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FaceType::Triangles => "Triangles",
            FaceType::Quads => "Quads",
            FaceType::Mixed => "Triangles/Quads",
            FaceType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive numbers for one loaded file. The counts are the ones declared
/// in the header, not recomputed from the topology.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshStatistics {
    pub vertex_count: usize,
    pub face_count: usize,
    pub edge_count: usize,
    pub face_type: FaceType,
    pub bounding_box: AABB,
}
