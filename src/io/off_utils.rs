// Copyright @yucwang 2023

use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::Lines;

use crate::core::mesh::{ FaceType, IndexedMesh, MeshStatistics };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, UInt, Vector3f };

// Upper bound on what a header count may preallocate before any data is seen.
const MAX_PREALLOC: usize = 1 << 16;

/// Failure of a single OFF load. Line numbers are 1-based; `content` is the
/// raw offending line, or empty when the line was missing.
#[derive(Debug)]
pub enum OffLoadError {
    Io(std::io::Error),
    MalformedHeader { line: usize, content: String },
    MalformedVertex { line: usize, content: String },
    MalformedFace { line: usize, content: String },
}

impl OffLoadError {
    pub fn line(&self) -> Option<usize> {
        match self {
            OffLoadError::Io(_) => None,
            OffLoadError::MalformedHeader { line, .. }
            | OffLoadError::MalformedVertex { line, .. }
            | OffLoadError::MalformedFace { line, .. } => Some(*line),
        }
    }
}

impl From<std::io::Error> for OffLoadError {
    fn from(err: std::io::Error) -> Self {
        OffLoadError::Io(err)
    }
}

impl fmt::Display for OffLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffLoadError::Io(err) => write!(f, "io error: {}", err),
            OffLoadError::MalformedHeader { line, content } => {
                write!(f, "malformed header at line {}: {:?}", line, content)
            }
            OffLoadError::MalformedVertex { line, content } => {
                write!(f, "malformed vertex at line {}: {:?}", line, content)
            }
            OffLoadError::MalformedFace { line, content } => {
                write!(f, "malformed face at line {}: {:?}", line, content)
            }
        }
    }
}

impl std::error::Error for OffLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OffLoadError::Io(err) => Some(err),
            _ => None,
        }
    }
}

struct LineCursor<'a> {
    lines: Lines<'a>,
    line_no: usize,
}

impl<'a> LineCursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { lines: input.lines(), line_no: 0 }
    }

    // Always advances the line number, so a missing line is reported at the
    // position where it was expected.
    fn next_line(&mut self) -> (usize, Option<&'a str>) {
        self.line_no += 1;
        (self.line_no, self.lines.next())
    }
}

pub fn load_off_from_str<S: AsRef<str>>(input: S) -> Result<(IndexedMesh, MeshStatistics), OffLoadError> {
    parse_off(input.as_ref())
}

pub fn load_off_from_file<P: AsRef<Path>>(path: P) -> Result<(IndexedMesh, MeshStatistics), OffLoadError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    let (mesh, stats) = parse_off(&data)?;
    log::debug!("Loaded OFF mesh {}: {} vertices, {} faces, {}.",
                path.display(), stats.vertex_count, stats.face_count, stats.face_type);
    Ok((mesh, stats))
}

fn parse_off(input: &str) -> Result<(IndexedMesh, MeshStatistics), OffLoadError> {
    let mut cursor = LineCursor::new(input);

    // Magic token, not validated.
    let (line, magic) = cursor.next_line();
    if magic.is_none() {
        return Err(OffLoadError::MalformedHeader { line, content: String::new() });
    }

    let (line, counts) = cursor.next_line();
    let counts = counts.ok_or_else(|| OffLoadError::MalformedHeader { line, content: String::new() })?;
    let header_err = || OffLoadError::MalformedHeader { line, content: counts.to_string() };
    let mut tokens = counts.split_whitespace();
    let mut next_count = || -> Result<usize, OffLoadError> {
        tokens.next()
              .and_then(|t| t.parse::<usize>().ok())
              .ok_or_else(header_err)
    };
    let vertex_count = next_count()?;
    let face_count = next_count()?;
    let edge_count = next_count()?;

    let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOC));
    for _ in 0..vertex_count {
        let (line, content) = cursor.next_line();
        let vertex_err = || OffLoadError::MalformedVertex {
            line,
            content: content.unwrap_or("").to_string(),
        };
        let content = content.ok_or_else(vertex_err)?;
        let mut tokens = content.split_whitespace();
        let mut p = Vector3f::zeros();
        for idx in 0..3 {
            p[idx] = tokens.next()
                           .and_then(parse_float)
                           .ok_or_else(vertex_err)?;
        }
        vertices.push(p);
    }

    let mut face_indices = Vec::with_capacity(face_count.min(MAX_PREALLOC) * 3);
    let mut has_triangles = false;
    let mut has_quads = false;
    for _ in 0..face_count {
        let (line, content) = cursor.next_line();
        let face_err = || OffLoadError::MalformedFace {
            line,
            content: content.unwrap_or("").to_string(),
        };
        let content = content.ok_or_else(face_err)?;
        let mut tokens = content.split_whitespace();
        let n = tokens.next()
                      .and_then(|t| t.parse::<usize>().ok())
                      .ok_or_else(face_err)?;
        // Only the first triangle of a polygon is kept.
        for _ in 0..3 {
            let index = tokens.next()
                              .and_then(|t| t.parse::<UInt>().ok())
                              .filter(|&i| (i as usize) < vertex_count)
                              .ok_or_else(face_err)?;
            face_indices.push(index);
        }

        match n {
            3 => has_triangles = true,
            4 => has_quads = true,
            _ => {}
        }
    }

    let stats = MeshStatistics {
        vertex_count,
        face_count,
        edge_count,
        face_type: FaceType::classify(has_triangles, has_quads),
        bounding_box: AABB::from_points(&vertices),
    };

    Ok((IndexedMesh::new(vertices, face_indices), stats))
}

fn parse_float(token: &str) -> Option<Float> {
    token.parse::<Float>().ok().filter(|v| v.is_finite())
}

/// Emits `mesh` in the same OFF subset the loader reads, one `3 a b c` line
/// per triangle.
pub fn write_off(mesh: &IndexedMesh, edge_count: usize) -> String {
    let mut out = String::with_capacity(16 + mesh.vertices().len() * 24 + mesh.face_indices().len() * 8);
    out.push_str("OFF\n");
    // Writing into a String never fails.
    let _ = writeln!(out, "{} {} {}", mesh.vertices().len(), mesh.triangle_count(), edge_count);
    for v in mesh.vertices() {
        let _ = writeln!(out, "{} {} {}", v.x, v.y, v.z);
    }
    for [a, b, c] in mesh.triangles() {
        let _ = writeln!(out, "3 {} {} {}", a, b, c);
    }
    out
}

pub fn save_off<P: AsRef<Path>>(mesh: &IndexedMesh, edge_count: usize, path: P) -> Result<(), std::io::Error> {
    let path = path.as_ref();
    log::info!("Writing OFF mesh to: {}.", path.display());
    fs::write(path, write_off(mesh, edge_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
OFF
4 2 0
0 0 0
1 0 0
1 1 0
0 1 0
3 0 1 2
3 0 2 3
";

    #[test]
    fn test_load_off_from_str_basic() {
        let (mesh, stats) = load_off_from_str(SQUARE).expect("failed to parse off");

        assert_eq!(mesh.vertices(), &[Vector3f::new(0.0, 0.0, 0.0),
                                      Vector3f::new(1.0, 0.0, 0.0),
                                      Vector3f::new(1.0, 1.0, 0.0),
                                      Vector3f::new(0.0, 1.0, 0.0)][..]);
        assert_eq!(mesh.face_indices(), &[0, 1, 2, 0, 2, 3][..]);
        assert_eq!(stats.vertex_count, 4);
        assert_eq!(stats.face_count, 2);
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.face_type, FaceType::Triangles);
        assert_eq!(stats.bounding_box.p_min, Vector3f::new(0.0, 0.0, 0.0));
        assert_eq!(stats.bounding_box.p_max, Vector3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_header_missing_edge_count() {
        let input = "OFF\n4 2\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n3 0 1 2\n3 0 2 3\n";
        match load_off_from_str(input) {
            Err(OffLoadError::MalformedHeader { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "4 2");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_header_errors() {
        let empty = load_off_from_str("").unwrap_err();
        assert!(matches!(empty, OffLoadError::MalformedHeader { line: 1, .. }));

        let only_magic = load_off_from_str("OFF\n").unwrap_err();
        assert!(matches!(only_magic, OffLoadError::MalformedHeader { line: 2, .. }));

        let negative = load_off_from_str("OFF\n-1 0 0\n").unwrap_err();
        assert!(matches!(negative, OffLoadError::MalformedHeader { line: 2, .. }));

        let fractional = load_off_from_str("OFF\n1.5 0 0\n").unwrap_err();
        assert!(matches!(fractional, OffLoadError::MalformedHeader { line: 2, .. }));
    }

    #[test]
    fn test_vertex_non_numeric() {
        let input = "OFF\n2 0 0\n0 0 0\na 0 0\n";
        match load_off_from_str(input) {
            Err(OffLoadError::MalformedVertex { line, content }) => {
                assert_eq!(line, 4);
                assert_eq!(content, "a 0 0");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_vertex_short_and_truncated() {
        let short = load_off_from_str("OFF\n1 0 0\n0 0\n").unwrap_err();
        assert!(matches!(short, OffLoadError::MalformedVertex { line: 3, .. }));

        let truncated = load_off_from_str("OFF\n3 0 0\n0 0 0\n1 1 1\n").unwrap_err();
        match truncated {
            OffLoadError::MalformedVertex { line, content } => {
                assert_eq!(line, 5);
                assert!(content.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let comma = load_off_from_str("OFF\n1 0 0\n0,5 0 0\n").unwrap_err();
        assert!(matches!(comma, OffLoadError::MalformedVertex { line: 3, .. }));

        let nan = load_off_from_str("OFF\n1 0 0\nNaN 0 0\n").unwrap_err();
        assert!(matches!(nan, OffLoadError::MalformedVertex { line: 3, .. }));
    }

    #[test]
    fn test_face_errors() {
        let short = load_off_from_str("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1\n").unwrap_err();
        assert!(matches!(short, OffLoadError::MalformedFace { line: 6, .. }));

        let bad_token = load_off_from_str("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 x 2\n").unwrap_err();
        assert!(matches!(bad_token, OffLoadError::MalformedFace { line: 6, .. }));

        let missing = load_off_from_str("OFF\n3 2 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap_err();
        assert!(matches!(missing, OffLoadError::MalformedFace { line: 7, .. }));

        let out_of_range = load_off_from_str("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 3\n").unwrap_err();
        match out_of_range {
            OffLoadError::MalformedFace { line, content } => {
                assert_eq!(line, 6);
                assert_eq!(content, "3 0 1 3");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_face_type_classification() {
        let quads = "OFF\n4 1 4\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n";
        let (mesh, stats) = load_off_from_str(quads).unwrap();
        assert_eq!(stats.face_type, FaceType::Quads);
        assert_eq!(mesh.face_indices(), &[0, 1, 2][..]);

        let mixed = "OFF\n4 2 5\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n3 0 1 2\n4 0 1 2 3\n";
        let (_, stats) = load_off_from_str(mixed).unwrap();
        assert_eq!(stats.face_type, FaceType::Mixed);

        let pentagon = "OFF\n5 1 5\n0 0 0\n1 0 0\n2 1 0\n1 2 0\n0 1 0\n5 0 1 2 3 4\n";
        let (mesh, stats) = load_off_from_str(pentagon).unwrap();
        assert_eq!(stats.face_type, FaceType::Unknown);
        assert_eq!(mesh.face_indices(), &[0, 1, 2][..]);

        let (_, stats) = load_off_from_str("OFF\n1 0 0\n0 0 0\n").unwrap();
        assert_eq!(stats.face_type, FaceType::Unknown);
    }

    #[test]
    fn test_empty_mesh_bounding_box() {
        let (mesh, stats) = load_off_from_str("OFF\n0 0 0\n").unwrap();
        assert!(mesh.vertices().is_empty());
        assert!(mesh.face_indices().is_empty());
        assert_eq!(stats.bounding_box.p_min, Vector3f::zeros());
        assert_eq!(stats.bounding_box.p_max, Vector3f::zeros());
    }

    #[test]
    fn test_whitespace_and_trailing_content() {
        let input = "OFF\r\n3  1\t0\r\n-1.5 2 0.25\r\n 1e1 -2 3 \r\n0 0 0\r\n3\t2 1 0\r\n# trailing\ngarbage here\n";
        let (mesh, stats) = load_off_from_str(input).unwrap();

        assert_eq!(mesh.vertices()[0], Vector3f::new(-1.5, 2.0, 0.25));
        assert_eq!(mesh.vertices()[1], Vector3f::new(10.0, -2.0, 3.0));
        assert_eq!(mesh.face_indices(), &[2, 1, 0][..]);
        assert_eq!(stats.bounding_box.p_min, Vector3f::new(-1.5, -2.0, 0.0));
        assert_eq!(stats.bounding_box.p_max, Vector3f::new(10.0, 2.0, 3.0));
        for v in mesh.vertices() {
            assert!(stats.bounding_box.contains(v));
        }
    }

    #[test]
    fn test_write_off_reloads_identically() {
        let input = "OFF\n5 3 0\n0.1 -0.2 0.3\n1 0 0\n1 1 0\n0 1 0\n0.5 0.5 1e-7\n3 0 1 2\n4 0 2 3 4\n5 1 2 3 4 0\n";
        let (mesh, stats) = load_off_from_str(input).unwrap();

        let emitted = write_off(&mesh, stats.edge_count);
        let (reloaded, reloaded_stats) = load_off_from_str(&emitted).unwrap();

        assert_eq!(reloaded.vertices(), mesh.vertices());
        assert_eq!(reloaded.face_indices(), mesh.face_indices());
        assert_eq!(reloaded_stats.face_count, 3);
        assert_eq!(reloaded_stats.face_type, FaceType::Triangles);
    }

    #[test]
    fn test_load_off_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.off");
        fs::write(&path, SQUARE).unwrap();

        let (mesh, stats) = load_off_from_file(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(stats.face_type, FaceType::Triangles);

        let copy = dir.path().join("copy.off");
        save_off(&mesh, stats.edge_count, &copy).unwrap();
        let (reloaded, _) = load_off_from_file(&copy).unwrap();
        assert_eq!(reloaded, mesh);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_off_from_file(dir.path().join("nope.off")).unwrap_err();
        assert!(matches!(err, OffLoadError::Io(_)));
        assert_eq!(err.line(), None);
    }
}
