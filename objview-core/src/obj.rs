/// Line-oriented parser and writer for the `v`/`f` subset of Wavefront OBJ
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1, one_of, space0},
    combinator::{all_consuming, opt, recognize, rest},
    number::complete::float,
    sequence::{pair, preceded, terminated},
    IResult,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::geometry::{Face, Mesh};
use nalgebra::Point3;

/// What to do with a face record that cannot be drawn safely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacePolicy {
    /// Fail the whole load with `MalformedGeometry`
    #[default]
    Reject,
    /// Drop the face, log a warning and count it in the report
    Skip,
}

/// Options controlling how a geometry file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub face_policy: FacePolicy,
    /// Fewest indices a face may have; below two there is no edge to draw
    pub min_face_indices: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            face_policy: FacePolicy::Reject,
            min_face_indices: 2,
        }
    }
}

impl LoadOptions {
    /// Options that drop malformed faces instead of failing
    pub fn permissive() -> Self {
        Self::default().with_face_policy(FacePolicy::Skip)
    }

    pub fn with_face_policy(mut self, policy: FacePolicy) -> Self {
        self.face_policy = policy;
        self
    }

    pub fn with_min_face_indices(mut self, min: usize) -> Self {
        self.min_face_indices = min.max(1);
        self
    }
}

/// Diagnostics collected while reading a geometry file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub vertex_count: usize,
    pub face_count: usize,
    /// Vertex components that were missing or not a finite number
    pub skipped_tokens: usize,
    /// Faces dropped under [`FacePolicy::Skip`]
    pub skipped_faces: usize,
    /// Non-blank lines that are neither `v` nor `f` records
    pub ignored_lines: usize,
    /// Normalization found no extent and fell back to unit scale
    pub degenerate: bool,
}

/// One classified input line
#[derive(Debug, PartialEq)]
enum Record<'a> {
    Blank,
    Vertex([Option<f32>; 3]),
    Face(Vec<FaceIndex>),
    Other(&'a str),
}

/// A face token before range checking
#[derive(Debug, Clone, PartialEq)]
enum FaceIndex {
    Value(i64),
    /// Well-formed integer that does not fit in an `i64`
    Overflow(String),
    Invalid,
}

/// A face waiting for the vertex count to be known
struct PendingFace {
    line: usize,
    indices: Vec<FaceIndex>,
}

fn keyword(input: &str) -> IResult<&str, &str> {
    preceded(space0, take_till1(|c: char| c.is_whitespace()))(input)
}

fn component(input: &str) -> IResult<&str, f32> {
    all_consuming(float)(input)
}

/// Leading signed integer of `i`, `i/t`, `i//n` or `i/t/n`
fn face_index(input: &str) -> IResult<&str, &str> {
    all_consuming(terminated(
        recognize(pair(opt(one_of("+-")), digit1)),
        opt(pair(char('/'), rest)),
    ))(input)
}

fn parse_component(token: &str) -> Option<f32> {
    component(token)
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}

fn parse_face_index(token: &str) -> FaceIndex {
    match face_index(token) {
        Ok((_, digits)) => match digits.parse::<i64>() {
            Ok(value) => FaceIndex::Value(value),
            Err(_) => FaceIndex::Overflow(digits.to_string()),
        },
        Err(_) => FaceIndex::Invalid,
    }
}

fn parse_record(line: &str) -> Record<'_> {
    let Ok((tail, key)) = keyword(line) else {
        return Record::Blank;
    };

    match key {
        // A bare `v` carries no coordinates and must not shift later indices
        "v" if tail.trim().is_empty() => Record::Other(key),
        "v" => {
            let mut tokens = tail.split_whitespace();
            let mut xyz = [None; 3];
            for slot in &mut xyz {
                *slot = tokens.next().and_then(parse_component);
            }
            Record::Vertex(xyz)
        }
        // The marker is consumed here so it never reaches the index list
        "f" => Record::Face(tail.split_whitespace().map(parse_face_index).collect()),
        other => Record::Other(other),
    }
}

/// Check a face against the final vertex count
fn resolve_face(face: &PendingFace, vertex_count: usize, options: &LoadOptions) -> Result<Face, String> {
    if face.indices.len() < options.min_face_indices {
        return Err(format!(
            "face has {} indices, need at least {}",
            face.indices.len(),
            options.min_face_indices
        ));
    }

    face.indices
        .iter()
        .enumerate()
        .map(|(position, index)| match index {
            FaceIndex::Invalid => Err(format!("face index #{} is not an integer", position + 1)),
            FaceIndex::Value(i) if *i >= 1 && (*i as u64) <= vertex_count as u64 => Ok(*i as usize),
            FaceIndex::Value(i) => Err(format!(
                "face index {} out of range 1..={}",
                i, vertex_count
            )),
            FaceIndex::Overflow(digits) => Err(format!(
                "face index {} out of range 1..={}",
                digits, vertex_count
            )),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Face::new)
}

/// Read geometry from any buffered source
pub fn read_obj<R: BufRead>(reader: R, options: &LoadOptions) -> LoadResult<(Mesh, LoadReport)> {
    let mut mesh = Mesh::new();
    let mut report = LoadReport::default();
    let mut pending = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;

        match parse_record(&line) {
            Record::Blank => {}
            Record::Vertex(xyz) => {
                let missing = xyz.iter().filter(|c| c.is_none()).count();
                if missing > 0 {
                    debug!("Line {}: {} vertex component(s) defaulted to zero", number, missing);
                    report.skipped_tokens += missing;
                }
                let [x, y, z] = xyz.map(|c| c.unwrap_or(0.0));
                mesh.add_vertex(Point3::new(x, y, z));
            }
            Record::Face(indices) => pending.push(PendingFace {
                line: number,
                indices,
            }),
            Record::Other(key) => {
                debug!("Line {}: ignoring `{}` record", number, key);
                report.ignored_lines += 1;
            }
        }
    }

    let vertex_count = mesh.vertex_count();
    mesh.faces.reserve(pending.len());
    for face in &pending {
        match resolve_face(face, vertex_count, options) {
            Ok(resolved) => mesh.add_face(resolved),
            Err(reason) => match options.face_policy {
                FacePolicy::Reject => return Err(LoadError::malformed(face.line, reason)),
                FacePolicy::Skip => {
                    warn!("Skipping face at line {}: {}", face.line, reason);
                    report.skipped_faces += 1;
                }
            },
        }
    }

    if report.skipped_tokens > 0 {
        warn!(
            "{} vertex component(s) were missing or unreadable and set to zero",
            report.skipped_tokens
        );
    }

    report.vertex_count = mesh.vertex_count();
    report.face_count = mesh.face_count();
    debug!(
        "Parsed {} vertices and {} faces",
        report.vertex_count, report.face_count
    );

    Ok((mesh, report))
}

/// Parse geometry held in memory
pub fn parse_obj(input: &str, options: &LoadOptions) -> LoadResult<(Mesh, LoadReport)> {
    read_obj(input.as_bytes(), options)
}

/// Open and parse a geometry file
pub fn load_obj<P: AsRef<Path>>(path: P, options: &LoadOptions) -> LoadResult<(Mesh, LoadReport)> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io(e),
    })?;

    read_obj(BufReader::new(file), options)
}

/// Write vertices and faces back out as `v` and `f` records
pub fn write_obj<W: Write>(mesh: &Mesh, mut writer: W) -> io::Result<()> {
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for face in &mesh.faces {
        write!(writer, "f")?;
        for index in face.indices() {
            write!(writer, " {}", index)?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE: &str = "\
# unit cube
v -1 -1 -1
v -1 -1 1
v -1 1 -1
v -1 1 1
v 1 -1 -1
v 1 -1 1
v 1 1 -1
v 1 1 1

f 1 2 4 3
f 5 7 8 6
f 1 5 6 2
f 3 4 8 7
f 1 3 7 5
f 2 6 8 4
";

    #[test]
    fn test_parse_cube() {
        let (mesh, report) = parse_obj(CUBE, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(mesh.faces[0].indices(), &[1, 2, 4, 3]);
        assert_eq!(report.ignored_lines, 1);
        assert_eq!(report.skipped_tokens, 0);
    }

    #[test]
    fn test_face_marker_is_not_an_index() {
        let (mesh, _) = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.faces[0].indices(), &[1, 2, 3]);
    }

    #[test]
    fn test_bad_vertex_tokens_are_zero_filled() {
        let (mesh, report) = parse_obj("v 1.5 abc 2\nv 3\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertices[0], Point3::new(1.5, 0.0, 2.0));
        assert_eq!(mesh.vertices[1], Point3::new(3.0, 0.0, 0.0));
        assert_eq!(report.skipped_tokens, 3);
    }

    #[test]
    fn test_non_finite_vertex_tokens_are_zero_filled() {
        let (mesh, report) = parse_obj("v nan inf 1\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertices[0], Point3::new(0.0, 0.0, 1.0));
        assert_eq!(report.skipped_tokens, 2);
    }

    #[test]
    fn test_extra_vertex_tokens_are_ignored() {
        let (mesh, report) = parse_obj("v 1 2 3 1.0\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertices[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(report.skipped_tokens, 0);
    }

    #[test]
    fn test_other_records_are_ignored() {
        let input = "o thing\nvn 0 0 1\nvt 0.5 0.5\nv 1 2 3\ng group\nusemtl steel\nfoo 1 2\n";
        let (mesh, report) = parse_obj(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 0);
        assert_eq!(report.ignored_lines, 6);
    }

    #[test]
    fn test_bare_vertex_keyword_is_ignored() {
        let input = "v\nv   \nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let (mesh, report) = parse_obj(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices[0], Point3::origin());
        assert_eq!(mesh.vertices[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(report.skipped_tokens, 0);
        assert_eq!(report.ignored_lines, 2);
    }

    #[test]
    fn test_indented_records_are_read() {
        let input = "  v 1 2 3\n\tv 4 5 6\n  f 1 2\n";
        let (mesh, report) = parse_obj(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.vertices[0], Point3::new(1.0, 2.0, 3.0));
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(report.ignored_lines, 0);
    }

    #[test]
    fn test_slash_face_tokens_use_vertex_index() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1/1/1 2//2 3/3\n";
        let (mesh, _) = parse_obj(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.faces[0].indices(), &[1, 2, 3]);
    }

    #[test]
    fn test_faces_may_precede_vertices() {
        let (mesh, _) = parse_obj("f 1 2\nv 0 0 0\nv 1 1 1\n", &LoadOptions::default()).unwrap();
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_out_of_range_face_is_rejected() {
        let input = format!("{}f 1 2 99\n", CUBE);
        let err = parse_obj(&input, &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MalformedGeometry { line, reason } => {
                assert_eq!(line, 17);
                assert!(reason.contains("99"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_and_negative_indices_are_rejected() {
        let opts = LoadOptions::default();
        assert!(parse_obj("v 0 0 0\nv 1 1 1\nf 0 1\n", &opts).is_err());
        assert!(parse_obj("v 0 0 0\nv 1 1 1\nf -1 1\n", &opts).is_err());
    }

    #[test]
    fn test_short_face_is_rejected() {
        let err = parse_obj("v 0 0 0\nf 1\n", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedGeometry { line: 2, .. }));

        let err = parse_obj("v 0 0 0\nf\n", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedGeometry { line: 2, .. }));
    }

    #[test]
    fn test_non_integer_face_token_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 1 1\nf 1 x\n", &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MalformedGeometry { reason, .. } => {
                assert!(reason.contains("not an integer"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_face_index_is_out_of_range() {
        let input = "v 0 0 0\nv 1 1 1\nf 1 99999999999999999999\n";
        let err = parse_obj(input, &LoadOptions::default()).unwrap_err();
        match err {
            LoadError::MalformedGeometry { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("99999999999999999999 out of range 1..=2"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let input = "v 0 0 0\nv 1 1 1\nf 1 -99999999999999999999/2\n";
        let err = parse_obj(input, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_skip_policy_drops_bad_faces() {
        let input = format!("{}f 1 2 99\nf 3\n", CUBE);
        let (mesh, report) = parse_obj(&input, &LoadOptions::permissive()).unwrap();
        assert_eq!(mesh.face_count(), 6);
        assert_eq!(report.skipped_faces, 2);
        assert_eq!(report.face_count, 6);
    }

    #[test]
    fn test_min_face_indices_option() {
        let opts = LoadOptions::default().with_min_face_indices(3);
        assert!(parse_obj("v 0 0 0\nv 1 1 1\nf 1 2\n", &opts).is_err());
    }

    #[test]
    fn test_blank_and_crlf_lines() {
        let input = "\r\n   \nv 1 2 3\r\nv 4 5 6\r\nf 1 2\r\n";
        let (mesh, report) = parse_obj(input, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.vertices[1], Point3::new(4.0, 5.0, 6.0));
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(report.ignored_lines, 0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_obj("/definitely/not/here.obj", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_write_then_parse() {
        let cube = Mesh::cube(2.0);
        let mut out = Vec::new();
        write_obj(&cube, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("v -1 -1 -1\n"));

        let (mesh, _) = parse_obj(&text, &LoadOptions::default()).unwrap();
        assert_eq!(mesh, cube);
    }
}
