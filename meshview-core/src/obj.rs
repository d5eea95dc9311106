/// Wavefront OBJ parser for vertex positions and polygon faces
use std::fs::File;
use std::io::Read;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::many1,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::geometry::{Face, MeshData};

/// Read the whole file at `path`, then parse it with [`parse_str`].
///
/// Any failure to open the path, including a directory, is
/// [`ParseError::FileNotFound`]. Bytes that are not UTF-8 are decoded lossily,
/// so exporter comments in legacy encodings do not reject the file.
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<MeshData> {
    let path = path.as_ref();
    let not_found = || ParseError::FileNotFound {
        path: path.to_path_buf(),
    };

    let mut file = File::open(path).map_err(|_| not_found())?;
    // Opening a directory succeeds on Unix; only the read would fail
    if file.metadata().map_err(|_| not_found())?.is_dir() {
        return Err(not_found());
    }

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);

    let mesh = parse_str(&text)?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "parsed model file"
    );
    Ok(mesh)
}

/// A face record whose positive references are checked once every vertex is known
struct PendingFace {
    line: usize,
    /// 1-based references, relative ones already resolved
    references: Vec<i64>,
}

/// Parse OBJ text into a mesh.
///
/// Only `v` and `f` records are read; every other record kind is skipped.
/// Nothing is returned unless the whole text is valid.
pub fn parse_str(text: &str) -> ParseResult<MeshData> {
    let mut vertices = Vec::new();
    let mut pending = Vec::new();

    for (number, raw) in text.lines().enumerate() {
        let line = number + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let Ok((fields, kind)) = keyword(content) else {
            continue;
        };

        match kind {
            "v" => vertices.push(parse_vertex(fields, line)?),
            "f" => {
                let references = parse_face(fields, line)?
                    .into_iter()
                    .map(|reference| resolve_relative(reference, vertices.len(), line))
                    .collect::<ParseResult<Vec<_>>>()?;
                pending.push(PendingFace { line, references });
            }
            _ => {}
        }
    }

    if vertices.is_empty() {
        return Err(ParseError::EmptyModel);
    }

    let vertex_count = vertices.len();
    let faces = pending
        .into_iter()
        .map(|face| {
            face.references
                .into_iter()
                .map(|reference| {
                    if reference as usize > vertex_count {
                        Err(ParseError::DanglingFaceIndex {
                            line: face.line,
                            index: reference,
                            vertex_count,
                        })
                    } else {
                        Ok(reference as usize - 1)
                    }
                })
                .collect::<ParseResult<Vec<_>>>()
                .map(Face::new)
        })
        .collect::<ParseResult<Vec<_>>>()?;

    Ok(MeshData::from_parts_unchecked(vertices, faces))
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn coordinates(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(terminated(many1(preceded(space1, float)), space0))(input)
}

fn parse_vertex(fields: &str, line: usize) -> ParseResult<Point3<f32>> {
    let (_, coords) = coordinates(fields)
        .map_err(|_| ParseError::malformed(line, "v", "expected floating-point coordinates"))?;

    // An optional fourth value is the homogeneous weight, which positions ignore
    if !(3..=4).contains(&coords.len()) {
        return Err(ParseError::malformed(
            line,
            "v",
            format!("expected 3 coordinates, found {}", coords.len()),
        ));
    }
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(ParseError::malformed(line, "v", "coordinate is not finite"));
    }

    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

/// A vertex reference: `i`, `i/t`, `i//n` or `i/t/n`. Only `i` is kept.
fn vertex_reference(input: &str) -> IResult<&str, i64> {
    terminated(
        integer,
        opt(preceded(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

fn references(input: &str) -> IResult<&str, Vec<i64>> {
    all_consuming(terminated(many1(preceded(space1, vertex_reference)), space0))(input)
}

fn parse_face(fields: &str, line: usize) -> ParseResult<Vec<i64>> {
    let (_, references) = references(fields)
        .map_err(|_| ParseError::malformed(line, "f", "expected integer vertex references"))?;

    if references.len() < 3 {
        return Err(ParseError::malformed(
            line,
            "f",
            format!("expected at least 3 vertices, found {}", references.len()),
        ));
    }

    Ok(references)
}

/// Turn a negative reference into the 1-based index it points at. Negative
/// references count back from the vertices defined so far.
fn resolve_relative(reference: i64, defined: usize, line: usize) -> ParseResult<i64> {
    let dangling = || ParseError::DanglingFaceIndex {
        line,
        index: reference,
        vertex_count: defined,
    };

    match reference {
        0 => Err(dangling()),
        r if r > 0 => Ok(r),
        r => {
            let resolved = defined as i64 + r + 1;
            if resolved < 1 {
                Err(dangling())
            } else {
                Ok(resolved)
            }
        }
    }
}
