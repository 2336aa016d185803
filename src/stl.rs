//! STL (stereolithography) parsing.
//!
//! Both flavours are accepted:
//!
//! - **Binary**: 80-byte header, little-endian `u32` triangle count, then 50
//!   bytes per triangle (normal, three vertices, attribute word).
//! - **ASCII**: `solid ... facet normal ... outer loop / vertex x y z / endloop
//!   endfacet ... endsolid`.
//!
//! Stored facet normals are ignored; winding is taken from the vertex order.

use thiserror::Error;

use crate::math::Vec3;

const HEADER_LEN: usize = 80;
const TRIANGLE_LEN: usize = 50;

/// Errors produced while loading model files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("binary STL is {0} bytes, shorter than its 84-byte header")]
    TooShort(usize),
    #[error("binary STL declares {declared} triangles but holds only {available}")]
    Truncated { declared: usize, available: usize },
    #[error("ASCII STL line {line}: {message}")]
    Ascii { line: usize, message: String },
    #[error("STL contains no triangles")]
    Empty,
}

/// Parses STL bytes into triangles, detecting the flavour from the content.
pub fn parse(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, LoadError> {
    let triangles = if is_ascii(bytes) {
        parse_ascii(bytes)?
    } else {
        parse_binary(bytes)?
    };
    if triangles.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(triangles)
}

/// Binary files may also start with "solid" in their header, so an exact size
/// match for the binary layout wins over the keyword.
fn is_ascii(bytes: &[u8]) -> bool {
    if !bytes.starts_with(b"solid") {
        return false;
    }
    if let Some(count) = binary_triangle_count(bytes) {
        if HEADER_LEN + 4 + count * TRIANGLE_LEN == bytes.len() {
            return false;
        }
    }
    let probe = &bytes[..bytes.len().min(1024)];
    probe.windows(5).any(|w| w == b"facet") || probe.windows(8).any(|w| w == b"endsolid")
}

fn binary_triangle_count(bytes: &[u8]) -> Option<usize> {
    let count = bytes.get(HEADER_LEN..HEADER_LEN + 4)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize)
}

fn parse_binary(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, LoadError> {
    let declared = binary_triangle_count(bytes).ok_or(LoadError::TooShort(bytes.len()))?;
    let body = &bytes[HEADER_LEN + 4..];
    let available = body.len() / TRIANGLE_LEN;
    if available < declared {
        return Err(LoadError::Truncated {
            declared,
            available,
        });
    }

    let read_vec3 = |chunk: &[u8]| {
        let f = |i: usize| {
            f32::from_le_bytes([chunk[i], chunk[i + 1], chunk[i + 2], chunk[i + 3]])
        };
        Vec3::new(f(0), f(4), f(8))
    };

    Ok(body
        .chunks_exact(TRIANGLE_LEN)
        .take(declared)
        .map(|record| {
            // Bytes 0..12 hold the facet normal, 48..50 the attribute word.
            [
                read_vec3(&record[12..24]),
                read_vec3(&record[24..36]),
                read_vec3(&record[36..48]),
            ]
        })
        .collect())
}

fn parse_ascii(bytes: &[u8]) -> Result<Vec<[Vec3; 3]>, LoadError> {
    let text = String::from_utf8_lossy(bytes);
    let mut triangles = Vec::new();
    let mut corners: Vec<Vec3> = Vec::with_capacity(3);

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("vertex") => {
                let mut coords = [0.0f32; 3];
                for coord in &mut coords {
                    let token = tokens.next().ok_or_else(|| LoadError::Ascii {
                        line: line_number,
                        message: "vertex needs three coordinates".into(),
                    })?;
                    *coord = token.parse().map_err(|_| LoadError::Ascii {
                        line: line_number,
                        message: format!("invalid coordinate `{token}`"),
                    })?;
                }
                if corners.len() == 3 {
                    return Err(LoadError::Ascii {
                        line: line_number,
                        message: "facet has more than three vertices".into(),
                    });
                }
                corners.push(Vec3::from(coords));
            }
            Some("endloop") => {
                if corners.len() != 3 {
                    return Err(LoadError::Ascii {
                        line: line_number,
                        message: format!("facet has {} vertices", corners.len()),
                    });
                }
                triangles.push([corners[0], corners[1], corners[2]]);
                corners.clear();
            }
            _ => {}
        }
    }

    Ok(triangles)
}
