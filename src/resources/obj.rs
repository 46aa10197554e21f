//! Parser for the triangulated mesh text format (`v`, `vt`, `vn`, `f`).
//!
//! Every face corner expands into its own [`Vertex`]; there is no index
//! buffer and no de-duplication. Two behaviours exist for compatibility with
//! the shipped assets and are kept on purpose:
//!
//! - `vt u v` is stored as `(v, u)`;
//! - `,` is read as a decimal point (`0,5` == `0.5`).
//!
//! Numbers are plain decimals (`-?digits[.digits]`). Value counts are strict
//! per directive: `v` takes 3 values plus an optional `w`, `vt` 2 plus an
//! optional `w`, `vn` exactly 3, `f` exactly 3 corners. Anything else fails
//! with the line number.

use std::str::FromStr;

use crate::data_structures::vertex::Vertex;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ObjError {
    #[error("line {line}: malformed number `{token}`")]
    Number { line: usize, token: String },
    #[error("line {line}: `{directive}` expects {expected} values, found {found}")]
    Arity {
        line: usize,
        directive: &'static str,
        expected: &'static str,
        found: usize,
    },
    #[error("line {line}: malformed face reference `{token}`, expected `v/vt/vn`")]
    FaceReference { line: usize, token: String },
    #[error("line {line}: {attribute} index {index} is out of range (1..={available})")]
    IndexOutOfRange {
        line: usize,
        attribute: &'static str,
        index: usize,
        available: usize,
    },
}

/// One `position/texcoord/normal` corner, still 1-based.
#[derive(Debug, Clone, Copy)]
struct Corner {
    line: usize,
    position: usize,
    tex_coords: usize,
    normal: usize,
}

#[derive(Debug, Default)]
struct Collected {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    corners: Vec<Corner>,
}

/// Parses mesh text into fully expanded vertices, three per face.
pub fn parse_obj(source: &str) -> Result<Vec<Vertex>, ObjError> {
    let collected = collect(source)?;
    collected
        .corners
        .iter()
        .map(|corner| {
            Ok(Vertex::new(
                *lookup(&collected.positions, corner.position, corner.line, "position")?,
                *lookup(&collected.normals, corner.normal, corner.line, "normal")?,
                *lookup(&collected.tex_coords, corner.tex_coords, corner.line, "texcoord")?,
            ))
        })
        .collect()
}

fn collect(source: &str) -> Result<Collected, ObjError> {
    let mut collected = Collected::default();
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let normalized = raw.replace(',', ".");
        let mut tokens = normalized.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };
        let values: Vec<&str> = tokens.collect();
        match directive {
            "v" => {
                arity(line, "v", "3 or 4", &values, 3..=4)?;
                collected.positions.push([
                    number(line, values[0])?,
                    number(line, values[1])?,
                    number(line, values[2])?,
                ]);
            }
            "vt" => {
                arity(line, "vt", "2 or 3", &values, 2..=3)?;
                // Second coordinate first, matching the shipped assets.
                collected
                    .tex_coords
                    .push([number(line, values[1])?, number(line, values[0])?]);
            }
            "vn" => {
                arity(line, "vn", "3", &values, 3..=3)?;
                collected.normals.push([
                    number(line, values[0])?,
                    number(line, values[1])?,
                    number(line, values[2])?,
                ]);
            }
            "f" => {
                arity(line, "f", "3", &values, 3..=3)?;
                for token in values {
                    collected.corners.push(corner(line, token)?);
                }
            }
            _ => (),
        }
    }
    log::trace!(
        "collected {} positions, {} texcoords, {} normals, {} face corners",
        collected.positions.len(),
        collected.tex_coords.len(),
        collected.normals.len(),
        collected.corners.len()
    );
    Ok(collected)
}

fn arity(
    line: usize,
    directive: &'static str,
    expected: &'static str,
    values: &[&str],
    allowed: std::ops::RangeInclusive<usize>,
) -> Result<(), ObjError> {
    if allowed.contains(&values.len()) {
        Ok(())
    } else {
        Err(ObjError::Arity {
            line,
            directive,
            expected,
            found: values.len(),
        })
    }
}

/// `-?digits[.digits]`. Rejects what `f32::from_str` would also take:
/// `inf`, `NaN`, exponents and a leading `+`.
fn is_plain_decimal(token: &str) -> bool {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    is_digits(whole) && fraction.is_none_or(is_digits)
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

fn number<T: FromStr>(line: usize, token: &str) -> Result<T, ObjError> {
    let malformed = || ObjError::Number {
        line,
        token: token.to_string(),
    };
    if !is_plain_decimal(token) {
        return Err(malformed());
    }
    token.parse().map_err(|_| malformed())
}

fn corner(line: usize, token: &str) -> Result<Corner, ObjError> {
    let malformed = || ObjError::FaceReference {
        line,
        token: token.to_string(),
    };
    let mut parts = token.split('/');
    let (Some(position), Some(tex_coords), Some(normal), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };
    let index = |part: &str| {
        if !is_digits(part) {
            return Err(malformed());
        }
        part.parse::<usize>().map_err(|_| malformed())
    };
    Ok(Corner {
        line,
        position: index(position)?,
        tex_coords: index(tex_coords)?,
        normal: index(normal)?,
    })
}

fn lookup<'a, T>(
    items: &'a [T],
    index: usize,
    line: usize,
    attribute: &'static str,
) -> Result<&'a T, ObjError> {
    index
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .ok_or(ObjError::IndexOutOfRange {
            line,
            attribute,
            index,
            available: items.len(),
        })
}
