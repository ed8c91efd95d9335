//! Dotted attribute paths
//!
//! A path is a list of segments separated by dots. A segment written as
//! `[i]` indexes into an array, any other segment is a key in an object:
//! `some_list.[0].data`.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse(path: &str) -> Result<Vec<Segment<'_>>> {
    path.split('.')
        .map(|segment| {
            if segment.is_empty() {
                return Err(Error::InvalidPath {
                    path: path.to_string(),
                });
            }
            match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                Some(index) => index
                    .parse()
                    .map(Segment::Index)
                    .map_err(|_| Error::InvalidPath {
                        path: path.to_string(),
                    }),
                None => Ok(Segment::Key(segment)),
            }
        })
        .collect()
}

/// Resolve `path` against an attribute map
pub(super) fn resolve<'a>(attributes: &'a JsonObject, path: &str) -> Result<&'a JsonValue> {
    let segments = parse(path)?;
    let (first, rest) = match segments.split_first() {
        Some((Segment::Key(key), rest)) => (*key, rest),
        Some((Segment::Index(_), _)) | None => {
            return Err(Error::TypeMismatch {
                segment: path.split('.').next().unwrap_or_default().to_string(),
                expected: "an array",
            })
        }
    };

    let mut current = attributes
        .get(first)
        .ok_or_else(|| Error::attribute_not_found(path))?;

    for segment in rest {
        current = match (segment, current) {
            (Segment::Key(key), JsonValue::Object(map)) => map.get(*key),
            (Segment::Index(i), JsonValue::Array(items)) => items.get(*i),
            (Segment::Key(key), _) => {
                return Err(Error::TypeMismatch {
                    segment: (*key).to_string(),
                    expected: "an object",
                })
            }
            (Segment::Index(i), _) => {
                return Err(Error::TypeMismatch {
                    segment: format!("[{i}]"),
                    expected: "an array",
                })
            }
        }
        .ok_or_else(|| Error::attribute_not_found(path))?;
    }

    Ok(current)
}
