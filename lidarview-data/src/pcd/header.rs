//! PCD header parsing.

use crate::error::DecodeError;

/// Parsed ASCII header of a scan file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcdHeader {
    /// Header lines up to and including the `DATA` line, without terminators.
    pub lines: Vec<String>,
    /// Number of point records in the payload.
    pub point_count: usize,
    /// Byte offset at which the binary payload starts.
    pub data_offset: usize,
    /// Value of the `VERSION` line, if present.
    pub version: Option<String>,
    /// Field names from the `FIELDS` line, if present.
    pub fields: Vec<String>,
    /// Storage kind named on the `DATA` line (`binary`, `ascii`, ...).
    pub data_kind: String,
}

impl PcdHeader {
    /// Parse the header at the start of `bytes`.
    ///
    /// The header ends at the first line beginning with `DATA`. Exactly one
    /// `POINTS <count>` line must appear before it.
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut lines = Vec::new();
        let mut cursor = 0;
        let mut data_line = None;

        while cursor < bytes.len() {
            let end = bytes[cursor..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|i| cursor + i);
            let line_end = end.unwrap_or(bytes.len());
            let line = String::from_utf8_lossy(&bytes[cursor..line_end])
                .trim_end_matches('\r')
                .to_string();
            let next = end.map_or(bytes.len(), |i| i + 1);

            let is_data = line.starts_with("DATA");
            lines.push(line);
            cursor = next;
            if is_data {
                data_line = Some(lines.len() - 1);
                break;
            }
        }

        let Some(data_line) = data_line else {
            return Err(DecodeError::MalformedHeader(
                "no DATA line terminates the header".into(),
            ));
        };

        let point_count = parse_point_count(&lines)?;
        let version = keyword_value(&lines, "VERSION").map(|v| v.join(" "));
        let fields = keyword_value(&lines, "FIELDS")
            .map(|v| v.into_iter().map(str::to_string).collect())
            .unwrap_or_default();
        let data_kind = lines[data_line]
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            lines,
            point_count,
            data_offset: cursor,
            version,
            fields,
            data_kind,
        })
    }

    /// Whether the `DATA` line announces a binary payload.
    pub fn is_binary(&self) -> bool {
        self.data_kind == "binary"
    }
}

fn keyword_value<'a>(lines: &'a [String], keyword: &str) -> Option<Vec<&'a str>> {
    lines.iter().find_map(|line| {
        let mut tokens = line.split_whitespace();
        (tokens.next() == Some(keyword)).then(|| tokens.collect())
    })
}

fn parse_point_count(lines: &[String]) -> Result<usize, DecodeError> {
    let mut points_lines = lines
        .iter()
        .filter(|line| line.split_whitespace().next() == Some("POINTS"));

    let Some(line) = points_lines.next() else {
        return Err(DecodeError::MalformedHeader("missing POINTS line".into()));
    };
    if points_lines.next().is_some() {
        return Err(DecodeError::MalformedHeader(
            "more than one POINTS line".into(),
        ));
    }

    let tokens: Vec<&str> = line.split_whitespace().skip(1).collect();
    match tokens.as_slice() {
        [count] => count.parse::<usize>().map_err(|_| {
            DecodeError::MalformedHeader(format!("invalid POINTS value: {count}"))
        }),
        _ => Err(DecodeError::MalformedHeader(format!(
            "POINTS must be followed by a single integer, got: {line}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "# .PCD v0.7 - Point Cloud Data file format\n\
VERSION 0.7\n\
FIELDS x y z intensity t reflectivity ring ambient\n\
SIZE 4 4 4 4 4 4 4 4\n\
TYPE F F F F F F F F\n\
COUNT 1 1 1 1 1 1 1 1\n\
WIDTH 2\n\
HEIGHT 1\n\
VIEWPOINT 0 0 0 1 0 0 0\n\
POINTS 2\n\
DATA binary\n";

    #[test]
    fn test_parse_full_header() {
        let header = PcdHeader::parse(HEADER.as_bytes()).unwrap();
        assert_eq!(header.point_count, 2);
        assert_eq!(header.data_offset, HEADER.len());
        assert_eq!(header.version.as_deref(), Some("0.7"));
        assert_eq!(header.fields.len(), 8);
        assert_eq!(header.fields[3], "intensity");
        assert!(header.is_binary());
        assert_eq!(header.lines.len(), 11);
    }

    #[test]
    fn test_offset_matches_joined_lines_plus_newline() {
        let mut bytes = HEADER.as_bytes().to_vec();
        bytes.extend_from_slice(&[0xAB; 64]);
        let header = PcdHeader::parse(&bytes).unwrap();
        assert_eq!(header.data_offset, header.lines.join("\n").len() + 1);
    }

    #[test]
    fn test_binary_payload_after_data_is_not_scanned() {
        let mut bytes = b"POINTS 1\nDATA binary\n".to_vec();
        // Payload containing a newline and text that looks like a header key.
        bytes.extend_from_slice(b"POINTS 9\n");
        let header = PcdHeader::parse(&bytes).unwrap();
        assert_eq!(header.point_count, 1);
        assert_eq!(header.data_offset, 21);
    }

    #[test]
    fn test_missing_points_is_malformed() {
        let err = PcdHeader::parse(b"VERSION 0.7\nDATA binary\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn test_missing_data_is_malformed() {
        let err = PcdHeader::parse(b"VERSION 0.7\nPOINTS 3\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn test_duplicate_points_is_malformed() {
        let err = PcdHeader::parse(b"POINTS 1\nPOINTS 2\nDATA binary\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn test_non_numeric_points_is_malformed() {
        let err = PcdHeader::parse(b"POINTS many\nDATA binary\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));

        let err = PcdHeader::parse(b"POINTS 1 2\nDATA binary\n").unwrap_err();
        assert!(matches!(err, DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn test_data_line_without_newline() {
        let header = PcdHeader::parse(b"POINTS 0\nDATA binary").unwrap();
        assert_eq!(header.point_count, 0);
        assert_eq!(header.data_offset, 20);
    }

    #[test]
    fn test_crlf_header() {
        let bytes = b"POINTS 4\r\nDATA binary\r\n";
        let header = PcdHeader::parse(bytes).unwrap();
        assert_eq!(header.point_count, 4);
        assert_eq!(header.data_offset, bytes.len());
        assert!(header.is_binary());
    }
}
