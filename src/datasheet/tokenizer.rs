//! Line tokenizer for datasheet bytes
//!
//! Splits a buffer into lines of raw tokens. Lines end with `\n`, optionally
//! preceded by `\r`. Fields are separated by `^`, and writers terminate every
//! field with one, so a single trailing separator does not open a new field.
//! Empty fields come out as `None`.

use super::errors::{DatasheetError, DatasheetResult};

/// First byte of a stream whose first line is a header
pub const HEADER_MARKER: u8 = b'#';

/// Field separator
pub const FIELD_SEPARATOR: u8 = b'^';

/// Tokens of one line, borrowed from the source buffer
pub type RawLine<'a> = Vec<Option<&'a str>>;

/// Single-pass iterator over the lines of a datasheet buffer
#[derive(Debug)]
pub struct LineTokenizer<'a> {
    data: &'a [u8],
    position: usize,
    line_number: usize,
}

impl<'a> LineTokenizer<'a> {
    /// Tokenizes a buffer whose first line, if any, has already been checked
    /// by the caller.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            line_number: 0,
        }
    }

    /// Tokenizes a buffer that must open with the header marker.
    ///
    /// The marker is consumed; the first line the iterator yields is the
    /// header.
    pub fn with_header(data: &'a [u8]) -> DatasheetResult<Self> {
        match data.first() {
            Some(&HEADER_MARKER) => Ok(Self {
                data,
                position: 1,
                line_number: 0,
            }),
            _ => Err(DatasheetError::missing_header()),
        }
    }

    /// 1-based number of the line most recently yielded
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn next_line(&mut self) -> Option<&'a [u8]> {
        while self.position < self.data.len() {
            let rest = &self.data[self.position..];
            let (line, consumed) = match rest.iter().position(|b| *b == b'\n') {
                Some(end) => (&rest[..end], end + 1),
                None => (rest, rest.len()),
            };
            self.position += consumed;
            self.line_number += 1;

            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }

    fn split(&self, line: &'a [u8]) -> DatasheetResult<RawLine<'a>> {
        let line = line.strip_suffix(&[FIELD_SEPARATOR]).unwrap_or(line);
        let text = std::str::from_utf8(line)
            .map_err(|e| DatasheetError::invalid_encoding(self.line_number, e.to_string()))?;

        Ok(text
            .split(FIELD_SEPARATOR as char)
            .map(|field| if field.is_empty() { None } else { Some(field) })
            .collect())
    }
}

impl<'a> Iterator for LineTokenizer<'a> {
    type Item = DatasheetResult<RawLine<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.next_line()?;
        Some(self.split(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasheet::errors::DatasheetErrorCode;

    fn lines(data: &[u8]) -> Vec<RawLine<'_>> {
        LineTokenizer::with_header(data)
            .unwrap()
            .collect::<DatasheetResult<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let data = b"#ID^NAME^\r\n1^one^\r\n2^two^\r\n";
        let parsed = lines(data);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0], vec![Some("ID"), Some("NAME")]);
        assert_eq!(parsed[2], vec![Some("2"), Some("two")]);
    }

    #[test]
    fn test_bare_lf_and_no_trailing_newline() {
        let data = b"#A^B\n1^2\n3^4";
        let parsed = lines(data);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2], vec![Some("3"), Some("4")]);
    }

    #[test]
    fn test_empty_field_is_none() {
        let data = b"#A^B^C^\n1^^3^\n^^^\n";
        let parsed = lines(data);
        assert_eq!(parsed[1], vec![Some("1"), None, Some("3")]);
        assert_eq!(parsed[2], vec![None, None, None]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let data = b"#A^\r\n\r\n1^\r\n\n";
        let parsed = lines(data);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_missing_header_marker() {
        let err = LineTokenizer::with_header(b"A^B\n1^2\n").unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusMissingHeader);

        let err = LineTokenizer::with_header(b"").unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusMissingHeader);
    }

    #[test]
    fn test_invalid_utf8_reports_line() {
        let data = b"#A^\n\xff\xfe^\n";
        let mut tokenizer = LineTokenizer::with_header(data).unwrap();
        assert!(tokenizer.next().unwrap().is_ok());
        let err = tokenizer.next().unwrap().unwrap_err();
        assert_eq!(err.code(), DatasheetErrorCode::CensusInvalidEncoding);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_utf8_text_survives() {
        let data = "#NAME^\nKönig^\n".as_bytes();
        let parsed = lines(data);
        assert_eq!(parsed[1], vec![Some("König")]);
    }
}
