//! Line-oriented TSV reader shared by the events, mentions, and GKG
//! parsers. Adapted from the teacher's `GkgReader`, generalized to any
//! dataset's raw lines rather than just GKG's.

use std::io::BufRead;

use crate::error::GdeltError;

/// Iterates non-blank lines of a `BufRead`, pairing each with its 1-based
/// line number. Blank lines are skipped rather than yielded as empty
/// records, matching the teacher's reader.
pub struct TsvLineReader<R: BufRead> {
    inner: R,
    line_number: usize,
}

impl<R: BufRead> TsvLineReader<R> {
    pub fn new(inner: R) -> Self {
        TsvLineReader {
            inner,
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for TsvLineReader<R> {
    type Item = Result<(usize, String), GdeltError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut buf = String::new();
            match self.inner.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let trimmed = buf.trim_end_matches(['\n', '\r']);
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(Ok((self.line_number, trimmed.to_string())));
                }
                Err(e) => return Some(Err(GdeltError::Io(e))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    #[test]
    fn skips_blank_lines_and_numbers_remaining() {
        let data = "line one\n\nline two\n\n\nline three\n";
        let reader = TsvLineReader::new(BufReader::new(Cursor::new(data)));
        let lines: Vec<_> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(
            lines,
            vec![
                (1, "line one".to_string()),
                (3, "line two".to_string()),
                (6, "line three".to_string()),
            ]
        );
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let reader = TsvLineReader::new(BufReader::new(Cursor::new("")));
        assert_eq!(reader.count(), 0);
    }

    #[test]
    fn strips_trailing_carriage_return() {
        let data = "a\tb\tc\r\n";
        let mut reader = TsvLineReader::new(BufReader::new(Cursor::new(data)));
        let (_, line) = reader.next().unwrap().unwrap();
        assert_eq!(line, "a\tb\tc");
    }
}
