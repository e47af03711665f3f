/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Forward line reader with a single-level mark/rewind

use super::errors::{InputError, Result};
use std::collections::VecDeque;
use std::io::BufRead;

/// Line source over a buffered reader.
///
/// Lines are handed out without their trailing newline. `mark` starts
/// recording the lines read afterwards, and `rewind` puts them back so the
/// next `next_line` returns the first of them again. Only the most recent mark
/// can be rewound to.
#[derive(Debug)]
pub struct LineCursor<R> {
    reader: R,
    replay: VecDeque<(usize, String)>,
    since_mark: Option<Vec<(usize, String)>>,
    line_number: usize,
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            replay: VecDeque::new(),
            since_mark: None,
            line_number: 0,
        }
    }

    /// 1-based number of the last line handed out (0 before the first read)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line, `None` at end of stream
    pub fn next_line(&mut self) -> Result<Option<String>> {
        let entry = match self.replay.pop_front() {
            Some(entry) => entry,
            None => {
                let mut buffer = String::new();
                if self.reader.read_line(&mut buffer)? == 0 {
                    return Ok(None);
                }
                while buffer.ends_with('\n') || buffer.ends_with('\r') {
                    buffer.pop();
                }
                (self.line_number + 1, buffer)
            }
        };

        self.line_number = entry.0;
        if let Some(recorded) = self.since_mark.as_mut() {
            recorded.push(entry.clone());
        }
        Ok(Some(entry.1))
    }

    /// Read the next line, failing with a truncation error at end of stream
    pub fn expect_line(&mut self, context: &str) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| InputError::truncated(context, self.line_number))
    }

    /// Remember the current position, replacing any earlier mark
    pub fn mark(&mut self) {
        self.since_mark = Some(Vec::new());
    }

    /// Return to the last mark, so the lines read since are read again
    pub fn rewind(&mut self) -> Result<()> {
        let recorded = self.since_mark.take().ok_or_else(|| {
            InputError::InconsistentData("rewind requested without a mark".to_string())
        })?;

        if let Some((first, _)) = recorded.first() {
            self.line_number = first - 1;
        }
        for entry in recorded.into_iter().rev() {
            self.replay.push_front(entry);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor(text: &str) -> LineCursor<Cursor<Vec<u8>>> {
        LineCursor::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_reads_lines_and_counts() {
        let mut lines = cursor("first\r\nsecond\n\nfourth");
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("first"));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("fourth"));
        assert_eq!(lines.line_number(), 4);
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn test_rewind_replays_one_line() {
        let mut lines = cursor("a\nb\nc\n");
        lines.next_line().unwrap();
        lines.mark();
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("b"));
        lines.rewind().unwrap();
        assert_eq!(lines.line_number(), 1);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("b"));
        assert_eq!(lines.line_number(), 2);
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn test_mark_is_single_level() {
        let mut lines = cursor("a\nb\nc\nd\n");
        lines.mark();
        lines.next_line().unwrap();
        lines.mark();
        lines.next_line().unwrap();
        lines.rewind().unwrap();
        assert_eq!(lines.next_line().unwrap().as_deref(), Some("b"));
        assert!(lines.rewind().is_err());
    }

    #[test]
    fn test_expect_line_reports_truncation() {
        let mut lines = cursor("only\n");
        lines.expect_line("header").unwrap();
        match lines.expect_line("matrix") {
            Err(InputError::TruncatedInput { context, line }) => {
                assert_eq!(context, "matrix");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
