/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Reader for the column-blocked matrix dumps of CRYSTAL
//!
//! A dump is a sequence of blocks. Each block starts after a blank line with
//! a line of 1-based column indices, followed by rows of the form
//! `row  c_1  c_2 ...` holding one coefficient per listed column:
//!
//! ```text
//!
//!          1          2          3
//!     1   1.0000E+00 2.0000E-01 0.0000E+00
//!     2   2.0000E-01 1.0000E+00 0.0000E+00
//!     3   0.0000E+00 0.0000E+00 1.0000E+00
//! ```
//!
//! The matrix is complete as soon as its last entry `(N, N)` is written; the
//! lines after it belong to the caller.

use super::cursor::LineCursor;
use super::errors::{InputError, Result};
use super::tokens::{parse_all, parse_token};
use log::warn;
use ndarray::Array2;
use num_complex::Complex64;
use std::io::BufRead;

/// Tracks which entries of an `N x N` matrix have been written
#[derive(Debug, Clone)]
pub struct FillTracker {
    dim: usize,
    written: Vec<bool>,
    filled: usize,
    last_entry_written: bool,
}

impl FillTracker {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            written: vec![false; dim * dim],
            filled: 0,
            last_entry_written: false,
        }
    }

    /// Record a write to the 0-based entry `(row, col)`
    pub fn record(&mut self, row: usize, col: usize) {
        let slot = row * self.dim + col;
        if !self.written[slot] {
            self.written[slot] = true;
            self.filled += 1;
        }
        if row + 1 == self.dim && col + 1 == self.dim {
            self.last_entry_written = true;
        }
    }

    /// The final entry has been written
    pub fn is_done(&self) -> bool {
        self.last_entry_written
    }

    /// Every entry has been written at least once
    pub fn is_complete(&self) -> bool {
        self.filled == self.dim * self.dim
    }

    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn expected(&self) -> usize {
        self.dim * self.dim
    }
}

/// Reads one `N x N` matrix from a column-blocked dump
#[derive(Debug, Clone, Copy)]
pub struct BlockMatrixReader {
    dim: usize,
    require_complete: bool,
}

impl BlockMatrixReader {
    pub fn new(dim: usize, require_complete: bool) -> Self {
        Self {
            dim,
            require_complete,
        }
    }

    /// Read the matrix starting at the line after its header.
    ///
    /// `context` names the matrix in error messages. The coefficients are
    /// real in the dump and stored with a zero imaginary part.
    pub fn read<R: BufRead>(
        &self,
        cursor: &mut LineCursor<R>,
        context: &str,
    ) -> Result<Array2<Complex64>> {
        if self.dim == 0 {
            return Err(InputError::InconsistentData(format!(
                "cannot read matrix '{}' with zero orbitals",
                context
            )));
        }

        let mut matrix = Array2::<Complex64>::zeros((self.dim, self.dim));
        let mut tracker = FillTracker::new(self.dim);
        let mut columns: Vec<usize> = Vec::new();
        let mut after_blank = false;

        while !tracker.is_done() {
            let line = cursor.expect_line(context)?;
            let line_number = cursor.line_number();

            if line.trim().is_empty() {
                after_blank = true;
                continue;
            }

            if after_blank {
                columns = parse_all(&line, "column indices", line_number)?;
                if let Some(&bad) = columns.iter().find(|&&c| c == 0 || c > self.dim) {
                    return Err(InputError::format(
                        line_number,
                        format!("column indices in 1..={}", self.dim),
                        bad.to_string(),
                    ));
                }
                after_blank = false;
                continue;
            }

            if columns.is_empty() {
                return Err(InputError::format(
                    line_number,
                    "a column index line before matrix rows",
                    line.trim(),
                ));
            }
            self.read_row(&line, line_number, &columns, &mut matrix, &mut tracker)?;
        }

        if !tracker.is_complete() {
            if self.require_complete {
                return Err(InputError::IncompleteMatrix {
                    context: context.to_string(),
                    filled: tracker.filled(),
                    expected: tracker.expected(),
                });
            }
            warn!(
                "Matrix '{}' ended with {} of {} entries written; the rest are zero",
                context,
                tracker.filled(),
                tracker.expected()
            );
        }

        Ok(matrix)
    }

    fn read_row(
        &self,
        line: &str,
        line_number: usize,
        columns: &[usize],
        matrix: &mut Array2<Complex64>,
        tracker: &mut FillTracker,
    ) -> Result<()> {
        let mut tokens = line.split_whitespace();
        let row: usize = parse_token(tokens.next(), "row index", line_number, line)?;
        if row == 0 || row > self.dim {
            return Err(InputError::format(
                line_number,
                format!("row index in 1..={}", self.dim),
                row.to_string(),
            ));
        }

        for (position, token) in tokens.enumerate() {
            let col = *columns.get(position).ok_or_else(|| {
                InputError::format(
                    line_number,
                    format!("at most {} coefficients", columns.len()),
                    line.trim(),
                )
            })?;
            let value: f64 = parse_token(Some(token), "matrix coefficient", line_number, line)?;
            matrix[[row - 1, col - 1]] = Complex64::new(value, 0.0);
            tracker.record(row - 1, col - 1);
        }
        Ok(())
    }
}
