/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Direct lattice vectors and the dimension of the system
//!
//! CRYSTAL always prints three lattice vectors. For slabs and polymers the
//! non-periodic directions are filled with very long placeholder vectors,
//! which are dropped here by a norm threshold.

use super::cursor::LineCursor;
use super::errors::{InputError, Result};
use super::tokens::parse_token;
use log::debug;
use ndarray::Array2;
use serde::Serialize;
use std::io::BufRead;

/// Lattice vectors that survived the norm threshold, in file order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lattice {
    vectors: Vec<[f64; 3]>,
}

impl Lattice {
    /// Keep the vectors whose norm does not exceed `threshold`
    pub fn from_candidates(candidates: &[[f64; 3]], threshold: f64) -> Result<Self> {
        let vectors: Vec<[f64; 3]> = candidates
            .iter()
            .copied()
            .filter(|v| norm(v) <= threshold)
            .collect();

        if vectors.is_empty() {
            return Err(InputError::InconsistentData(format!(
                "no lattice vector has a norm below the threshold {}",
                threshold
            )));
        }
        Ok(Self { vectors })
    }

    /// Number of periodic directions
    pub fn dimension(&self) -> usize {
        self.vectors.len()
    }

    pub fn vectors(&self) -> &[[f64; 3]] {
        &self.vectors
    }

    /// Lattice vectors as rows of a `dimension x 3` array
    pub fn to_array(&self) -> Array2<f64> {
        let mut array = Array2::zeros((self.vectors.len(), 3));
        for (i, v) in self.vectors.iter().enumerate() {
            for (j, value) in v.iter().enumerate() {
                array[[i, j]] = *value;
            }
        }
        array
    }

    /// Real-space vector `sum_i n_i a_i` over the periodic directions.
    ///
    /// Coefficients beyond the dimension of the lattice are ignored.
    pub fn displacement(&self, coefficients: &[i32; 3]) -> [f64; 3] {
        let mut cell = [0.0; 3];
        for (v, &n) in self.vectors.iter().zip(coefficients.iter()) {
            for k in 0..3 {
                cell[k] += n as f64 * v[k];
            }
        }
        cell
    }
}

fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Read the three lines following the lattice header
pub fn parse_lattice<R: BufRead>(cursor: &mut LineCursor<R>, threshold: f64) -> Result<Lattice> {
    let mut candidates = [[0.0; 3]; 3];
    for candidate in candidates.iter_mut() {
        let line = cursor.expect_line("lattice vectors")?;
        let line_number = cursor.line_number();
        let mut tokens = line.split_whitespace();
        for component in candidate.iter_mut() {
            *component = parse_token(tokens.next(), "lattice vector component", line_number, &line)?;
        }
    }

    let lattice = Lattice::from_candidates(&candidates, threshold)?;
    debug!(
        "Lattice: {} of 3 vectors kept below threshold {}",
        lattice.dimension(),
        threshold
    );
    Ok(lattice)
}
