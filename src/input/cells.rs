/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Per-cell matrix headers and the stacks of overlap and Fock matrices

use super::errors::{InputError, Result};
use super::markers::CELL_LABEL;
use super::tokens::parse_token;
use ndarray::Array2;
use num_complex::Complex64;

/// Header of a per-cell matrix, `<LABEL> - CELL N.   2( -1  0  0)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellHeader {
    /// 1-based serial index of the cell
    pub index: usize,
    /// Integer coefficients of the cell on the lattice vectors
    pub coefficients: [i32; 3],
}

impl CellHeader {
    /// Parse a matrix header line.
    ///
    /// Returns `Ok(None)` when the line carries no `CELL N.` label, i.e. it
    /// mentions the matrix without opening a dump.
    pub fn parse(line: &str, line_number: usize) -> Result<Option<Self>> {
        let Some(pos) = line.find(CELL_LABEL) else {
            return Ok(None);
        };
        let rest = line[pos + CELL_LABEL.len()..].replace(|c: char| c == '(' || c == ')', " ");
        let mut tokens = rest.split_whitespace();

        let index: usize = parse_token(tokens.next(), "cell index", line_number, line)?;
        let mut coefficients = [0i32; 3];
        for coefficient in coefficients.iter_mut() {
            *coefficient = parse_token(tokens.next(), "cell coefficient", line_number, line)?;
        }
        Ok(Some(Self {
            index,
            coefficients,
        }))
    }
}

/// Stack a Fock matrix is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FockChannel {
    Restricted,
    Alpha,
    Beta,
}

/// Matrices of the retained cells, aligned by position.
///
/// Entry `i` of the overlap stack and of each Fock stack refers to the cell
/// whose displacement is entry `i` of `displacements`.
#[derive(Debug, Clone, Default)]
pub struct CellMatrixStore {
    ncells: usize,
    displacements: Vec<[f64; 3]>,
    coefficients: Vec<[i32; 3]>,
    overlap: Vec<Array2<Complex64>>,
    fock: Vec<Array2<Complex64>>,
    alpha: Vec<Array2<Complex64>>,
    beta: Vec<Array2<Complex64>>,
}

impl CellMatrixStore {
    /// Store keeping cells with index `<= ncells`
    pub fn new(ncells: usize) -> Self {
        Self {
            ncells,
            ..Self::default()
        }
    }

    /// Whether a cell with this serial index is kept
    pub fn retains(&self, index: usize) -> bool {
        index <= self.ncells
    }

    /// Append an overlap matrix with the displacement of its cell
    pub fn push_overlap(
        &mut self,
        header: &CellHeader,
        displacement: [f64; 3],
        matrix: Array2<Complex64>,
    ) {
        self.displacements.push(displacement);
        self.coefficients.push(header.coefficients);
        self.overlap.push(matrix);
    }

    /// Append a Fock matrix to the stack of its channel
    pub fn push_fock(&mut self, channel: FockChannel, matrix: Array2<Complex64>) {
        match channel {
            FockChannel::Restricted => self.fock.push(matrix),
            FockChannel::Alpha => self.alpha.push(matrix),
            FockChannel::Beta => self.beta.push(matrix),
        }
    }

    pub fn len(&self) -> usize {
        self.displacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displacements.is_empty()
    }

    pub fn displacements(&self) -> &[[f64; 3]] {
        &self.displacements
    }

    pub fn coefficients(&self) -> &[[i32; 3]] {
        &self.coefficients
    }

    pub fn overlap(&self) -> &[Array2<Complex64>] {
        &self.overlap
    }

    pub fn fock(&self, channel: FockChannel) -> &[Array2<Complex64>] {
        match channel {
            FockChannel::Restricted => &self.fock,
            FockChannel::Alpha => &self.alpha,
            FockChannel::Beta => &self.beta,
        }
    }

    /// Check that a Fock stack has one matrix per retained cell
    pub fn check_aligned(&self, channel: FockChannel) -> Result<()> {
        let found = self.fock(channel).len();
        if found != self.overlap.len() {
            return Err(InputError::InconsistentData(format!(
                "{} overlap matrices but {} {:?} Fock matrices",
                self.overlap.len(),
                found,
                channel
            )));
        }
        Ok(())
    }

    /// Take the stacks out of the store
    pub fn into_stacks(self) -> CellStacks {
        CellStacks {
            displacements: self.displacements,
            coefficients: self.coefficients,
            overlap: self.overlap,
            fock: self.fock,
            alpha: self.alpha,
            beta: self.beta,
        }
    }
}

/// Owned stacks of a finished store
#[derive(Debug, Clone, Default)]
pub struct CellStacks {
    pub displacements: Vec<[f64; 3]>,
    pub coefficients: Vec<[i32; 3]>,
    pub overlap: Vec<Array2<Complex64>>,
    pub fock: Vec<Array2<Complex64>>,
    pub alpha: Vec<Array2<Complex64>>,
    pub beta: Vec<Array2<Complex64>>,
}
