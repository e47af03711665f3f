/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Tight-binding description of a periodic system
//!
//! [`SystemInfo`] gathers everything needed to build Bloch Hamiltonians from a
//! CRYSTAL calculation: the lattice, the atoms of the cell, the orbital layout
//! and one Hamiltonian/overlap pair per retained lattice cell.

pub mod assembly;

pub use assembly::assemble;

use crate::input::basis::BasisSet;
use crate::input::errors::{InputError, Result};
use ndarray::{Array2, Array3};
use num_complex::Complex64;
use serde::Serialize;
use std::fmt;

/// Spin treatment of the calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpinMode {
    /// Closed shell, one Fock matrix per cell
    Restricted,
    /// Open shell with separate alpha and beta Fock matrices
    Unrestricted,
    /// Two-component calculation with spin-orbit coupling
    SpinOrbit,
}

impl fmt::Display for SpinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinMode::Restricted => write!(f, "restricted"),
            SpinMode::Unrestricted => write!(f, "unrestricted"),
            SpinMode::SpinOrbit => write!(f, "spin-orbit"),
        }
    }
}

/// Assembled system.
///
/// For spin-polarized runs every orbital count, the filling and the matrices
/// are over spin-orbitals. Entry `i` along the first axis of `hamiltonian`,
/// `overlap` and `displacements` refers to the same lattice cell.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Number of periodic directions
    pub dimension: usize,
    /// Lattice vectors as rows, `dimension x 3`
    pub lattice: Array2<f64>,
    /// Rows `(x, y, z, species)`, one per atom of the cell
    pub motif: Array2<f64>,
    /// Species labels indexed by species code
    pub species: Vec<String>,
    /// Orbitals of one atom of each species
    pub orbitals: Vec<usize>,
    /// Number of occupied bands
    pub filling: f64,
    /// Electrons per cell as printed in the header
    pub electrons: usize,
    pub core_electrons: Option<usize>,
    pub nshells: Option<usize>,
    pub spin_mode: SpinMode,
    pub basis: BasisSet,
    /// Integer coordinates of each cell on the lattice vectors
    pub cell_coefficients: Vec<[i32; 3]>,
    /// Cartesian displacement of each cell, `ncells x 3`
    pub displacements: Array2<f64>,
    /// Hamiltonian per cell; empty for spin-orbit runs and for reports
    /// without Fock matrices
    pub hamiltonian: Array3<Complex64>,
    /// Overlap per cell
    pub overlap: Array3<Complex64>,
}

impl SystemInfo {
    /// Number of retained lattice cells
    pub fn ncells(&self) -> usize {
        self.displacements.nrows()
    }

    pub fn natoms(&self) -> usize {
        self.motif.nrows()
    }

    /// Side of the per-cell matrices
    pub fn matrix_dimension(&self) -> usize {
        self.overlap.shape()[1]
    }

    /// Orbitals of the whole cell, summed over the motif
    pub fn orbitals_per_cell(&self) -> usize {
        self.motif
            .column(3)
            .iter()
            .filter_map(|&code| self.orbitals.get(code as usize))
            .sum()
    }

    /// Shell type labels of each species
    pub fn shell_types(&self) -> Vec<Vec<&str>> {
        (0..self.species.len())
            .map(|code| self.basis.shell_types(code))
            .collect()
    }

    /// Check the shapes of the stacks against each other
    pub fn validate(&self) -> Result<()> {
        let ncells = self.ncells();
        if self.overlap.shape()[0] != ncells {
            return Err(InputError::InconsistentData(format!(
                "{} displacements but {} overlap matrices",
                ncells,
                self.overlap.shape()[0]
            )));
        }
        let nhamiltonian = self.hamiltonian.shape()[0];
        if nhamiltonian != 0 && nhamiltonian != ncells {
            return Err(InputError::InconsistentData(format!(
                "{} displacements but {} Hamiltonian matrices",
                ncells, nhamiltonian
            )));
        }
        if self.lattice.nrows() != self.dimension {
            return Err(InputError::InconsistentData(format!(
                "dimension {} with {} lattice vectors",
                self.dimension,
                self.lattice.nrows()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dimension: {}", self.dimension)?;
        for row in self.lattice.rows() {
            writeln!(f, "  a = ({:10.5} {:10.5} {:10.5})", row[0], row[1], row[2])?;
        }
        writeln!(f, "Atoms: {}", self.natoms())?;
        for row in self.motif.rows() {
            let label = self
                .species
                .get(row[3] as usize)
                .map(String::as_str)
                .unwrap_or("?");
            writeln!(
                f,
                "  {:<4} ({:10.5} {:10.5} {:10.5})",
                label, row[0], row[1], row[2]
            )?;
        }
        writeln!(f, "Species:")?;
        for (code, label) in self.species.iter().enumerate() {
            writeln!(
                f,
                "  {:<4} {} orbitals, shells [{}]",
                label,
                self.orbitals.get(code).copied().unwrap_or(0),
                self.basis.shell_types(code).join(" ")
            )?;
        }
        writeln!(f, "Spin: {}", self.spin_mode)?;
        writeln!(f, "Electrons: {}, filling {}", self.electrons, self.filling)?;
        write!(
            f,
            "Cells: {}, matrix dimension {}",
            self.ncells(),
            self.matrix_dimension()
        )
    }
}
