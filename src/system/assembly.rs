/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Assembly of the final system record from the parsed sections
//!
//! Spin-unrestricted runs provide separate alpha and beta Fock matrices. They
//! are merged into one matrix over spin-orbitals, with the spin index running
//! fastest: orbital `i` with spin `s` sits at row `2 i + s`.

use super::{SpinMode, SystemInfo};
use crate::input::errors::{InputError, Result};
use crate::input::parser::ParsedOutput;
use crate::input::FockChannel;

use log::{info, warn};
use ndarray::linalg::kron;
use ndarray::{Array2, Array3, Axis};
use num_complex::Complex64;
use rayon::prelude::*;

/// Projector on the spin-up component, `[[1, 0], [0, 0]]`
pub fn spin_up_block() -> Array2<Complex64> {
    let mut block = Array2::zeros((2, 2));
    block[[0, 0]] = Complex64::new(1.0, 0.0);
    block
}

/// Projector on the spin-down component, `[[0, 0], [0, 1]]`
pub fn spin_down_block() -> Array2<Complex64> {
    let mut block = Array2::zeros((2, 2));
    block[[1, 1]] = Complex64::new(1.0, 0.0);
    block
}

/// `kron(alpha, up) + kron(beta, down)`
pub fn combine_spin_channels(
    alpha: &Array2<Complex64>,
    beta: &Array2<Complex64>,
) -> Array2<Complex64> {
    kron(alpha, &spin_up_block()) + kron(beta, &spin_down_block())
}

/// `kron(overlap, I_2)`
pub fn expand_overlap(overlap: &Array2<Complex64>) -> Array2<Complex64> {
    kron(overlap, &Array2::<Complex64>::eye(2))
}

/// Merge aligned alpha/beta Fock stacks and double the overlap stack
pub fn expand_spin_blocks(
    alpha: &[Array2<Complex64>],
    beta: &[Array2<Complex64>],
    overlap: &[Array2<Complex64>],
) -> (Vec<Array2<Complex64>>, Vec<Array2<Complex64>>) {
    let hamiltonian = alpha
        .par_iter()
        .zip(beta.par_iter())
        .map(|(a, b)| combine_spin_channels(a, b))
        .collect();
    let overlap = overlap.par_iter().map(expand_overlap).collect();
    (hamiltonian, overlap)
}

/// Stack `n x n` matrices along a new leading axis
pub fn stack_slices(slices: &[Array2<Complex64>], n: usize) -> Result<Array3<Complex64>> {
    let mut stacked = Array3::zeros((slices.len(), n, n));
    for (i, slice) in slices.iter().enumerate() {
        if slice.dim() != (n, n) {
            return Err(InputError::InconsistentData(format!(
                "matrix {} has shape {:?}, expected ({}, {})",
                i,
                slice.dim(),
                n,
                n
            )));
        }
        stacked.index_axis_mut(Axis(0), i).assign(slice);
    }
    Ok(stacked)
}

fn displacements_array(displacements: &[[f64; 3]]) -> Array2<f64> {
    let mut array = Array2::zeros((displacements.len(), 3));
    for (i, cell) in displacements.iter().enumerate() {
        for (k, value) in cell.iter().enumerate() {
            array[[i, k]] = *value;
        }
    }
    array
}

/// Build the system record from one parse pass
pub fn assemble(parsed: ParsedOutput) -> Result<SystemInfo> {
    let lattice = parsed
        .lattice
        .ok_or(InputError::MissingSection("direct lattice vectors"))?;
    let natoms = parsed
        .natoms
        .ok_or(InputError::MissingSection("number of atoms per cell"))?;
    let norbitals = parsed
        .norbitals
        .ok_or(InputError::MissingSection("number of atomic orbitals"))?;
    let electrons = parsed
        .electrons
        .ok_or(InputError::MissingSection("number of electrons per cell"))?;
    let motif = parsed.motif.ok_or(InputError::MissingSection("atom table"))?;
    let basis = parsed.basis.ok_or(InputError::MissingSection("basis set"))?;

    if motif.len() != natoms {
        return Err(InputError::InconsistentData(format!(
            "{} atoms declared but {} read",
            natoms,
            motif.len()
        )));
    }

    let orbitals_in_cell = parsed.orbitals.total(&motif);
    if orbitals_in_cell != norbitals {
        warn!(
            "Basis set gives {} orbitals per cell but the header declares {}",
            orbitals_in_cell, norbitals
        );
    }

    if let Some(nshells) = parsed.nshells {
        let shells_in_cell: usize = motif
            .atoms()
            .iter()
            .filter_map(|atom| parsed.species.declared_shells(atom.species))
            .sum();
        if shells_in_cell != nshells {
            warn!(
                "Atom table lists {} shells per cell but the header declares {}",
                shells_in_cell, nshells
            );
        }
    }

    let mut orbitals = parsed.orbitals.to_vec(&parsed.species)?;
    let mut filling = electrons as f64 / 2.0;
    let spin_mode = parsed.flags.mode();

    match spin_mode {
        SpinMode::Restricted => {
            let nfock = parsed.cells.fock(FockChannel::Restricted).len();
            if nfock == 0 && !parsed.cells.is_empty() {
                warn!(
                    "No Fock matrices for {} cells; the Hamiltonian stack is empty",
                    parsed.cells.len()
                );
            } else {
                parsed.cells.check_aligned(FockChannel::Restricted)?;
            }
        }
        SpinMode::Unrestricted => {
            parsed.cells.check_aligned(FockChannel::Alpha)?;
            parsed.cells.check_aligned(FockChannel::Beta)?;
        }
        SpinMode::SpinOrbit => {}
    }

    let stacks = parsed.cells.into_stacks();
    let (hamiltonian, overlap, dim) = match spin_mode {
        SpinMode::Restricted => (stacks.fock, stacks.overlap, norbitals),
        SpinMode::Unrestricted => {
            filling *= 2.0;
            orbitals.iter_mut().for_each(|n| *n *= 2);
            let (hamiltonian, overlap) =
                expand_spin_blocks(&stacks.alpha, &stacks.beta, &stacks.overlap);
            (hamiltonian, overlap, 2 * norbitals)
        }
        SpinMode::SpinOrbit => {
            filling *= 2.0;
            orbitals.iter_mut().for_each(|n| *n *= 2);
            warn!("Spin-orbit Hamiltonian is not assembled; the Hamiltonian stack is empty");
            (Vec::new(), stacks.overlap, norbitals)
        }
    };

    let system = SystemInfo {
        dimension: lattice.dimension(),
        lattice: lattice.to_array(),
        motif: motif.to_array(),
        species: parsed.species.labels().to_vec(),
        orbitals,
        filling,
        electrons,
        core_electrons: parsed.core_electrons,
        nshells: parsed.nshells,
        spin_mode,
        basis,
        cell_coefficients: stacks.coefficients,
        displacements: displacements_array(&stacks.displacements),
        hamiltonian: stack_slices(&hamiltonian, dim)?,
        overlap: stack_slices(&overlap, dim)?,
    };
    system.validate()?;

    info!(
        "System assembled: dimension {}, {} atoms, {} cells, filling {}",
        system.dimension,
        natoms,
        system.ncells(),
        system.filling
    );
    Ok(system)
}
