/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Gaussian basis set of each chemical species
//!
//! The basis section lists every atom of the cell, but only the first atom of
//! each species carries its shells. A shell is a header such as `1-   4 SP`
//! (the last number is the running orbital index) followed by an open-ended
//! list of `exponent  s-coef  p-coef  d-coef` rows. The list ends at the first
//! line that does not hold exactly four numbers; that line is pushed back for
//! the caller.

use super::cursor::LineCursor;
use super::errors::{InputError, Result};
use super::motif::{Motif, SpeciesTable};
use super::tokens::{numeric_prefix, parse_token};
use log::debug;
use serde::Serialize;
use std::io::BufRead;

/// One primitive of a contracted Gaussian shell
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaussianTerm {
    pub exponent: f64,
    pub s_coefficient: f64,
    pub p_coefficient: f64,
    pub d_coefficient: f64,
}

/// A shell of atomic orbitals on one species
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shell {
    /// Shell type label as printed (`S`, `SP`, `P`, `D`, ...)
    pub kind: String,
    pub terms: Vec<GaussianTerm>,
}

/// Shells per species code
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BasisSet {
    species: Vec<Option<Vec<Shell>>>,
}

impl BasisSet {
    pub fn with_species(nspecies: usize) -> Self {
        Self {
            species: vec![None; nspecies],
        }
    }

    pub fn shells(&self, code: usize) -> Option<&[Shell]> {
        self.species.get(code).and_then(|s| s.as_deref())
    }

    /// Shell type labels of a species, in file order
    pub fn shell_types(&self, code: usize) -> Vec<&str> {
        self.shells(code)
            .map(|shells| shells.iter().map(|shell| shell.kind.as_str()).collect())
            .unwrap_or_default()
    }

    fn insert(&mut self, code: usize, shells: Vec<Shell>) {
        if code >= self.species.len() {
            self.species.resize(code + 1, None);
        }
        self.species[code] = Some(shells);
    }
}

/// Number of atomic orbitals contributed by one atom of each species
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitalCounts {
    per_species: Vec<Option<usize>>,
}

impl OrbitalCounts {
    pub fn with_species(nspecies: usize) -> Self {
        Self {
            per_species: vec![None; nspecies],
        }
    }

    pub fn get(&self, code: usize) -> Option<usize> {
        self.per_species.get(code).copied().flatten()
    }

    fn set(&mut self, code: usize, count: usize) {
        if code >= self.per_species.len() {
            self.per_species.resize(code + 1, None);
        }
        self.per_species[code] = Some(count);
    }

    /// Counts in species order, failing if a species never got its shells
    pub fn to_vec(&self, species: &SpeciesTable) -> Result<Vec<usize>> {
        (0..species.len())
            .map(|code| {
                self.get(code).ok_or_else(|| {
                    InputError::InconsistentData(format!(
                        "no basis functions found for species '{}'",
                        species.label(code).unwrap_or("?")
                    ))
                })
            })
            .collect()
    }

    /// Orbitals of the whole cell
    pub fn total(&self, motif: &Motif) -> usize {
        motif
            .atoms()
            .iter()
            .filter_map(|atom| self.get(atom.species))
            .sum()
    }
}

/// Read the basis section following its title line
pub fn parse_basis<R: BufRead>(
    cursor: &mut LineCursor<R>,
    motif: &Motif,
    species: &SpeciesTable,
) -> Result<(BasisSet, OrbitalCounts)> {
    // separator, column titles, separator
    for _ in 0..3 {
        cursor.expect_line("basis set header")?;
    }

    let mut basis = BasisSet::with_species(species.len());
    let mut orbitals = OrbitalCounts::with_species(species.len());
    let mut cumulative = 0usize;

    for atom_index in 0..motif.len() {
        let line = cursor.expect_line("basis set atom")?;
        let line_number = cursor.line_number();
        let mut tokens = line.split_whitespace();
        let _serial: usize = parse_token(tokens.next(), "atom serial index", line_number, &line)?;
        let label: String = parse_token(tokens.next(), "species label", line_number, &line)?;

        let code = species.code(&label).ok_or_else(|| {
            InputError::format(line_number, "a species from the atom table", label.as_str())
        })?;
        if motif.species_of(atom_index) != Some(code) {
            return Err(InputError::InconsistentData(format!(
                "basis atom {} is '{}' but the atom table lists a different species",
                atom_index + 1,
                label
            )));
        }

        if let Some(count) = orbitals.get(code) {
            cumulative += count;
            continue;
        }

        let nshells = species.declared_shells(code).unwrap_or(0);
        let mut shells = Vec::with_capacity(nshells);
        let mut last_orbital = cumulative;
        for _ in 0..nshells {
            let header = cursor.expect_line("shell header")?;
            let (orbital_index, kind) = parse_shell_header(&header, cursor.line_number())?;
            let terms = parse_gaussian_terms(cursor)?;
            shells.push(Shell { kind, terms });
            last_orbital = orbital_index;
        }

        let count = last_orbital.checked_sub(cumulative).ok_or_else(|| {
            InputError::InconsistentData(format!(
                "orbital index {} of species '{}' is below the running total {}",
                last_orbital, label, cumulative
            ))
        })?;
        debug!(
            "Basis: species '{}' has {} shells and {} orbitals",
            label,
            shells.len(),
            count
        );

        orbitals.set(code, count);
        basis.insert(code, shells);
        cumulative = last_orbital;
    }

    Ok((basis, orbitals))
}

/// Split a shell header into its running orbital index and type label.
///
/// Accepts `5 S` as well as the range forms `1-   4 SP` and `1 - 4 SP`,
/// where the number after the dash is the one kept.
fn parse_shell_header(line: &str, line_number: usize) -> Result<(usize, String)> {
    let spaced = line.replace('-', " - ");
    let mut tokens = spaced.split_whitespace();

    let mut index: usize = parse_token(tokens.next(), "shell orbital index", line_number, line)?;
    let mut kind: String = parse_token(tokens.next(), "shell type", line_number, line)?;
    if kind == "-" {
        index = parse_token(tokens.next(), "shell orbital index", line_number, line)?;
        kind = parse_token(tokens.next(), "shell type", line_number, line)?;
    }
    Ok((index, kind))
}

/// Coefficient rows of one shell, up to the first row that is not four numbers
fn parse_gaussian_terms<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<Vec<GaussianTerm>> {
    let mut terms = Vec::new();
    loop {
        cursor.mark();
        let Some(line) = cursor.next_line()? else {
            break;
        };

        let values = numeric_prefix(&line);
        if values.len() != 4 {
            cursor.rewind()?;
            break;
        }
        terms.push(GaussianTerm {
            exponent: values[0],
            s_coefficient: values[1],
            p_coefficient: values[2],
            d_coefficient: values[3],
        });
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::motif::MotifAtom;
    use std::io::Cursor;

    fn setup(table: &[(&str, usize)]) -> (Motif, SpeciesTable) {
        let mut species = SpeciesTable::new();
        let atoms = table
            .iter()
            .map(|(label, nshells)| MotifAtom {
                position: [0.0; 3],
                species: species.register(label, *nshells),
            })
            .collect();
        (Motif::new(atoms), species)
    }

    const HEADER: &str = " ****\n   ATOM   X(AU)   Y(AU)   Z(AU)  N. TYPE  EXPONENT  S COEF  P COEF  D/F/G COEF\n ****\n";

    #[test]
    fn test_shell_header_forms() {
        assert_eq!(parse_shell_header("      5 S", 1).unwrap(), (5, "S".to_string()));
        assert_eq!(parse_shell_header("   1-   4 SP", 1).unwrap(), (4, "SP".to_string()));
        assert_eq!(parse_shell_header("  10 -  14 D", 1).unwrap(), (14, "D".to_string()));
        assert!(parse_shell_header("  SP", 1).is_err());
    }

    #[test]
    fn test_orbitals_assigned_at_first_occurrence() {
        let (motif, species) = setup(&[("Mo", 2), ("S", 1), ("S", 1)]);
        let text = format!(
            "{}   1 Mo  0.0 0.0 0.0
      1 S
         1.0E+01  1.0E+00  0.0E+00  0.0E+00
         2.0E+00  5.0E-01  0.0E+00  0.0E+00
   2-   5 SP
         1.0E+00  1.0E+00  1.0E+00  0.0E+00
   2 S   0.0 0.0 1.5
   6-   9 SP
         3.0E-01  1.0E+00  1.0E+00  0.0E+00
   3 S   0.0 0.0 -1.5
 INFORMATION **** END OF BASIS
",
            HEADER
        );

        let mut cursor = LineCursor::new(Cursor::new(text.as_bytes()));
        let (basis, orbitals) = parse_basis(&mut cursor, &motif, &species).unwrap();

        assert_eq!(orbitals.get(0), Some(5));
        assert_eq!(orbitals.get(1), Some(4));
        assert_eq!(orbitals.total(&motif), 13);
        assert_eq!(basis.shell_types(0), vec!["S", "SP"]);
        assert_eq!(basis.shells(0).unwrap()[0].terms.len(), 2);
        assert_eq!(basis.shells(1).unwrap()[0].terms[0].exponent, 0.3);

        // the line after the last atom is left for the caller
        assert_eq!(
            cursor.next_line().unwrap().as_deref(),
            Some(" INFORMATION **** END OF BASIS")
        );
    }

    #[test]
    fn test_shell_without_coefficient_rows() {
        let (motif, species) = setup(&[("H", 2)]);
        let text = format!(
            "{}   1 H  0.0 0.0 0.0\n   1 S\n   2 S\n         0.5  1.0  0.0  0.0\n\n",
            HEADER
        );
        let mut cursor = LineCursor::new(Cursor::new(text.as_bytes()));
        let (basis, orbitals) = parse_basis(&mut cursor, &motif, &species).unwrap();

        let shells = basis.shells(0).unwrap();
        assert_eq!(shells.len(), 2);
        assert!(shells[0].terms.is_empty());
        assert_eq!(shells[1].terms.len(), 1);
        assert_eq!(orbitals.get(0), Some(2));
    }

    #[test]
    fn test_unknown_species_in_basis() {
        let (motif, species) = setup(&[("C", 1)]);
        let text = format!("{}   1 SI  0.0 0.0 0.0\n", HEADER);
        let mut cursor = LineCursor::new(Cursor::new(text.as_bytes()));
        assert!(matches!(
            parse_basis(&mut cursor, &motif, &species),
            Err(InputError::FormatError { line: 4, .. })
        ));
    }
}
