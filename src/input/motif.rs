/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Atoms of the unit cell and the chemical species table

use super::cursor::LineCursor;
use super::errors::Result;
use super::tokens::parse_token;
use log::debug;
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashMap;
use std::io::BufRead;

/// Chemical species in first-seen order.
///
/// Codes are dense and start at 0. Each species also keeps the shell count
/// declared with its first atom, which the basis section must reproduce.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpeciesTable {
    labels: Vec<String>,
    declared_shells: Vec<usize>,
    #[serde(skip)]
    codes: HashMap<String, usize>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code of `label`, registering it with `nshells` shells if unseen
    pub fn register(&mut self, label: &str, nshells: usize) -> usize {
        if let Some(&code) = self.codes.get(label) {
            return code;
        }
        let code = self.labels.len();
        self.labels.push(label.to_string());
        self.declared_shells.push(nshells);
        self.codes.insert(label.to_string(), code);
        code
    }

    pub fn code(&self, label: &str) -> Option<usize> {
        self.codes.get(label).copied()
    }

    pub fn label(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Shell count declared with the first atom of the species
    pub fn declared_shells(&self, code: usize) -> Option<usize> {
        self.declared_shells.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One atom of the motif
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MotifAtom {
    /// Cartesian position
    pub position: [f64; 3],
    /// Species code from the `SpeciesTable`
    pub species: usize,
}

/// Atoms of the unit cell in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Motif {
    atoms: Vec<MotifAtom>,
}

impl Motif {
    pub fn new(atoms: Vec<MotifAtom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[MotifAtom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Species code of the atom at `index`
    pub fn species_of(&self, index: usize) -> Option<usize> {
        self.atoms.get(index).map(|atom| atom.species)
    }

    /// Translate all atoms so the first one sits at the origin
    pub fn recenter(&mut self) {
        let Some(reference) = self.atoms.first().map(|atom| atom.position) else {
            return;
        };
        for atom in &mut self.atoms {
            for k in 0..3 {
                atom.position[k] -= reference[k];
            }
        }
    }

    /// `N x 4` array of rows `(x, y, z, species)`
    pub fn to_array(&self) -> Array2<f64> {
        let mut array = Array2::zeros((self.atoms.len(), 4));
        for (i, atom) in self.atoms.iter().enumerate() {
            array[[i, 0]] = atom.position[0];
            array[[i, 1]] = atom.position[1];
            array[[i, 2]] = atom.position[2];
            array[[i, 3]] = atom.species as f64;
        }
        array
    }
}

/// Read the atom table following its header line.
///
/// One separator line, then `natoms` rows of
/// `index  atomic-number  species  nshells  x  y  z`.
pub fn parse_atoms<R: BufRead>(
    cursor: &mut LineCursor<R>,
    natoms: usize,
    species: &mut SpeciesTable,
) -> Result<Motif> {
    cursor.expect_line("atom table separator")?;

    let mut atoms = Vec::with_capacity(natoms);
    for _ in 0..natoms {
        let line = cursor.expect_line("atom table")?;
        let line_number = cursor.line_number();
        let mut tokens = line.split_whitespace();

        let _serial: usize = parse_token(tokens.next(), "atom serial index", line_number, &line)?;
        let _atomic_number: i64 = parse_token(tokens.next(), "atomic number", line_number, &line)?;
        let label: String = parse_token(tokens.next(), "species label", line_number, &line)?;
        let nshells: usize = parse_token(tokens.next(), "shell count", line_number, &line)?;
        let mut position = [0.0; 3];
        for component in position.iter_mut() {
            *component = parse_token(tokens.next(), "atom coordinate", line_number, &line)?;
        }

        let code = species.register(&label, nshells);
        atoms.push(MotifAtom {
            position,
            species: code,
        });
    }

    debug!("Motif: {} atoms, {} species", atoms.len(), species.len());
    Ok(Motif::new(atoms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::errors::InputError;
    use std::io::Cursor;

    const TABLE: &str = " ****************************************
     1     6 C        2     0.000000   0.000000   0.000000
     2     7 N        3     1.420000   0.000000   0.000000
     3     6 C        2     2.840000   0.000000   0.000000
";

    #[test]
    fn test_species_codes_in_first_seen_order() {
        let mut species = SpeciesTable::new();
        let mut cursor = LineCursor::new(Cursor::new(TABLE.as_bytes()));
        let motif = parse_atoms(&mut cursor, 3, &mut species).unwrap();

        assert_eq!(species.labels(), &["C".to_string(), "N".to_string()]);
        assert_eq!(species.declared_shells(0), Some(2));
        assert_eq!(species.declared_shells(1), Some(3));
        assert_eq!(motif.species_of(0), Some(0));
        assert_eq!(motif.species_of(1), Some(1));
        assert_eq!(motif.species_of(2), Some(0));
        assert_eq!(motif.atoms()[1].position, [1.42, 0.0, 0.0]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut species = SpeciesTable::new();
        assert_eq!(species.register("Mo", 5), 0);
        assert_eq!(species.register("S", 3), 1);
        assert_eq!(species.register("Mo", 99), 0);
        assert_eq!(species.declared_shells(0), Some(5));
        assert_eq!(species.len(), 2);
    }

    #[test]
    fn test_motif_array_and_recenter() {
        let mut species = SpeciesTable::new();
        let mut cursor = LineCursor::new(Cursor::new(TABLE.as_bytes()));
        let mut motif = parse_atoms(&mut cursor, 3, &mut species).unwrap();
        motif.atoms[0].position = [1.0, 1.0, 1.0];
        motif.recenter();

        let array = motif.to_array();
        assert_eq!(array.shape(), &[3, 4]);
        assert_eq!(array[[0, 0]], 0.0);
        assert!((array[[1, 0]] - 0.42).abs() < 1e-12);
        assert_eq!(array[[1, 1]], -1.0);
        assert_eq!(array[[1, 3]], 1.0);
    }

    #[test]
    fn test_malformed_atom_row() {
        let text = " ****\n     1     6 C   two   0.0 0.0 0.0\n";
        let mut species = SpeciesTable::new();
        let mut cursor = LineCursor::new(Cursor::new(text.as_bytes()));
        match parse_atoms(&mut cursor, 1, &mut species) {
            Err(InputError::FormatError { line, found, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(found, "two");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
