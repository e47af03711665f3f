/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! CRYSTAL output parsing module
//!
//! This module reads the text output of a CRYSTAL run in a single forward
//! pass. Section titles are recognized line by line; each section reader
//! consumes exactly the lines it owns and hands the stream back. The sections
//! used are:
//!
//! - the header counts (atoms, shells, orbitals, electrons)
//! - the direct lattice vectors
//! - the atom table and the basis set
//! - the overlap and Fock matrices of each lattice cell

pub mod basis;
pub mod cells;
pub mod config;
pub mod cursor;
pub mod errors;
pub mod lattice;
pub mod markers;
pub mod matrix;
pub mod motif;
pub mod parser;
pub mod tokens;

pub use basis::{BasisSet, GaussianTerm, OrbitalCounts, Shell};
pub use cells::{CellHeader, CellMatrixStore, FockChannel};
pub use config::{ParserConfig, SocPolicy};
pub use cursor::LineCursor;
pub use errors::{InputError, Result};
pub use lattice::Lattice;
pub use markers::Section;
pub use matrix::BlockMatrixReader;
pub use motif::{Motif, MotifAtom, SpeciesTable};
pub use parser::{CrystalOutputParser, ParsedOutput, SpinFlags};

use crate::system::SystemInfo;
use std::path::Path;

/// Parse a CRYSTAL output file keeping cells `1..=ncells`
pub fn parse_crystal_output<P: AsRef<Path>>(path: P, ncells: usize) -> Result<SystemInfo> {
    let config = ParserConfig::new(ncells).with_input_path(path.as_ref());
    CrystalOutputParser::new(config).parse()
}
