/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Section markers of the CRYSTAL output and the section locator

pub const LATTICE_MARKER: &str = "DIRECT LATTICE VECTOR COMPONENTS";
pub const ATOM_COUNT_MARKER: &str = "N. OF ATOMS PER CELL";
pub const SHELL_COUNT_MARKER: &str = "NUMBER OF SHELLS";
pub const ORBITAL_COUNT_MARKER: &str = "NUMBER OF AO";
pub const ELECTRON_COUNT_MARKER: &str = "N. OF ELECTRONS PER CELL";
pub const CORE_ELECTRON_MARKER: &str = "CORE ELECTRONS PER CELL";
pub const BASIS_SET_MARKER: &str = "LOCAL ATOMIC FUNCTIONS BASIS SET";
pub const OVERLAP_MARKER: &str = "OVERLAP MATRIX";
pub const FOCK_MARKER: &str = "FOCK MATRIX";
pub const UNRESTRICTED_MARKER: &str = "UNRESTRICTED OPEN SHELL";

/// Label preceding the cell index in matrix headers
pub const CELL_LABEL: &str = "CELL N.";

/// Sections of the output that trigger an extraction routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Lattice,
    AtomCount,
    ShellCount,
    OrbitalCount,
    ElectronCount,
    CoreElectronCount,
    AtomTable,
    BasisSet,
    OverlapMatrix,
    SpinOrbit,
    Unrestricted,
    FockMatrix,
}

impl Section {
    /// Find the section a line opens, if any.
    ///
    /// Markers are tried in a fixed order and the first match wins.
    pub fn locate(line: &str, soc_marker: &str) -> Option<Section> {
        if line.contains(LATTICE_MARKER) {
            Some(Section::Lattice)
        } else if line.contains(ATOM_COUNT_MARKER) {
            Some(Section::AtomCount)
        } else if line.contains(SHELL_COUNT_MARKER) {
            Some(Section::ShellCount)
        } else if line.contains(ORBITAL_COUNT_MARKER) {
            Some(Section::OrbitalCount)
        } else if line.contains(ELECTRON_COUNT_MARKER) {
            Some(Section::ElectronCount)
        } else if line.contains(CORE_ELECTRON_MARKER) {
            Some(Section::CoreElectronCount)
        } else if line.contains("ATOM") && line.contains("SHELL") {
            Some(Section::AtomTable)
        } else if line.contains(BASIS_SET_MARKER) {
            Some(Section::BasisSet)
        } else if line.contains(OVERLAP_MARKER) {
            Some(Section::OverlapMatrix)
        } else if line.contains(soc_marker) {
            Some(Section::SpinOrbit)
        } else if line.contains(UNRESTRICTED_MARKER) {
            Some(Section::Unrestricted)
        } else if line.contains(FOCK_MARKER) {
            Some(Section::FockMatrix)
        } else {
            None
        }
    }
}

/// Whether the line announces the beta spin channel.
///
/// Checked on every line, independently of section dispatch.
pub fn is_beta_channel_marker(line: &str) -> bool {
    line.contains("BETA") && line.contains("ELECTRONS")
}
