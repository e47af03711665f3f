/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Single-pass parser for CRYSTAL output files

use super::basis::{parse_basis, BasisSet, OrbitalCounts};
use super::cells::{CellHeader, CellMatrixStore, FockChannel};
use super::config::{ParserConfig, SocPolicy};
use super::cursor::LineCursor;
use super::errors::{InputError, Result};
use super::lattice::{parse_lattice, Lattice};
use super::markers::{self, is_beta_channel_marker, Section};
use super::matrix::BlockMatrixReader;
use super::motif::{parse_atoms, Motif, SpeciesTable};
use super::tokens::value_after;
use crate::system::{assembly, SpinMode, SystemInfo};

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Flags discovered during the pass that change how later matrices are read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpinFlags {
    /// The calculation includes spin-orbit coupling
    pub spin_orbit: bool,
    /// The calculation is spin unrestricted
    pub unrestricted: bool,
    /// Fock matrices now belong to the beta channel
    pub beta_channel: bool,
}

impl SpinFlags {
    /// Spin treatment of the calculation; spin-orbit takes precedence
    pub fn mode(&self) -> SpinMode {
        if self.spin_orbit {
            SpinMode::SpinOrbit
        } else if self.unrestricted {
            SpinMode::Unrestricted
        } else {
            SpinMode::Restricted
        }
    }

    /// Stack the next Fock matrix goes to, `None` for spin-orbit runs
    pub fn fock_channel(&self) -> Option<FockChannel> {
        match self.mode() {
            SpinMode::SpinOrbit => None,
            SpinMode::Unrestricted if self.beta_channel => Some(FockChannel::Beta),
            SpinMode::Unrestricted => Some(FockChannel::Alpha),
            SpinMode::Restricted => Some(FockChannel::Restricted),
        }
    }
}

/// Everything gathered by one pass over the file, before assembly
#[derive(Debug, Clone, Default)]
pub struct ParsedOutput {
    pub lattice: Option<Lattice>,
    pub natoms: Option<usize>,
    pub nshells: Option<usize>,
    pub norbitals: Option<usize>,
    pub electrons: Option<usize>,
    pub core_electrons: Option<usize>,
    pub species: SpeciesTable,
    pub motif: Option<Motif>,
    pub basis: Option<BasisSet>,
    pub orbitals: OrbitalCounts,
    pub cells: CellMatrixStore,
    pub flags: SpinFlags,
}

/// Main CRYSTAL output parser
#[derive(Debug, Clone)]
pub struct CrystalOutputParser {
    config: ParserConfig,
}

impl CrystalOutputParser {
    /// Create a new parser with the given configuration
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse the file named in the configuration
    pub fn parse(&self) -> Result<SystemInfo> {
        self.parse_file(&self.config.input_path)
    }

    /// Parse a CRYSTAL output file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<SystemInfo> {
        let path = path.as_ref();
        info!("Reading CRYSTAL output {}", path.display());
        let file = File::open(path).map_err(InputError::IoError)?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse CRYSTAL output from any buffered reader
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<SystemInfo> {
        let parsed = self.read_sections(reader)?;
        let system = assembly::assemble(parsed)?;
        debug!("Assembled system:\n{}", system);
        Ok(system)
    }

    /// Run the pass over the stream without assembling the result
    pub fn read_sections<R: BufRead>(&self, reader: R) -> Result<ParsedOutput> {
        self.config.validate()?;
        let mut session = ParseSession {
            config: &self.config,
            cursor: LineCursor::new(reader),
            out: ParsedOutput {
                cells: CellMatrixStore::new(self.config.ncells),
                ..ParsedOutput::default()
            },
        };
        session.run()?;
        Ok(session.out)
    }
}

/// State of one pass: the cursor and the structures built so far
struct ParseSession<'a, R> {
    config: &'a ParserConfig,
    cursor: LineCursor<R>,
    out: ParsedOutput,
}

impl<R: BufRead> ParseSession<'_, R> {
    fn run(&mut self) -> Result<()> {
        while let Some(line) = self.cursor.next_line()? {
            if !self.out.flags.beta_channel && is_beta_channel_marker(&line) {
                debug!(
                    "Beta channel starts at line {}",
                    self.cursor.line_number()
                );
                self.out.flags.beta_channel = true;
            }

            if let Some(section) = Section::locate(&line, &self.config.soc_marker) {
                self.dispatch(section, &line)?;
            }
        }

        info!(
            "Finished reading: {} cells kept, spin mode {:?}",
            self.out.cells.len(),
            self.out.flags.mode()
        );
        Ok(())
    }

    fn dispatch(&mut self, section: Section, line: &str) -> Result<()> {
        let line_number = self.cursor.line_number();
        match section {
            Section::Lattice => {
                let lattice = parse_lattice(&mut self.cursor, self.config.lattice_threshold)?;
                info!("Lattice found, dimension {}", lattice.dimension());
                self.out.lattice = Some(lattice);
            }
            Section::AtomCount => {
                self.out.natoms = Some(value_after(line, markers::ATOM_COUNT_MARKER, line_number)?);
            }
            Section::ShellCount => {
                self.out.nshells = Some(value_after(line, markers::SHELL_COUNT_MARKER, line_number)?);
            }
            Section::OrbitalCount => {
                self.out.norbitals =
                    Some(value_after(line, markers::ORBITAL_COUNT_MARKER, line_number)?);
            }
            Section::ElectronCount => {
                self.out.electrons =
                    Some(value_after(line, markers::ELECTRON_COUNT_MARKER, line_number)?);
            }
            Section::CoreElectronCount => {
                self.out.core_electrons =
                    Some(value_after(line, markers::CORE_ELECTRON_MARKER, line_number)?);
            }
            Section::AtomTable => self.read_atom_table()?,
            Section::BasisSet => self.read_basis()?,
            Section::OverlapMatrix => self.read_overlap(line, line_number)?,
            Section::SpinOrbit => {
                info!("Spin-orbit calculation flagged at line {}", line_number);
                self.out.flags.spin_orbit = true;
            }
            Section::Unrestricted => {
                info!("Unrestricted calculation flagged at line {}", line_number);
                self.out.flags.unrestricted = true;
            }
            Section::FockMatrix => self.read_fock(line, line_number)?,
        }
        Ok(())
    }

    fn read_atom_table(&mut self) -> Result<()> {
        let natoms = match self.out.natoms {
            Some(n) if n > 0 => n,
            _ => {
                return Err(InputError::OrderingError {
                    section: "atom table",
                    requires: "the number of atoms per cell",
                })
            }
        };

        let mut motif = parse_atoms(&mut self.cursor, natoms, &mut self.out.species)?;
        if self.config.recenter_motif {
            motif.recenter();
        }
        info!(
            "Motif found: {} atoms of {} species",
            motif.len(),
            self.out.species.len()
        );
        self.out.motif = Some(motif);
        Ok(())
    }

    fn read_basis(&mut self) -> Result<()> {
        let motif = self.out.motif.as_ref().ok_or(InputError::OrderingError {
            section: "basis set",
            requires: "the atom table",
        })?;

        let (basis, orbitals) = parse_basis(&mut self.cursor, motif, &self.out.species)?;
        info!(
            "Basis set found: {} orbitals per cell",
            orbitals.total(motif)
        );
        self.out.basis = Some(basis);
        self.out.orbitals = orbitals;
        Ok(())
    }

    fn matrix_reader(&self, section: &'static str) -> Result<BlockMatrixReader> {
        let norbitals = self.out.norbitals.ok_or(InputError::OrderingError {
            section,
            requires: "the number of atomic orbitals",
        })?;
        Ok(BlockMatrixReader::new(
            norbitals,
            self.config.require_complete_matrices,
        ))
    }

    fn read_overlap(&mut self, line: &str, line_number: usize) -> Result<()> {
        let Some(header) = CellHeader::parse(line, line_number)? else {
            debug!("Line {} mentions the overlap matrix without a cell", line_number);
            return Ok(());
        };
        let reader = self.matrix_reader("overlap matrix")?;
        let lattice = self.out.lattice.as_ref().ok_or(InputError::OrderingError {
            section: "overlap matrix",
            requires: "the lattice vectors",
        })?;
        let displacement = lattice.displacement(&header.coefficients);

        let context = format!("overlap matrix of cell {}", header.index);
        let matrix = reader.read(&mut self.cursor, &context)?;

        if self.out.cells.retains(header.index) {
            debug!("Keeping {} at {:?}", context, displacement);
            self.out.cells.push_overlap(&header, displacement, matrix);
        } else {
            debug!("Skipping {} beyond the cell limit", context);
        }
        Ok(())
    }

    fn read_fock(&mut self, line: &str, line_number: usize) -> Result<()> {
        let Some(header) = CellHeader::parse(line, line_number)? else {
            debug!("Line {} mentions the Fock matrix without a cell", line_number);
            return Ok(());
        };
        let reader = self.matrix_reader("Fock matrix")?;

        let channel = self.out.flags.fock_channel();
        if channel.is_none() && self.config.soc_policy == SocPolicy::Reject {
            return Err(InputError::UnsupportedMode(format!(
                "Fock matrix of cell {} at line {} belongs to a spin-orbit calculation",
                header.index, line_number
            )));
        }

        let context = format!("Fock matrix of cell {}", header.index);
        let matrix = reader.read(&mut self.cursor, &context)?;

        if !self.out.cells.retains(header.index) {
            debug!("Skipping {} beyond the cell limit", context);
            return Ok(());
        }
        match channel {
            Some(channel) => {
                debug!("Keeping {} in the {:?} stack", context, channel);
                self.out.cells.push_fock(channel, matrix);
            }
            None => warn!("Discarding spin-orbit {}", context),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_flags_routing() {
        let mut flags = SpinFlags::default();
        assert_eq!(flags.fock_channel(), Some(FockChannel::Restricted));

        flags.unrestricted = true;
        assert_eq!(flags.fock_channel(), Some(FockChannel::Alpha));
        flags.beta_channel = true;
        assert_eq!(flags.fock_channel(), Some(FockChannel::Beta));

        flags.spin_orbit = true;
        assert_eq!(flags.mode(), SpinMode::SpinOrbit);
        assert_eq!(flags.fock_channel(), None);
    }

    #[test]
    fn test_beta_marker_before_unrestricted_does_not_route() {
        let flags = SpinFlags {
            beta_channel: true,
            ..SpinFlags::default()
        };
        assert_eq!(flags.fock_channel(), Some(FockChannel::Restricted));
    }

    #[test]
    fn test_atom_table_before_count_is_an_ordering_error() {
        let text = "   ATOM  AT.N.  SPECIES  N.SHELL  X  Y  Z\n ****\n 1 6 C 1 0.0 0.0 0.0\n";
        let parser = CrystalOutputParser::new(ParserConfig::default());
        assert!(matches!(
            parser.read_sections(text.as_bytes()),
            Err(InputError::OrderingError { section: "atom table", .. })
        ));
    }

    #[test]
    fn test_matrix_before_orbital_count_is_an_ordering_error() {
        let text = " OVERLAP MATRIX - CELL N.   1(  0  0  0)\n\n  1\n 1  1.0\n";
        let parser = CrystalOutputParser::new(ParserConfig::default());
        assert!(matches!(
            parser.read_sections(text.as_bytes()),
            Err(InputError::OrderingError { section: "overlap matrix", .. })
        ));
    }

    #[test]
    fn test_basis_before_atom_table_is_an_ordering_error() {
        let text = " N. OF ATOMS PER CELL          1\n LOCAL ATOMIC FUNCTIONS BASIS SET\n ****\n";
        let parser = CrystalOutputParser::new(ParserConfig::default());
        assert!(matches!(
            parser.read_sections(text.as_bytes()),
            Err(InputError::OrderingError { section: "basis set", .. })
        ));
    }

    #[test]
    fn test_overlap_before_lattice_is_an_ordering_error() {
        let text = " NUMBER OF AO                  1\n OVERLAP MATRIX - CELL N.   1(  0  0  0)\n\n  1\n 1  1.0\n DIRECT LATTICE VECTOR COMPONENTS (ANGSTROM)\n 3.0 0.0 0.0\n 0.0 3.0 0.0\n 0.0 0.0 3.0\n";
        let parser = CrystalOutputParser::new(ParserConfig::default());
        assert!(matches!(
            parser.read_sections(text.as_bytes()),
            Err(InputError::OrderingError { section: "overlap matrix", .. })
        ));
    }
}
