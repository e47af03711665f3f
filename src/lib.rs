/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # crystal-tb
//!
//! Reads the output of the CRYSTAL DFT code and assembles a tight-binding
//! description of the system: lattice, atoms of the cell, basis set, and the
//! Fock and overlap matrices of each lattice cell.
//!
//! ```no_run
//! let system = crystal_tb::parse_crystal_output("mos2.outp", 7)?;
//! println!("{} cells of {} orbitals", system.ncells(), system.matrix_dimension());
//! # Ok::<(), crystal_tb::InputError>(())
//! ```

pub mod cli;
pub mod input;
pub mod system;

pub use input::{parse_crystal_output, CrystalOutputParser, InputError, ParserConfig, SocPolicy};
pub use system::{SpinMode, SystemInfo};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
