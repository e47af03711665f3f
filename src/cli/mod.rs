/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command Line Interface (CLI) module
//!
//! Parses one CRYSTAL output file and prints either a short summary of the
//! assembled system or the whole record as JSON.

use crate::input::config::DEFAULT_LATTICE_THRESHOLD;
use crate::input::{CrystalOutputParser, ParserConfig, SocPolicy};
use anyhow::Context;
use clap::Parser;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

/// crystal-tb - tight-binding data from CRYSTAL output
#[derive(Parser, Debug)]
#[command(name = "crystal-tb")]
#[command(version)]
#[command(about = "Extract lattice, basis and per-cell Fock/overlap matrices from CRYSTAL output", long_about = None)]
pub struct Cli {
    /// CRYSTAL output file
    pub file: PathBuf,

    /// Keep the matrices of cells 1..=N
    #[arg(short = 'n', long, default_value_t = 1)]
    pub ncells: usize,

    /// Lattice vectors longer than this are treated as non-periodic fillers
    #[arg(short, long, default_value_t = DEFAULT_LATTICE_THRESHOLD)]
    pub threshold: f64,

    /// Translate the motif so the first atom sits at the origin
    #[arg(long)]
    pub recenter: bool,

    /// Zero-fill matrix entries missing from the dump instead of failing
    #[arg(long)]
    pub allow_incomplete: bool,

    /// Skip spin-orbit Fock matrices instead of failing
    #[arg(long)]
    pub discard_soc: bool,

    /// Print the assembled system as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parser configuration described by the arguments
    pub fn parser_config(&self) -> ParserConfig {
        let policy = if self.discard_soc {
            SocPolicy::Discard
        } else {
            SocPolicy::Reject
        };
        ParserConfig::new(self.ncells)
            .with_input_path(&self.file)
            .with_lattice_threshold(self.threshold)
            .with_recentered_motif(self.recenter)
            .with_complete_matrices(!self.allow_incomplete)
            .with_soc_policy(policy)
    }
}

/// Parse the file named on the command line and print the result
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let parser = CrystalOutputParser::new(cli.parser_config());
    let system = parser
        .parse()
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    info!("Parsed {} cells from {}", system.ncells(), cli.file.display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &system).context("failed to write JSON")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", system)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["crystal-tb", "run.outp"]).unwrap();
        let config = cli.parser_config();
        assert_eq!(config.input_path, PathBuf::from("run.outp"));
        assert_eq!(config.ncells, 1);
        assert_eq!(config.lattice_threshold, DEFAULT_LATTICE_THRESHOLD);
        assert!(config.require_complete_matrices);
        assert_eq!(config.soc_policy, SocPolicy::Reject);
        assert!(!cli.json);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "crystal-tb",
            "run.outp",
            "--ncells",
            "7",
            "--threshold",
            "80",
            "--recenter",
            "--allow-incomplete",
            "--discard-soc",
            "--json",
        ])
        .unwrap();
        let config = cli.parser_config();
        assert_eq!(config.ncells, 7);
        assert_eq!(config.lattice_threshold, 80.0);
        assert!(config.recenter_motif);
        assert!(!config.require_complete_matrices);
        assert_eq!(config.soc_policy, SocPolicy::Discard);
        assert!(cli.json);
    }

    #[test]
    fn test_missing_file_argument() {
        assert!(Cli::try_parse_from(["crystal-tb"]).is_err());
    }
}
