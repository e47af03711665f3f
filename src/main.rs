/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for crystal-tb

use clap::Parser;
use crystal_tb::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    log::debug!("crystal-tb v{} with {:?}", crystal_tb::VERSION, cli);
    cli::run(&cli)
}
