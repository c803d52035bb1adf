/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for gmt-rs

use clap::Parser;
use gmt_rs::cli::{execute, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    execute(cli)
}
