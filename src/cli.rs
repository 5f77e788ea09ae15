// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[arg(short = 'u', long = "url", help = "Single target URL")]
    pub target: Option<String>,

    #[arg(
        short = 'l',
        long = "list",
        help = "File containing newline-delimited target URLs"
    )]
    pub list: Option<String>,

    #[arg(
        short = 't',
        long = "threads",
        default_value_t = 5,
        help = "Number of concurrent scan tasks"
    )]
    pub threads: usize,

    #[arg(
        long = "timeout",
        default_value_t = 15,
        help = "Per-connection timeout in seconds"
    )]
    pub timeout: u64,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short = 'o', long = "output", help = "Write findings to a file")]
    pub output: Option<String>,

    #[arg(long = "json", help = "Additionally write findings as JSON to a file")]
    pub json: Option<String>,
}
