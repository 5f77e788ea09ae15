// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use rsmuggle::cli::Cli;
use rsmuggle::config::ScannerConfig;
use rsmuggle::getstate::ScanState;
use rsmuggle::report;
use rsmuggle::scanner::{run_batch, Scanner};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::time::Duration;

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Newline-delimited target list; blank lines and `#` comments are skipped.
fn load_target_list(path: &str) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut targets = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            targets.push(trimmed.to_string());
        }
    }

    Ok(targets)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log_level)
        .init();

    report::print_banner();

    if cli.target.is_none() && cli.list.is_none() {
        report::print_usage_hint();
        return;
    }

    let mut targets = Vec::new();
    if let Some(target) = &cli.target {
        targets.push(target.clone());
    }
    if let Some(list) = &cli.list {
        match load_target_list(list) {
            Ok(mut listed) => targets.append(&mut listed),
            Err(e) => {
                eprintln!("{} Error opening file {}: {}", "[!]".red(), list, e);
                return;
            }
        }
    }

    println!(
        "\n[*] Testing {} URL(s) for HTTP Request Smuggling...",
        targets.len()
    );
    println!("[*] Testing: CL.TE, TE.CL, TE.TE variants");

    let mut config = ScannerConfig::new();
    config.set_timeout(Duration::from_secs(cli.timeout));
    config.set_verbose(cli.verbose);
    let scanner = Arc::new(Scanner::new(config));

    let mut state = ScanState::new();
    state.set_total_targets(targets.len() as u64);
    state.set_start_time(now_millis());

    let pb = if targets.len() > 1 {
        let pb = ProgressBar::new(targets.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}",
                )
                .unwrap()
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let pb_handle = pb.clone();
    let results = run_batch(
        Arc::clone(&scanner),
        targets,
        cli.threads,
        |target_url, findings| {
            for finding in findings {
                pb_handle.suspend(|| report::print_finding(finding));
            }
            state.add_scanned();
            state.add_findings(findings.len() as u64);
            pb_handle.set_message(target_url.to_string());
            pb_handle.inc(1);
        },
    )
    .await;

    pb.finish_and_clear();
    state.set_end_time(now_millis());

    report::print_summary(&state);
    info!(
        "scan finished at {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );

    if let Some(output) = &cli.output {
        if results.is_empty() {
            println!("[*] No findings, skipping output file");
        } else {
            match report::write_text_results(output, &results) {
                Ok(()) => println!("[*] Results saved to {}", output),
                Err(e) => eprintln!("{} {}", "[!]".red(), e),
            }
        }
    }

    if let Some(json) = &cli.json {
        match report::write_json_results(json, &results) {
            Ok(()) => println!("[*] JSON results saved to {}", json),
            Err(e) => eprintln!("{} {}", "[!]".red(), e),
        }
    }
}
