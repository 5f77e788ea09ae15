// File: report.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::getstate::ScanState;
use crate::scanner::DetectionResult;
use anyhow::{Context, Result};
use colored::*;
use std::fs::File;
use std::io::Write;

pub fn print_banner() {
    println!("{}", "=".repeat(72).bright_red());
    let tagline = format!(
        "v{} - HTTP Request Smuggling Detector",
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{}  {}",
        env!("CARGO_PKG_NAME").bright_red().bold(),
        tagline.as_str().bright_white()
    );
    println!("{}", "=".repeat(72).bright_red());
}

pub fn print_usage_hint() {
    println!("\nUsage:");
    println!("  {} -u https://example.com", env!("CARGO_PKG_NAME"));
    println!("  {} -l urls.txt -t 5", env!("CARGO_PKG_NAME"));
    println!("\nRun with --help for the full flag list.");
    println!(
        "\n{}",
        "Warning: This tool sends potentially malicious requests.".bright_yellow()
    );
    println!("   Only use against systems you have permission to test.");
}

pub fn print_finding(result: &DetectionResult) {
    println!(
        "\n{} {}",
        "[POTENTIAL VULNERABILITY]".red().bold(),
        result.url
    );
    println!(
        "  {} Type: {}",
        "├─".green(),
        result.smuggling_type.to_string().yellow()
    );
    println!("  {} Technique: {}", "├─".green(), result.technique);
    if !result.time_diff.is_zero() {
        println!(
            "  {} Time Difference: {:?}",
            "├─".green(),
            result.time_diff
        );
    }
    println!("  {} Details: {}", "└─".green(), result.details);
}

pub fn print_summary(state: &ScanState) {
    println!(
        "\n[*] Scan complete! {} target(s) in {} ms, {} potential vulnerability(ies)",
        state.scanned_targets(),
        state.elapsed_ms(),
        state.findings()
    );

    if state.findings() > 0 {
        println!(
            "\n{}",
            "Note: These are potential vulnerabilities that require manual verification."
                .bright_yellow()
        );
        println!("   Use a dedicated smuggling toolkit to confirm before reporting.");
    }
}

/// One line per finding, pipe-delimited, in aggregate order:
/// `URL | SmugglingType | Technique | Details`.
pub fn write_text_results(path: &str, results: &[DetectionResult]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create output file {}", path))?;

    for result in results {
        writeln!(
            file,
            "{} | {} | {} | {}",
            result.url, result.smuggling_type, result.technique, result.details
        )?;
    }

    Ok(())
}

pub fn write_json_results(path: &str, results: &[DetectionResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)
        .context("Failed to serialize results to JSON")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path))?;
    Ok(())
}
