// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::time::Duration;

/// Scanner-wide settings, built once before the scan and shared read-only
/// by every concurrent task.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    timeout: Duration,
    verbose: bool,
    timing_threshold: Duration,
    response_signatures: Vec<String>,
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            verbose: false,
            timing_threshold: Duration::from_secs(5),
            response_signatures: vec![
                "400".to_string(),
                "Unrecognized method GPOST".to_string(),
            ],
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn timing_threshold(&self) -> Duration {
        self.timing_threshold
    }

    pub fn set_timing_threshold(&mut self, threshold: Duration) {
        self.timing_threshold = threshold;
    }

    pub fn response_signatures(&self) -> &[String] {
        &self.response_signatures
    }

    pub fn set_response_signatures(&mut self, signatures: Vec<String>) {
        self.response_signatures = signatures;
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::new()
    }
}
