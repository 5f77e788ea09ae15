// File: getstate.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

/// Wall-clock and counter bookkeeping for one scan run.
#[derive(Debug, Clone, Copy)]
pub struct ScanState {
    total_targets: u64,
    scanned_targets: u64,
    findings: u64,
    start_time: u64,
    end_time: u64,
}

impl ScanState {
    pub fn new() -> ScanState {
        ScanState {
            total_targets: 0,
            scanned_targets: 0,
            findings: 0,
            start_time: 0,
            end_time: 0,
        }
    }

    pub fn add_scanned(&mut self) {
        self.scanned_targets += 1;
    }

    pub fn add_findings(&mut self, count: u64) {
        self.findings += count;
    }

    pub fn total_targets(&self) -> u64 {
        self.total_targets
    }

    pub fn set_total_targets(&mut self, total_targets: u64) {
        self.total_targets = total_targets;
    }

    pub fn scanned_targets(&self) -> u64 {
        self.scanned_targets
    }

    pub fn findings(&self) -> u64 {
        self.findings
    }

    pub fn set_start_time(&mut self, start_time: u64) {
        self.start_time = start_time;
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn set_end_time(&mut self, end_time: u64) {
        self.end_time = end_time;
    }

    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.end_time.saturating_sub(self.start_time)
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}
