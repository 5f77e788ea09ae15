// File: oracle.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::time::Duration;

/// Timing verdict for CL.TE and TE.CL probes.
///
/// Returns the crafted-minus-baseline delta when the crafted request took
/// strictly longer than `threshold` over the baseline, `None` otherwise.
/// The threshold absorbs ordinary network jitter while still catching a
/// back-end blocked waiting for more body bytes.
pub fn timing_delta(
    crafted: Duration,
    baseline: Duration,
    threshold: Duration,
) -> Option<Duration> {
    crafted
        .checked_sub(baseline)
        .filter(|diff| *diff > threshold)
}

/// Response verdict for TE.TE probes: a raw response is anomalous when it
/// carries any of the configured literal signatures.
pub fn response_matches(response: &str, signatures: &[String]) -> bool {
    signatures.iter().any(|sig| response.contains(sig.as_str()))
}
