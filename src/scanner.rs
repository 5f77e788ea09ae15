// File: scanner.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::config::ScannerConfig;
use crate::oracle;
use crate::payload::{self, SmugglingType, TE_OBFUSCATIONS};
use crate::probe::RawSender;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of one (target, smuggling-type) test. Never mutated after the
/// owning test returns. `vulnerable == true` implies `technique` and
/// `details` are non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub url: String,
    pub vulnerable: bool,
    pub smuggling_type: SmugglingType,
    pub technique: String,
    pub time_diff: Duration,
    pub details: String,
}

impl DetectionResult {
    fn negative(url: &str, smuggling_type: SmugglingType) -> Self {
        Self {
            url: url.to_string(),
            vulnerable: false,
            smuggling_type,
            technique: String::new(),
            time_diff: Duration::ZERO,
            details: String::new(),
        }
    }
}

/// Connection coordinates parsed out of a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
}

/// Parses a target URL into host, port and scheme. Only `http` and `https`
/// are probed; anything else is rejected before any connection is opened.
pub fn parse_target(target_url: &str) -> Result<Target, BoxError> {
    let parsed = url::Url::parse(target_url)?;

    let use_tls = match parsed.scheme() {
        "https" => true,
        "http" => false,
        other => return Err(format!("unsupported scheme: {}", other).into()),
    };

    let host = parsed
        .host_str()
        .ok_or("no host in URL")?
        .trim_matches(&['[', ']'][..])
        .to_string();
    let port = parsed
        .port()
        .unwrap_or(if use_tls { 443 } else { 80 });

    Ok(Target {
        host,
        port,
        use_tls,
    })
}

/// Drives the three detection sequences against single targets.
pub struct Scanner {
    config: ScannerConfig,
    sender: RawSender,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        let sender = RawSender::new(config.timeout());
        Self { config, sender }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Runs CL.TE, then TE.CL, then TE.TE against one URL and returns only
    /// the vulnerable findings. A URL that fails to parse aborts the whole
    /// per-target scan with zero results and zero probes.
    pub async fn scan_url(&self, target_url: &str) -> Vec<DetectionResult> {
        let target = match parse_target(target_url) {
            Ok(target) => target,
            Err(e) => {
                debug!("invalid target {}: {}", target_url, e);
                return Vec::new();
            }
        };

        info!("scanning {}", target_url);

        let mut findings = Vec::new();

        let clte = self.test_cl_te(target_url, &target).await;
        if clte.vulnerable {
            findings.push(clte);
        }

        let tecl = self.test_te_cl(target_url, &target).await;
        if tecl.vulnerable {
            findings.push(tecl);
        }

        let tete = self.test_te_te(target_url, &target).await;
        if tete.vulnerable {
            findings.push(tete);
        }

        findings
    }

    pub async fn test_cl_te(&self, target_url: &str, target: &Target) -> DetectionResult {
        self.run_timing_test(
            target_url,
            target,
            SmugglingType::ClTe,
            payload::clte_probe(&target.host),
            "Backend appears to wait for more data (Transfer-Encoding processing)",
        )
        .await
    }

    pub async fn test_te_cl(&self, target_url: &str, target: &Target) -> DetectionResult {
        self.run_timing_test(
            target_url,
            target,
            SmugglingType::TeCl,
            payload::tecl_probe(&target.host),
            "Backend appears to use Content-Length while frontend uses Transfer-Encoding",
        )
        .await
    }

    /// TE.TE: tries the obfuscated spellings in their fixed order and stops
    /// at the first anomalous response. A send error on one variant skips
    /// to the next.
    pub async fn test_te_te(&self, target_url: &str, target: &Target) -> DetectionResult {
        let mut result = DetectionResult::negative(target_url, SmugglingType::TeTe);

        debug!("testing TE.TE obfuscations on {}", target_url);

        for obfuscation in TE_OBFUSCATIONS {
            let probe = payload::tete_probe(&target.host, obfuscation);
            let response = match self
                .sender
                .send(&target.host, target.port, target.use_tls, probe.as_bytes())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    debug!("TE.TE variant failed on {}: {}", target_url, e);
                    continue;
                }
            };

            if oracle::response_matches(&response.raw, self.config.response_signatures()) {
                result.vulnerable = true;
                result.technique = "Response analysis".to_string();
                result.details = format!("TE obfuscation may work: {}", obfuscation);
                return result;
            }
        }

        result
    }

    /// CL.TE and TE.CL share one shape: send the crafted payload, then a
    /// clean baseline on a fresh connection, and compare wall-clock times.
    /// A crafted-send error aborts as not-determined; a baseline error is
    /// tolerated and the diff degrades to the raw crafted time.
    async fn run_timing_test(
        &self,
        target_url: &str,
        target: &Target,
        smuggling_type: SmugglingType,
        probe: String,
        details: &str,
    ) -> DetectionResult {
        let mut result = DetectionResult::negative(target_url, smuggling_type);

        debug!("testing {} on {}", smuggling_type, target_url);

        let crafted = match self
            .sender
            .send(&target.host, target.port, target.use_tls, probe.as_bytes())
            .await
        {
            Ok(response) => response.elapsed,
            Err(e) => {
                debug!("{} probe aborted on {}: {}", smuggling_type, target_url, e);
                return result;
            }
        };

        let baseline_probe = payload::baseline_probe(&target.host);
        let baseline = match self
            .sender
            .send(
                &target.host,
                target.port,
                target.use_tls,
                baseline_probe.as_bytes(),
            )
            .await
        {
            Ok(response) => response.elapsed,
            Err(e) => {
                debug!("baseline probe failed on {}: {}", target_url, e);
                Duration::ZERO
            }
        };

        if let Some(diff) = oracle::timing_delta(crafted, baseline, self.config.timing_threshold())
        {
            result.vulnerable = true;
            result.technique = "Time-based detection".to_string();
            result.time_diff = diff;
            result.details = details.to_string();
        }

        result
    }
}

/// Fans one task per target out over a counting gate of size `concurrency`.
///
/// Tasks hand their findings to a single consumer over a channel; the
/// consumer invokes `on_target_complete` for each finished target (findings
/// may arrive in any order) and owns the aggregate, so no lock is needed.
/// The channel closing once every sender has dropped is the join barrier:
/// the aggregate is only returned after all tasks signalled completion.
pub async fn run_batch<F>(
    scanner: Arc<Scanner>,
    targets: Vec<String>,
    concurrency: usize,
    mut on_target_complete: F,
) -> Vec<DetectionResult>
where
    F: FnMut(&str, &[DetectionResult]),
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel();

    for target_url in targets {
        let scanner = Arc::clone(&scanner);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let _permit = semaphore.acquire().await.unwrap();
            let findings = scanner.scan_url(&target_url).await;
            let _ = tx.send((target_url, findings));
        });
    }
    drop(tx);

    let mut all_results = Vec::new();
    while let Some((target_url, findings)) = rx.recv().await {
        on_target_complete(&target_url, &findings);
        all_results.extend(findings);
    }

    all_results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_https_defaults() {
        let target = parse_target("https://example.com/path").unwrap();
        assert_eq!(
            target,
            Target {
                host: "example.com".to_string(),
                port: 443,
                use_tls: true,
            }
        );
    }

    #[test]
    fn test_parse_target_http_defaults() {
        let target = parse_target("http://example.com").unwrap();
        assert_eq!(target.port, 80);
        assert!(!target.use_tls);
    }

    #[test]
    fn test_parse_target_explicit_port() {
        let target = parse_target("http://test.com:8080").unwrap();
        assert_eq!(target.host, "test.com");
        assert_eq!(target.port, 8080);
    }

    #[test]
    fn test_parse_target_rejects_non_http_schemes() {
        assert!(parse_target("ftp://bad").is_err());
        assert!(parse_target("gopher://example.com").is_err());
    }

    #[test]
    fn test_parse_target_rejects_garbage() {
        assert!(parse_target("not a url at all").is_err());
        assert!(parse_target("").is_err());
        assert!(parse_target("http://").is_err());
    }

    #[test]
    fn test_negative_result_shape() {
        let result = DetectionResult::negative("http://example.com", SmugglingType::ClTe);
        assert!(!result.vulnerable);
        assert!(result.technique.is_empty());
        assert!(result.details.is_empty());
        assert_eq!(result.time_diff, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_scan_url_with_invalid_url_sends_nothing() {
        let scanner = Scanner::new(ScannerConfig::new());
        assert!(scanner.scan_url("ftp://bad").await.is_empty());
        assert!(scanner.scan_url(":::::").await.is_empty());
    }
}
