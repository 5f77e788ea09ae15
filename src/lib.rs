// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]

pub mod cli;
pub mod config;
pub mod getstate;
pub mod oracle;
pub mod payload;
pub mod probe;
pub mod report;
pub mod scanner;
