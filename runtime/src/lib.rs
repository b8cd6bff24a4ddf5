// Copyright 2026 Brand Audit Contributors
// SPDX-License-Identifier: Apache-2.0

//! Brand audit runtime — acquires a website, analyzes its structure, scores
//! it with an external model or the synthetic scorer, and stores audits.
//!
//! The scoring core lives in the `brand-audit` crate; this crate supplies
//! the I/O around it.

pub mod acquisition;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod renderer;
pub mod scoring;
pub mod store;

pub use pipeline::{compare_audits, parse_target, AuditOptions, Auditor};
