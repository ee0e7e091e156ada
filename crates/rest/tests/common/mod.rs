//! Common test utilities for search gateway testing.
//!
//! - [`harness`] - Gateway test harness
//! - [`stub_sru`] - Stub SRU backend on an ephemeral port
//! - [`stub_format`] - Stub formatting service on an ephemeral port
//! - [`formatter`] - Scriptable record formatter
//! - [`fixtures`] - SRU response and MARC record builders
//! - [`assertions`] - HTTP response assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod formatter;
pub mod harness;
pub mod stub_format;
pub mod stub_sru;
