//! Incidentbot Core - Shared types library.
//!
//! This crate provides the common types used across incidentbot components:
//! - `bot` - The Slack-facing service binary
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Incident records, severity levels, states, and type-safe
//!   identifiers for channels and users

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
