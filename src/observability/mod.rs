// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Every diagnostic the pipeline emits is a small struct in [`messages`] that
//! implements `Display` (the human-readable text) and
//! [`messages::StructuredLog`] (the `tracing` event with structured fields and
//! the level the event belongs to).
//!
//! # Usage
//!
//! ```rust
//! use the_sluice::observability::messages::StructuredLog;
//! use the_sluice::observability::messages::module::UnusedParameters;
//!
//! let unused = vec!["b".to_string()];
//! UnusedParameters { module: "Observer", parameters: &unused }.log();
//! ```
//!
//! Logging is purely diagnostic. No scheduling decision depends on whether a
//! subscriber is installed or what it does with the events.

pub mod messages;
