// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `blob` - record access failures
//! * `config` - module configuration file handling
//! * `engine` - drain lifecycle, scheduling decisions and interrupts
//! * `module` - attachment and parameter auditing
//! * `services` - service registration and requirement checks
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_sluice::observability::messages::StructuredLog;
//! use the_sluice::observability::messages::engine::DrainStarted;
//!
//! DrainStarted { module_count: 3, max_cycles: Some(10) }.log();
//! ```

use tracing::Span;

pub mod blob;
pub mod config;
pub mod engine;
pub mod module;
pub mod services;

/// A message that knows how to emit itself as a `tracing` event.
pub trait StructuredLog {
    /// Emit the event at the level documented on the message type.
    fn log(&self);

    /// A span scoped to this message, for messages that open a unit of work.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
