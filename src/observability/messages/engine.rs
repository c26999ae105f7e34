// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the drain lifecycle and per-cycle scheduling decisions.
//!
//! This module contains message types for logging events related to:
//! * Drain start, preparation and completion
//! * Stage skipping (stopped cycle, unmet condition, cadence)
//! * Stage failures
//! * Interrupt handling
//! * Finalization

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Drain started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_sluice::observability::messages::engine::DrainStarted;
///
/// let msg = DrainStarted { module_count: 3, max_cycles: None };
/// assert_eq!(msg.to_string(), "Now draining 3 modules (no cycle limit)");
/// ```
pub struct DrainStarted {
    pub module_count: usize,
    pub max_cycles: Option<usize>,
}

impl Display for DrainStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.max_cycles {
            Some(limit) => write!(
                f,
                "Now draining {} modules for at most {} cycles",
                self.module_count, limit
            ),
            None => write!(
                f,
                "Now draining {} modules (no cycle limit)",
                self.module_count
            ),
        }
    }
}

impl StructuredLog for DrainStarted {
    fn log(&self) {
        tracing::info!(
            module_count = self.module_count,
            max_cycles = ?self.max_cycles,
            "{}", self
        );
        if self.max_cycles.is_none() {
            tracing::info!("No cycle count, the pipeline may be drained forever.");
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "drain",
            span_name = name,
            module_count = self.module_count,
            max_cycles = ?self.max_cycles,
        )
    }
}

/// A module's `prepare` hook is about to run.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PreparingModule<'a> {
    pub module: &'a str,
}

impl Display for PreparingModule<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Preparing {}", self.module)
    }
}

impl StructuredLog for PreparingModule<'_> {
    fn log(&self) {
        tracing::info!(module = self.module, "{}", self);
    }
}

/// Ctrl+C is trapped from now on.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TrappingInterrupts;

impl Display for TrappingInterrupts {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Trapping CTRL+C and starting to drain.")
    }
}

impl StructuredLog for TrappingInterrupts {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}

/// A new cycle starts.
///
/// # Log Level
/// `debug!` - Per-cycle detail
pub struct CycleStarted {
    pub cycle: usize,
}

impl Display for CycleStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pumping blob #{}", self.cycle)
    }
}

impl StructuredLog for CycleStarted {
    fn log(&self) {
        tracing::debug!(cycle = self.cycle, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("cycle", span_name = name, cycle = self.cycle)
    }
}

/// Why a stage did not run in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason<'a> {
    /// An earlier full-blob stage returned nothing.
    Stopped,
    /// Some of the `only_if` keys are absent.
    MissingKeys(&'a [String]),
    /// The cycle is not a multiple of `every`.
    Cadence(u64),
}

impl Display for SkipReason<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            SkipReason::Stopped => write!(f, "due to empty blob"),
            SkipReason::MissingKeys(keys) => {
                write!(f, "due to missing required keys [{}]", keys.join(", "))
            }
            SkipReason::Cadence(every) => write!(f, "(every {} iterations)", every),
        }
    }
}

/// A stage was skipped for this cycle.
///
/// # Log Level
/// `debug!` - Per-cycle detail
///
/// # Example
/// ```
/// use the_sluice::observability::messages::engine::{ModuleSkipped, SkipReason};
///
/// let msg = ModuleSkipped { module: "printer", reason: SkipReason::Cadence(3) };
/// assert_eq!(msg.to_string(), "Skipping printer (every 3 iterations).");
/// ```
pub struct ModuleSkipped<'a> {
    pub module: &'a str,
    pub reason: SkipReason<'a>,
}

impl Display for ModuleSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping {} {}.", self.module, self.reason)
    }
}

impl StructuredLog for ModuleSkipped<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, reason = %self.reason, "{}", self);
    }
}

/// A stage is about to be invoked.
///
/// # Log Level
/// `debug!` - Per-cycle detail
pub struct ProcessingModule<'a> {
    pub module: &'a str,
    pub projected: bool,
}

impl Display for ProcessingModule<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processing {}", self.module)
    }
}

impl StructuredLog for ProcessingModule<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, projected = self.projected, "{}", self);
    }
}

/// A stage hook returned an error, which is about to propagate.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StageFailed<'a> {
    pub module: &'a str,
    pub hook: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' failed in {}: {}",
            self.module, self.hook, self.error
        )
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            module = self.module,
            hook = self.hook,
            error = %self.error,
            "{}", self
        );
    }
}

/// A source stage reported it has nothing left.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SourceExhausted<'a> {
    pub module: &'a str,
    pub cycle: usize,
}

impl Display for SourceExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Nothing left to pump through ({} exhausted at cycle {}).",
            self.module, self.cycle
        )
    }
}

impl StructuredLog for SourceExhausted<'_> {
    fn log(&self) {
        tracing::info!(module = self.module, cycle = self.cycle, "{}", self);
    }
}

/// The requested number of cycles has been drained.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CycleLimitReached {
    pub cycles: usize,
}

impl Display for CycleLimitReached {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cycle limit of {} reached.", self.cycles)
    }
}

impl StructuredLog for CycleLimitReached {
    fn log(&self) {
        tracing::info!(cycles = self.cycles, "{}", self);
    }
}

/// A stop was requested; the drain ends at this cycle boundary.
///
/// # Log Level
/// `warn!` - Degraded operation, the cycle limit was not reached
pub struct DrainInterrupted {
    pub cycles: usize,
}

impl Display for DrainInterrupted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Interrupted after {} cycles, finishing modules.", self.cycles)
    }
}

impl StructuredLog for DrainInterrupted {
    fn log(&self) {
        tracing::warn!(cycles = self.cycles, "{}", self);
    }
}

/// `drain` was called on a pipeline whose modules were already finished.
///
/// # Log Level
/// `warn!` - Nothing is prepared or processed
pub struct AlreadyFinished {
    pub cycles: usize,
}

impl Display for AlreadyFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline already finished after {} cycles, not draining again.",
            self.cycles
        )
    }
}

impl StructuredLog for AlreadyFinished {
    fn log(&self) {
        tracing::warn!(cycles = self.cycles, "{}", self);
    }
}

/// The interrupt listener could not be installed.
///
/// # Log Level
/// `warn!` - Degraded operation, draining continues without Ctrl+C handling
pub struct InterruptListenerUnavailable<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for InterruptListenerUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unable to trap CTRL+C: {}", self.error)
    }
}

impl StructuredLog for InterruptListenerUnavailable<'_> {
    fn log(&self) {
        tracing::warn!(error = %self.error, "{}", self);
    }
}

/// A module's finalization hook is about to run.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FinishingModule<'a> {
    pub module: &'a str,
}

impl Display for FinishingModule<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Finishing {}", self.module)
    }
}

impl StructuredLog for FinishingModule<'_> {
    fn log(&self) {
        tracing::info!(module = self.module, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("finish", span_name = name, module = self.module)
    }
}

/// Function stages have no finalization hook.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FunctionModuleNotFinished<'a> {
    pub module: &'a str,
}

impl Display for FunctionModuleNotFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping function module {}", self.module)
    }
}

impl StructuredLog for FunctionModuleNotFinished<'_> {
    fn log(&self) {
        tracing::info!(module = self.module, "{}", self);
    }
}

/// The pipeline has been finalized.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineFinished {
    pub cycles: usize,
    pub interrupted: bool,
}

impl Display for PipelineFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline finished after {} cycles", self.cycles)?;
        if self.interrupted {
            write!(f, " (interrupted)")?;
        }
        Ok(())
    }
}

impl StructuredLog for PipelineFinished {
    fn log(&self) {
        tracing::info!(
            cycles = self.cycles,
            interrupted = self.interrupted,
            "{}", self
        );
    }
}
