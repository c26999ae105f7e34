// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The pipeline: attaches stages and drains blobs through them.
//!
//! # Execution model
//!
//! Stages run strictly one after the other in attach order; cycles run one
//! after the other. Every cycle starts with an empty blob. For each stage:
//!
//! 1. if an earlier full-blob stage returned [`Flow::Stopped`], the stage is skipped;
//! 2. if any of its `only_if` keys is absent, it is skipped;
//! 3. if the 1-based cycle index is not a multiple of `every`, it is skipped;
//! 4. it receives the full blob, or only the present `blob_keys` when set;
//! 5. a full-blob stage's result replaces the blob, a projected stage's result
//!    is merged into it (and a projected [`Flow::Stopped`] changes nothing).
//!
//! The loop ends at a cycle boundary when an interrupt was requested or the
//! cycle limit is reached, or as soon as a stage returns [`Flow::Exhausted`]
//! (the partial cycle is then not counted). [`Pipeline::finish`] runs last.
//!
//! # Example
//! ```rust
//! use the_sluice::blob::Blob;
//! use the_sluice::config::Attach;
//! use the_sluice::engine::Pipeline;
//! use the_sluice::modules::CyclePump;
//! use the_sluice::traits::Flow;
//!
//! # fn main() -> the_sluice::errors::Result<()> {
//! let mut pipeline = Pipeline::new();
//! pipeline.attach(CyclePump::default(), Attach::named("pump"))?;
//! pipeline.attach_fn(
//!     |mut blob: Blob| {
//!         let cycle = *blob.get::<usize>("cycle")?;
//!         blob.insert("square", cycle * cycle);
//!         Ok(Flow::Continue(blob))
//!     },
//!     Attach::named("square").blob_keys(["cycle"]),
//! )?;
//!
//! pipeline.drain(Some(4))?;
//! assert_eq!(pipeline.cycle_count(), 4);
//! assert!(pipeline.is_finished());
//! # Ok(())
//! # }
//! ```

use std::any::type_name;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::blob::Blob;
use crate::config::consts::{MODULE_CONFIGURATION, STATS_LIMIT};
use crate::config::{Attach, ModuleConfig, ModuleConfiguration, Parameters};
use crate::engine::interrupt::{self, InterruptHandle, InterruptListener};
use crate::engine::schedule::Schedule;
use crate::engine::stage::{FunctionStage, ModuleStage, Stage, StageKind};
use crate::engine::statistics::{StageTimings, TimingHistory, TimingReport};
use crate::errors::{PipelineError, Result};
use crate::observability::messages::engine::{
    AlreadyFinished, CycleLimitReached, CycleStarted, DrainInterrupted, DrainStarted,
    FinishingModule, FunctionModuleNotFinished, InterruptListenerUnavailable, ModuleSkipped, PipelineFinished, PreparingModule,
    ProcessingModule, SkipReason, SourceExhausted, StageFailed, TrappingInterrupts,
};
use crate::observability::messages::module::{
    ApplyingModuleConfiguration, ModuleAttached, UnusedParameters,
};
use crate::observability::messages::services::{
    MissingServices, ServiceRegistered, ServiceRequirementUnmet,
};
use crate::observability::messages::StructuredLog;
use crate::services::ServiceRegistry;
use crate::tools::{peak_memory_usage, Stopwatch, Timer};
use crate::traits::{Flow, Module};

/// An attached stage with the scheduling decided at attach time.
struct AttachedStage {
    name: String,
    stage: Box<dyn Stage>,
    schedule: Schedule,
    timings: StageTimings,
}

enum CycleOutcome {
    Completed,
    Exhausted,
}

/// A sequence of stages drained cycle by cycle.
pub struct Pipeline {
    stages: Vec<AttachedStage>,
    services: ServiceRegistry,
    required_services: BTreeMap<String, String>,
    configuration: ModuleConfiguration,
    timeit: bool,
    stats_limit: usize,
    trap_interrupts: bool,
    interrupt: InterruptHandle,
    cycle_count: usize,
    cycle_timings: TimingHistory,
    started: Stopwatch,
    init_timer: Timer,
    finished: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// A pipeline without a module configuration file.
    pub fn new() -> Self {
        Self::with_settings(ModuleConfiguration::default(), false, STATS_LIMIT, true)
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    fn with_settings(
        configuration: ModuleConfiguration,
        timeit: bool,
        stats_limit: usize,
        trap_interrupts: bool,
    ) -> Self {
        let mut init_timer = Timer::new("Pipeline and module initialisation");
        init_timer.start();
        Self {
            stages: Vec::new(),
            services: ServiceRegistry::new(),
            required_services: BTreeMap::new(),
            configuration,
            timeit,
            stats_limit,
            trap_interrupts,
            interrupt: InterruptHandle::new(),
            cycle_count: 0,
            cycle_timings: TimingHistory::new(stats_limit),
            started: Stopwatch::start(),
            init_timer,
            finished: false,
        }
    }

    /// Attach a structured module.
    ///
    /// The module is named after its type unless `options` names it.
    /// Configuration file values for that name override the values in
    /// `options`. [`Module::configure`] runs before this returns and
    /// parameters it never read are reported in a single warning.
    pub fn attach<M: Module>(&mut self, mut module: M, options: Attach) -> Result<()> {
        let module_type = short_type_name::<M>();
        let (name, parameters) = self.prepare_attach(options, module_type, StageKind::Module)?;
        let schedule = Schedule::from_parameters(&name, &parameters)?;

        let mut config = ModuleConfig::new(
            name.as_str(),
            module_type,
            parameters,
            self.services.clone(),
        );
        module.configure(&mut config)?;
        report_unused(&name, config.unused_parameters());

        let (provided, required) = config.into_declarations();
        for (service, instance) in provided {
            ServiceRegistered {
                name: &service,
                provider: &name,
            }
            .log();
            self.services.register_shared(service, instance);
        }
        self.required_services.extend(required);

        self.push(name, Box::new(ModuleStage::new(module)), schedule);
        Ok(())
    }

    /// Attach a bare function. It has no configuration hook, so every
    /// non-scheduling parameter given for it is reported as unused.
    pub fn attach_fn<F>(&mut self, function: F, options: Attach) -> Result<()>
    where
        F: FnMut(Blob) -> Result<Flow> + 'static,
    {
        let (name, parameters) =
            self.prepare_attach(options, short_type_name::<F>(), StageKind::Function)?;
        let schedule = Schedule::from_parameters(&name, &parameters)?;
        report_unused(&name, parameters.unused());

        self.push(name, Box::new(FunctionStage::new(function)), schedule);
        Ok(())
    }

    fn prepare_attach(
        &self,
        options: Attach,
        default_name: &str,
        kind: StageKind,
    ) -> Result<(String, Parameters)> {
        let (name, mut parameters) = options.into_parts();
        let name = name.unwrap_or_else(|| default_name.to_string());
        if self.stages.iter().any(|attached| attached.name == name) {
            return Err(PipelineError::DuplicateModuleName { name });
        }

        ModuleAttached {
            module: &name,
            kind: kind.as_str(),
        }
        .log();
        if let Some(overrides) = self.configuration.section(&name) {
            ApplyingModuleConfiguration { module: &name }.log();
            parameters.apply_overrides(&name, overrides);
        }
        Ok((name, parameters))
    }

    fn push(&mut self, name: String, stage: Box<dyn Stage>, schedule: Schedule) {
        self.stages.push(AttachedStage {
            name,
            stage,
            schedule,
            timings: StageTimings::new(self.stats_limit),
        });
    }

    /// Run cycles until `max_cycles` completed (unbounded when `None`), an
    /// interrupt was requested or a stage returned [`Flow::Exhausted`], then
    /// [`finish`](Pipeline::finish).
    ///
    /// When a required service is missing nothing is prepared or processed
    /// and the pipeline finishes right away. A pipeline that already finished
    /// is not drained again and an empty blob is returned.
    pub fn drain(&mut self, max_cycles: Option<usize>) -> Result<Blob> {
        if self.finished {
            AlreadyFinished {
                cycles: self.cycle_count,
            }
            .log();
            return Ok(Blob::new());
        }
        self.init_timer.stop();

        let missing = self.services.missing(self.required_services.keys());
        if !missing.is_empty() {
            MissingServices { missing: &missing }.log();
            for name in &missing {
                let reason = self.required_services.get(name).map_or("", String::as_str);
                ServiceRequirementUnmet { name, reason }.log();
            }
            return self.finish();
        }

        for attached in &mut self.stages {
            PreparingModule {
                module: &attached.name,
            }
            .log();
            attached
                .stage
                .prepare()
                .map_err(|err| stage_failed(&attached.name, "prepare", err))?;
        }

        let started = DrainStarted {
            module_count: self.stages.len(),
            max_cycles,
        };
        started.log();
        let _listener = self.listen_for_interrupts();

        {
            let span = started.span("drain");
            let _entered = span.enter();
            loop {
                if self.interrupt.stop_requested() {
                    DrainInterrupted {
                        cycles: self.cycle_count,
                    }
                    .log();
                    break;
                }
                if let Some(limit) = max_cycles {
                    if self.cycle_count >= limit {
                        CycleLimitReached {
                            cycles: self.cycle_count,
                        }
                        .log();
                        break;
                    }
                }
                match self.run_cycle()? {
                    CycleOutcome::Completed => {}
                    CycleOutcome::Exhausted => break,
                }
            }
        }

        self.finish()
    }

    fn listen_for_interrupts(&self) -> Option<InterruptListener> {
        if !self.trap_interrupts {
            return None;
        }
        TrappingInterrupts.log();
        match interrupt::install(&self.interrupt) {
            Ok(listener) => Some(listener),
            Err(error) => {
                InterruptListenerUnavailable { error: &error }.log();
                None
            }
        }
    }

    fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let cycle = self.cycle_count;
        let cycle_started = CycleStarted { cycle };
        let span = cycle_started.span("cycle");
        let _entered = span.enter();
        cycle_started.log();

        let stopwatch = Stopwatch::start();
        let mut current = Some(Blob::new());

        for attached in self.stages.iter_mut() {
            let name = attached.name.as_str();
            let Some(blob) = current.as_mut() else {
                ModuleSkipped {
                    module: name,
                    reason: SkipReason::Stopped,
                }
                .log();
                continue;
            };

            let missing = attached.schedule.missing_keys(blob);
            if !missing.is_empty() {
                ModuleSkipped {
                    module: name,
                    reason: SkipReason::MissingKeys(&missing),
                }
                .log();
                continue;
            }
            if !attached.schedule.is_due(cycle) {
                ModuleSkipped {
                    module: name,
                    reason: SkipReason::Cadence(attached.schedule.every()),
                }
                .log();
                continue;
            }

            let projected = attached.schedule.blob_keys().is_some();
            ProcessingModule {
                module: name,
                projected,
            }
            .log();
            let view = match attached.schedule.blob_keys() {
                Some(keys) => blob.project(keys),
                None => std::mem::take(blob),
            };

            let invocation = Stopwatch::start();
            let flow = attached
                .stage
                .invoke(view)
                .map_err(|err| stage_failed(name, "process", err))?;
            if self.timeit || attached.schedule.timeit() {
                attached.timings.process.record(invocation.elapsed());
            }

            match flow {
                Flow::Exhausted => {
                    SourceExhausted {
                        module: name,
                        cycle,
                    }
                    .log();
                    return Ok(CycleOutcome::Exhausted);
                }
                Flow::Continue(result) if projected => {
                    if let Some(blob) = current.as_mut() {
                        blob.merge(result);
                    }
                }
                Flow::Stopped if projected => {}
                Flow::Continue(result) => current = Some(result),
                Flow::Stopped => current = None,
            }
        }

        self.cycle_timings.record(stopwatch.elapsed());
        self.cycle_count += 1;
        Ok(CycleOutcome::Completed)
    }

    /// Call every module's finalization hook in attach order and print the
    /// timing statistics.
    ///
    /// Returns the closing blob: each module's result under its name. Only
    /// the first call does anything.
    pub fn finish(&mut self) -> Result<Blob> {
        let mut closing = Blob::new();
        if self.finished {
            return Ok(closing);
        }

        for attached in &mut self.stages {
            if attached.stage.kind() == StageKind::Function {
                FunctionModuleNotFinished {
                    module: &attached.name,
                }
                .log();
                continue;
            }
            let finishing = FinishingModule {
                module: &attached.name,
            };
            let span = finishing.span("finish");
            let _entered = span.enter();
            finishing.log();

            let stopwatch = Stopwatch::start();
            let result = attached
                .stage
                .finalize()
                .map_err(|err| stage_failed(&attached.name, "finish", err))?;
            attached.timings.finish = stopwatch.elapsed();
            closing.insert(attached.name.as_str(), result);
        }
        self.finished = true;

        if self.cycle_count > 0 {
            println!("{}", self.timing_report());
        }
        PipelineFinished {
            cycles: self.cycle_count,
            interrupted: self.was_interrupted(),
        }
        .log();
        Ok(closing)
    }

    /// Timing statistics gathered so far.
    pub fn timing_report(&self) -> TimingReport<'_> {
        TimingReport {
            cycles: self.cycle_count,
            overall: self.started.elapsed(),
            peak_memory_mb: peak_memory_usage(),
            cycle_timings: &self.cycle_timings,
            stages: self
                .stages
                .iter()
                .filter(|attached| self.timeit || attached.schedule.timeit())
                .map(|attached| (attached.name.as_str(), &attached.timings))
                .collect(),
        }
    }

    /// Names of the attached stages in attach order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|attached| attached.name.as_str())
    }

    /// The schedule of the stage attached as `name`.
    pub fn schedule(&self, name: &str) -> Option<&Schedule> {
        self.stages
            .iter()
            .find(|attached| attached.name == name)
            .map(|attached| &attached.schedule)
    }

    /// Completed cycles.
    pub fn cycle_count(&self) -> usize {
        self.cycle_count
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupt.stop_requested()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The registry shared by all attached modules.
    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Handle to request a stop from elsewhere, e.g. another thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("modules", &self.module_names().collect::<Vec<_>>())
            .field("cycle_count", &self.cycle_count)
            .field("finished", &self.finished)
            .finish()
    }
}

/// Builds a [`Pipeline`] with non-default settings.
///
/// Without an explicit configuration the builder reads `pipeline.toml` from
/// the working directory if there is one.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    timeit: bool,
    stats_limit: Option<usize>,
    config_file: Option<PathBuf>,
    configuration: Option<ModuleConfiguration>,
    trap_interrupts: Option<bool>,
}

impl PipelineBuilder {
    /// Time every stage, not only those attached with `timeit`.
    pub fn timeit(mut self, timeit: bool) -> Self {
        self.timeit = timeit;
        self
    }

    /// Number of most recent invocations kept for statistics.
    pub fn stats_limit(mut self, limit: usize) -> Self {
        self.stats_limit = Some(limit);
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Use an already loaded configuration; takes precedence over
    /// [`config_file`](PipelineBuilder::config_file).
    pub fn configuration(mut self, configuration: ModuleConfiguration) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Whether draining listens for Ctrl+C. On by default. The previous SIGINT
    /// disposition is restored when `drain` returns.
    pub fn trap_interrupts(mut self, trap: bool) -> Self {
        self.trap_interrupts = Some(trap);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let configuration = match (self.configuration, self.config_file) {
            (Some(configuration), _) => configuration,
            (None, Some(path)) => ModuleConfiguration::from_path(path)?,
            (None, None) if Path::new(MODULE_CONFIGURATION).is_file() => {
                ModuleConfiguration::from_path(MODULE_CONFIGURATION)?
            }
            (None, None) => ModuleConfiguration::default(),
        };
        Ok(Pipeline::with_settings(
            configuration,
            self.timeit,
            self.stats_limit.unwrap_or(STATS_LIMIT),
            self.trap_interrupts.unwrap_or(true),
        ))
    }
}

fn report_unused(module: &str, unused: Vec<String>) {
    if !unused.is_empty() {
        UnusedParameters {
            module,
            parameters: &unused,
        }
        .log();
    }
}

fn stage_failed(module: &str, hook: &str, err: PipelineError) -> PipelineError {
    StageFailed {
        module,
        hook,
        error: &err,
    }
    .log();
    err
}

/// Last path segment of a type name without generic arguments; closures are
/// named after the function defining them.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl Module for Plain {}

    #[test]
    fn type_names_are_shortened() {
        assert_eq!(short_type_name::<Plain>(), "Plain");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        let closure = |blob: Blob| -> Result<Flow> { Ok(Flow::Continue(blob)) };
        fn name_of<F>(_: &F) -> &'static str {
            short_type_name::<F>()
        }
        assert_eq!(name_of(&closure), "type_names_are_shortened");
    }

    #[test]
    fn builder_applies_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[Plain]\nevery = 2\n").unwrap();

        let mut pipeline = Pipeline::builder()
            .config_file(&path)
            .timeit(true)
            .stats_limit(5)
            .trap_interrupts(false)
            .build()
            .unwrap();
        pipeline.attach(Plain, Attach::new()).unwrap();

        assert_eq!(pipeline.schedule("Plain").unwrap().every(), 2);
        assert!(pipeline.timeit);
        assert_eq!(pipeline.stats_limit, 5);
        assert!(!pipeline.trap_interrupts);
    }

    #[test]
    fn missing_config_file_fails_the_build() {
        let err = Pipeline::builder()
            .config_file("/nonexistent/sluice.toml")
            .build()
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
