// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Uniform invocation interface over structured modules and bare functions.

use crate::blob::Blob;
use crate::errors::Result;
use crate::traits::{Flow, Module};

/// What kind of attach target a stage wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// A [`Module`] with the full lifecycle.
    Module,
    /// A bare function; it has no preparation or finalization hooks.
    Function,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Module => "module",
            StageKind::Function => "function",
        }
    }
}

/// Capability interface the scheduler drives.
pub trait Stage {
    fn kind(&self) -> StageKind;

    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn invoke(&mut self, blob: Blob) -> Result<Flow>;

    /// Only called for [`StageKind::Module`] stages.
    fn finalize(&mut self) -> Result<Blob> {
        Ok(Blob::new())
    }
}

/// Adapter for structured modules.
pub struct ModuleStage<M> {
    module: M,
}

impl<M: Module> ModuleStage<M> {
    pub fn new(module: M) -> Self {
        Self { module }
    }
}

impl<M: Module> Stage for ModuleStage<M> {
    fn kind(&self) -> StageKind {
        StageKind::Module
    }

    fn prepare(&mut self) -> Result<()> {
        self.module.prepare()
    }

    fn invoke(&mut self, blob: Blob) -> Result<Flow> {
        self.module.process(blob)
    }

    fn finalize(&mut self) -> Result<Blob> {
        self.module.pre_finish()
    }
}

/// Adapter for bare functions and closures.
pub struct FunctionStage<F> {
    function: F,
}

impl<F> FunctionStage<F>
where
    F: FnMut(Blob) -> Result<Flow>,
{
    pub fn new(function: F) -> Self {
        Self { function }
    }
}

impl<F> Stage for FunctionStage<F>
where
    F: FnMut(Blob) -> Result<Flow>,
{
    fn kind(&self) -> StageKind {
        StageKind::Function
    }

    fn invoke(&mut self, blob: Blob) -> Result<Flow> {
        (self.function)(blob)
    }
}
