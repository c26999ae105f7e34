// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::blob::Blob;
use crate::config::ModuleConfig;
use crate::errors::Result;

/// What a stage hands back to the pipeline after processing a blob.
#[derive(Debug, Clone)]
pub enum Flow {
    /// The resulting blob. For a full-blob stage it replaces the pipeline's
    /// blob; for a projected stage its keys are merged back.
    Continue(Blob),
    /// Nothing to pass on. A full-blob stage returning this skips every later
    /// stage of the current cycle; for a projected stage it is ignored.
    Stopped,
    /// The source has nothing left. The rest of the cycle is abandoned and the
    /// pipeline proceeds to finalization.
    Exhausted,
}

impl Flow {
    pub fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue(_))
    }

    /// The carried blob, if any.
    pub fn into_blob(self) -> Option<Blob> {
        match self {
            Flow::Continue(blob) => Some(blob),
            Flow::Stopped | Flow::Exhausted => None,
        }
    }
}

impl From<Blob> for Flow {
    fn from(blob: Blob) -> Self {
        Flow::Continue(blob)
    }
}

impl From<Option<Blob>> for Flow {
    fn from(blob: Option<Blob>) -> Self {
        blob.map_or(Flow::Stopped, Flow::Continue)
    }
}

/// A structured pipeline stage.
///
/// The pipeline calls the hooks in this order: [`configure`](Module::configure)
/// once while attaching, [`prepare`](Module::prepare) once before the first
/// cycle, [`process`](Module::process) once per eligible cycle and
/// [`pre_finish`](Module::pre_finish) once at shutdown, even when no cycle ran.
///
/// ```rust
/// use the_sluice::blob::Blob;
/// use the_sluice::config::ModuleConfig;
/// use the_sluice::errors::Result;
/// use the_sluice::traits::{Flow, Module};
///
/// #[derive(Default)]
/// struct Scale {
///     factor: f64,
/// }
///
/// impl Module for Scale {
///     fn configure(&mut self, config: &mut ModuleConfig) -> Result<()> {
///         self.factor = config.get_or("factor", 1.0)?;
///         Ok(())
///     }
///
///     fn process(&mut self, mut blob: Blob) -> Result<Flow> {
///         let energy = *blob.get::<f64>("energy")?;
///         blob.insert("scaled", energy * self.factor);
///         Ok(Flow::Continue(blob))
///     }
/// }
/// ```
pub trait Module: 'static {
    /// Pull parameters into typed fields and declare services. Runs during
    /// attachment, before the unused-parameter audit.
    fn configure(&mut self, _config: &mut ModuleConfig) -> Result<()> {
        Ok(())
    }

    /// Executed after every module is attached and before the first cycle.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    /// Knead the blob and return it.
    fn process(&mut self, blob: Blob) -> Result<Flow> {
        Ok(Flow::Continue(blob))
    }

    /// Clean everything up. The returned blob ends up in the pipeline's
    /// closing blob under the module's name.
    fn finish(&mut self) -> Result<Blob> {
        Ok(Blob::new())
    }

    /// Last look at accumulated state before [`finish`](Module::finish). This is
    /// the hook the pipeline calls.
    fn pre_finish(&mut self) -> Result<Blob> {
        self.finish()
    }
}
