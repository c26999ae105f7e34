// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::blob::Blob;
use crate::config::ModuleConfig;
use crate::errors::Result;
use crate::traits::{Flow, Module};

const DEFAULT_KEY: &str = "cycle";

/// Source module writing a running counter into each blob.
///
/// The counter is the number of values emitted before, starting at 0. It
/// matches the cycle index only when the pump runs every cycle.
///
/// Parameters:
/// * `key` - blob key to write, `"cycle"` by default
/// * `max` - number of values to emit before reporting exhaustion; unbounded when absent
#[derive(Debug, Clone)]
pub struct CyclePump {
    key: String,
    max: Option<usize>,
    emitted: usize,
}

impl Default for CyclePump {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
            max: None,
            emitted: 0,
        }
    }
}

impl CyclePump {
    /// Number of values written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl Module for CyclePump {
    fn configure(&mut self, config: &mut ModuleConfig) -> Result<()> {
        self.key = config.get_or("key", DEFAULT_KEY.to_string())?;
        self.max = config.get("max")?;
        Ok(())
    }

    fn process(&mut self, mut blob: Blob) -> Result<Flow> {
        if self.max.is_some_and(|max| self.emitted >= max) {
            return Ok(Flow::Exhausted);
        }
        blob.insert(self.key.as_str(), self.emitted);
        self.emitted += 1;
        Ok(Flow::Continue(blob))
    }

    fn finish(&mut self) -> Result<Blob> {
        Ok(Blob::from_iter([("emitted", self.emitted)]))
    }
}
