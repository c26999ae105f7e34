// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod attach;
mod loader;
mod module_config;
mod parameters;

pub mod consts;

pub use attach::Attach;
pub use loader::ModuleConfiguration;
pub use module_config::ModuleConfig;
pub use parameters::Parameters;
