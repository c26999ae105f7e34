// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod blob;       // per-cycle record
pub mod config;     // attach options, parameters, configuration files
pub mod engine;     // pipeline scheduling
pub mod errors;     // error handling
pub mod modules;    // stock modules
pub mod observability;
pub mod services;   // pipeline-scoped service registry
pub mod tools;      // timers, memory, throttling
pub mod traits;     // module contract
