// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Small utilities the pipeline relies on: wall and CPU clocks, peak memory
//! and a throttled callback.

mod cuckoo;
mod resources;
mod timer;

pub use cuckoo::Cuckoo;
pub use resources::{peak_memory_usage, process_cpu_time};
pub use timer::{Elapsed, Stopwatch, Timer};
