// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use super::process_cpu_time;

/// Wall and CPU seconds between two points in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Elapsed {
    pub wall: f64,
    pub cpu: f64,
}

/// Reads both clocks at start; [`elapsed`](Stopwatch::elapsed) reads them again.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    wall: Instant,
    cpu: f64,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            wall: Instant::now(),
            cpu: process_cpu_time(),
        }
    }

    pub fn elapsed(&self) -> Elapsed {
        Elapsed {
            wall: self.wall.elapsed().as_secs_f64(),
            cpu: (process_cpu_time() - self.cpu).max(0.0),
        }
    }
}

/// A named timer which logs how long the timed section took when stopped.
///
/// ```rust
/// use the_sluice::tools::Timer;
///
/// let mut timer = Timer::new("Loading calibration");
/// timer.start();
/// let seconds = timer.stop();
/// assert!(seconds >= 0.0);
/// assert_eq!(timer.seconds(), seconds);
/// ```
#[derive(Debug, Clone)]
pub struct Timer {
    message: String,
    precision: usize,
    quiet: bool,
    started: Option<Stopwatch>,
    result: Option<Elapsed>,
}

impl Timer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            precision: 3,
            quiet: false,
            started: None,
            result: None,
        }
    }

    /// Decimal places used in the log line.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Do not log when stopped.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn start(&mut self) {
        self.started = Some(Stopwatch::start());
        self.result = None;
    }

    /// Stop the timer and return the elapsed wall-clock seconds. Stopping a
    /// timer that was never started yields zero.
    pub fn stop(&mut self) -> f64 {
        let elapsed = self
            .started
            .map(|stopwatch| stopwatch.elapsed())
            .unwrap_or_default();
        self.result = Some(elapsed);
        if !self.quiet {
            tracing::info!(
                wall_seconds = elapsed.wall,
                cpu_seconds = elapsed.cpu,
                "{}", self.summary()
            );
        }
        elapsed.wall
    }

    /// Elapsed wall-clock seconds of the last start/stop pair.
    pub fn seconds(&self) -> f64 {
        self.result.map_or(0.0, |elapsed| elapsed.wall)
    }

    /// Elapsed CPU seconds of the last start/stop pair.
    pub fn cpu_seconds(&self) -> f64 {
        self.result.map_or(0.0, |elapsed| elapsed.cpu)
    }

    /// `"<message> took 0.123s (CPU 0.120s)."`
    pub fn summary(&self) -> String {
        format!(
            "{} took {:.prec$}s (CPU {:.prec$}s).",
            self.message,
            self.seconds(),
            self.cpu_seconds(),
            prec = self.precision
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn measures_wall_time() {
        let mut timer = Timer::new("nap").quiet();
        timer.start();
        thread::sleep(Duration::from_millis(20));
        let seconds = timer.stop();
        assert!(seconds >= 0.02);
        assert!(timer.cpu_seconds() >= 0.0);
    }

    #[test]
    fn summary_uses_precision() {
        let mut timer = Timer::new("It").with_precision(1).quiet();
        timer.stop();
        assert_eq!(timer.summary(), "It took 0.0s (CPU 0.0s).");
    }

    #[test]
    fn stopwatch_never_reports_negative_cpu() {
        let elapsed = Stopwatch::start().elapsed();
        assert!(elapsed.wall >= 0.0);
        assert!(elapsed.cpu >= 0.0);
    }
}
