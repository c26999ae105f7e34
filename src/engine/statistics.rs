// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded timing histories and the end-of-run statistics report.

use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter};

use crate::tools::Elapsed;

/// Wall and CPU durations of the most recent invocations. Once `limit`
/// entries are held, recording drops the oldest.
#[derive(Debug, Clone)]
pub struct TimingHistory {
    limit: usize,
    wall: VecDeque<f64>,
    cpu: VecDeque<f64>,
}

impl TimingHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            wall: VecDeque::new(),
            cpu: VecDeque::new(),
        }
    }

    pub fn record(&mut self, elapsed: Elapsed) {
        if self.limit == 0 {
            return;
        }
        if self.wall.len() == self.limit {
            self.wall.pop_front();
            self.cpu.pop_front();
        }
        self.wall.push_back(elapsed.wall);
        self.cpu.push_back(elapsed.cpu);
    }

    pub fn len(&self) -> usize {
        self.wall.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wall.is_empty()
    }

    pub fn wall(&self) -> impl Iterator<Item = f64> + '_ {
        self.wall.iter().copied()
    }

    pub fn cpu(&self) -> impl Iterator<Item = f64> + '_ {
        self.cpu.iter().copied()
    }
}

/// Timings of one attached stage.
#[derive(Debug, Clone)]
pub struct StageTimings {
    pub process: TimingHistory,
    pub finish: Elapsed,
}

impl StageTimings {
    pub fn new(limit: usize) -> Self {
        Self {
            process: TimingHistory::new(limit),
            finish: Elapsed::default(),
        }
    }
}

/// Summary statistics of a series of durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl Statistics {
    /// `None` for an empty series.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };

        Some(Self {
            mean,
            median,
            min: values[0],
            max: values[values.len() - 1],
            std: variance.sqrt(),
        })
    }
}

/// Seconds with six decimals, or minutes above three minutes.
pub fn format_seconds(seconds: f64) -> String {
    if seconds > 180.0 {
        format!("{:.6}min", seconds / 60.0)
    } else {
        format!("{:.6}s", seconds)
    }
}

/// The statistics printed when a pipeline finishes.
#[derive(Debug)]
pub struct TimingReport<'a> {
    pub cycles: usize,
    pub overall: Elapsed,
    pub peak_memory_mb: f64,
    pub cycle_timings: &'a TimingHistory,
    /// Stages which opted into timing, in attach order.
    pub stages: Vec<(&'a str, &'a StageTimings)>,
}

impl Display for TimingReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "=".repeat(60))?;
        write!(
            f,
            "\n{} cycles drained in {} (CPU {}). Memory peak: {:.2} MB",
            self.cycles,
            format_seconds(self.overall.wall),
            format_seconds(self.overall.cpu),
            self.peak_memory_mb
        )?;
        if self.cycles > self.cycle_timings.len() {
            write!(
                f,
                "\nStatistics are based on the last {} cycles.",
                self.cycle_timings.len()
            )?;
        }
        write_statistics(f, self.cycle_timings)?;

        for (name, timings) in &self.stages {
            write!(
                f,
                "\n{} - process: {:.3}s (CPU {:.3}s) - finish: {:.3}s (CPU {:.3}s)",
                name,
                timings.process.wall().sum::<f64>(),
                timings.process.cpu().sum::<f64>(),
                timings.finish.wall,
                timings.finish.cpu
            )?;
            write_statistics(f, &timings.process)?;
        }
        Ok(())
    }
}

fn write_statistics(f: &mut Formatter<'_>, history: &TimingHistory) -> fmt::Result {
    let series: [(&str, Vec<f64>); 2] = [
        ("wall", history.wall().collect()),
        ("CPU ", history.cpu().collect()),
    ];
    for (prefix, values) in series {
        if let Some(stats) = Statistics::of(values) {
            write!(
                f,
                "\n  {}  mean: {}  medi: {}  min: {}  max: {}  std: {}",
                prefix,
                format_seconds(stats.mean),
                format_seconds(stats.median),
                format_seconds(stats.min),
                format_seconds(stats.max),
                format_seconds(stats.std)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elapsed(wall: f64) -> Elapsed {
        Elapsed { wall, cpu: wall / 2.0 }
    }

    #[test]
    fn statistics_of_odd_series() {
        let stats = Statistics::of([3.0, 1.0, 2.0]).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.median, 2.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 3.0);
        assert!((stats.std - (2.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn median_of_even_series_averages_the_middle() {
        let stats = Statistics::of([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert!(Statistics::of(Vec::new()).is_none());
    }

    #[test]
    fn history_drops_oldest_entries() {
        let mut history = TimingHistory::new(2);
        for wall in [1.0, 2.0, 3.0] {
            history.record(elapsed(wall));
        }
        assert_eq!(history.wall().collect::<Vec<_>>(), vec![2.0, 3.0]);
        assert_eq!(history.cpu().collect::<Vec<_>>(), vec![1.0, 1.5]);

        let mut disabled = TimingHistory::new(0);
        disabled.record(elapsed(1.0));
        assert!(disabled.is_empty());
    }

    #[test]
    fn seconds_switch_to_minutes_above_three_minutes() {
        assert_eq!(format_seconds(1.5), "1.500000s");
        assert_eq!(format_seconds(180.0), "180.000000s");
        assert_eq!(format_seconds(240.0), "4.000000min");
    }

    #[test]
    fn report_lists_cycles_and_timed_stages() {
        let mut cycles = TimingHistory::new(2);
        cycles.record(elapsed(1.0));
        cycles.record(elapsed(3.0));
        let mut stage = StageTimings::new(10);
        stage.process.record(elapsed(0.5));
        stage.finish = elapsed(0.25);

        let report = TimingReport {
            cycles: 5,
            overall: elapsed(10.0),
            peak_memory_mb: 12.5,
            cycle_timings: &cycles,
            stages: vec![("printer", &stage)],
        };
        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(
            lines[1],
            "5 cycles drained in 10.000000s (CPU 5.000000s). Memory peak: 12.50 MB"
        );
        assert_eq!(lines[2], "Statistics are based on the last 2 cycles.");
        assert!(lines[3].starts_with("  wall  mean: 2.000000s  medi: 2.000000s"));
        assert!(lines[4].starts_with("  CPU   mean: 1.000000s"));
        assert_eq!(
            lines[5],
            "printer - process: 0.500s (CPU 0.250s) - finish: 0.250s (CPU 0.125s)"
        );
        assert_eq!(lines.len(), 8);
    }
}
