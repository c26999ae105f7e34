// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::{Duration, Instant};

/// A timed callback caller which fires at most once per interval.
///
/// ```rust
/// use std::time::Duration;
/// use the_sluice::tools::Cuckoo;
///
/// let mut seen = Vec::new();
/// let mut cuckoo = Cuckoo::new(Duration::from_secs(60), |cycle: usize| seen.push(cycle));
/// for cycle in 0..1000 {
///     cuckoo.call(cycle);
/// }
/// drop(cuckoo);
/// assert_eq!(seen, vec![0]);
/// ```
pub struct Cuckoo<F> {
    interval: Duration,
    callback: F,
    last_fired: Option<Instant>,
}

impl<F> Cuckoo<F> {
    pub fn new(interval: Duration, callback: F) -> Self {
        Self {
            interval,
            callback,
            last_fired: None,
        }
    }

    /// Restart the interval from now.
    pub fn reset(&mut self) {
        self.last_fired = Some(Instant::now());
    }

    /// Invoke the callback with `arg` if it never fired or the interval has
    /// passed since it last did. Returns whether it fired.
    pub fn call<A>(&mut self, arg: A) -> bool
    where
        F: FnMut(A),
    {
        let due = match self.last_fired {
            None => true,
            Some(last) => last.elapsed() > self.interval,
        };
        if due {
            (self.callback)(arg);
            self.reset();
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn first_call_always_fires() {
        let mut count = 0;
        let mut cuckoo = Cuckoo::new(Duration::from_secs(3600), |_: ()| count += 1);
        assert!(cuckoo.call(()));
        assert!(!cuckoo.call(()));
        assert!(!cuckoo.call(()));
        drop(cuckoo);
        assert_eq!(count, 1);
    }

    #[test]
    fn reset_postpones_the_first_call() {
        let mut cuckoo = Cuckoo::new(Duration::from_secs(3600), |_: ()| {});
        cuckoo.reset();
        assert!(!cuckoo.call(()));
    }

    #[test]
    fn fires_again_after_interval() {
        let mut fired = Vec::new();
        let mut cuckoo = Cuckoo::new(Duration::from_millis(5), |n: u32| fired.push(n));
        cuckoo.call(1);
        thread::sleep(Duration::from_millis(20));
        cuckoo.call(2);
        drop(cuckoo);
        assert_eq!(fired, vec![1, 2]);
    }
}
