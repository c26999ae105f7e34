// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// CPU time consumed by this process, in seconds.
#[cfg(unix)]
pub fn process_cpu_time() -> f64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return 0.0;
    }
    ts.tv_sec as f64 + ts.tv_nsec as f64 * 1e-9
}

#[cfg(not(unix))]
pub fn process_cpu_time() -> f64 {
    0.0
}

/// Peak resident set size of this process, in megabytes.
#[cfg(unix)]
pub fn peak_memory_usage() -> f64 {
    // SAFETY: an all-zero rusage is a valid value and getrusage only writes into it.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    // SAFETY: `usage` is a valid, writable rusage for the duration of the call.
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return 0.0;
    }
    let max_rss = usage.ru_maxrss as f64;
    // ru_maxrss is reported in bytes on macOS and in kilobytes elsewhere
    if cfg!(target_os = "macos") {
        max_rss / (1024.0 * 1024.0)
    } else {
        max_rss / 1024.0
    }
}

#[cfg(not(unix))]
pub fn peak_memory_usage() -> f64 {
    0.0
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn cpu_time_is_monotonic() {
        let before = process_cpu_time();
        let mut acc = 0_u64;
        for i in 0..200_000_u64 {
            acc = acc.wrapping_add(i * i);
        }
        assert!(acc > 0);
        assert!(process_cpu_time() >= before);
    }

    #[test]
    fn peak_memory_is_positive() {
        assert!(peak_memory_usage() > 0.0);
    }
}
