// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cooperative stop flag and the Ctrl+C handler feeding it.
//!
//! The scheduler only looks at the flag between cycles, so a stage invocation
//! that has started always completes. While an [`InterruptListener`] is alive
//! SIGINT sets the flag of the handle it was installed for; dropping the
//! listener puts the previous SIGINT disposition back.
//!
//! The handler runs in signal context. It only touches the flag and writes a
//! fixed notice to stderr; everything else is logged by the drain loop once
//! it sees the flag.

use std::io;
#[cfg(unix)]
use std::ptr;
#[cfg(unix)]
use std::sync::atomic::AtomicPtr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status used when a second interrupt forces the process down.
pub const FORCED_EXIT_CODE: i32 = 130;

/// What an interrupt request resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// First request: finish the current cycle, then finalize.
    DrainRequested,
    /// A stop was already pending.
    ForceShutdown,
}

/// Shared handle onto a pipeline's stop flag.
///
/// ```rust
/// use the_sluice::engine::{InterruptAction, InterruptHandle};
///
/// let handle = InterruptHandle::new();
/// assert_eq!(handle.interrupt(), InterruptAction::DrainRequested);
/// assert!(handle.stop_requested());
/// assert_eq!(handle.interrupt(), InterruptAction::ForceShutdown);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    stop: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next cycle boundary.
    pub fn interrupt(&self) -> InterruptAction {
        if self.stop.swap(true, Ordering::SeqCst) {
            InterruptAction::ForceShutdown
        } else {
            InterruptAction::DrainRequested
        }
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Flag of the handle the SIGINT handler currently feeds. Owns one strong
/// reference while non-null.
#[cfg(unix)]
static ACTIVE: AtomicPtr<AtomicBool> = AtomicPtr::new(ptr::null_mut());

#[cfg(unix)]
const DRAIN_NOTICE: &[u8] =
    b"\nGot CTRL+C, waiting for current cycle... Press CTRL+C again if you're in hurry!\n";
#[cfg(unix)]
const FORCED_NOTICE: &[u8] = b"\nForced shutdown...\n";

/// Keeps SIGINT routed to a stop flag. Dropping it restores the disposition
/// that was in place before [`install`].
pub struct InterruptListener {
    #[cfg(unix)]
    previous: libc::sigaction,
}

impl std::fmt::Debug for InterruptListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptListener").finish_non_exhaustive()
    }
}

#[cfg(unix)]
impl Drop for InterruptListener {
    fn drop(&mut self) {
        unsafe {
            libc::sigaction(libc::SIGINT, &self.previous, ptr::null_mut());
        }
        release_active();
    }
}

/// Route SIGINT to `handle` until the returned listener is dropped.
///
/// The first signal requests a stop, the second one while the stop is pending
/// exits the process with [`FORCED_EXIT_CODE`]. Only one listener can exist
/// per process; a second call fails with [`io::ErrorKind::AlreadyExists`].
#[cfg(unix)]
pub fn install(handle: &InterruptHandle) -> io::Result<InterruptListener> {
    let flag = Arc::into_raw(Arc::clone(&handle.stop)) as *mut AtomicBool;
    if ACTIVE
        .compare_exchange(ptr::null_mut(), flag, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        unsafe { drop(Arc::from_raw(flag)) };
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "another pipeline is already trapping CTRL+C",
        ));
    }

    let mut previous: libc::sigaction = unsafe { std::mem::zeroed() };
    let result = unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(libc::SIGINT, &action, &mut previous)
    };
    if result != 0 {
        let error = io::Error::last_os_error();
        release_active();
        return Err(error);
    }

    Ok(InterruptListener { previous })
}

#[cfg(not(unix))]
pub fn install(_handle: &InterruptHandle) -> io::Result<InterruptListener> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "CTRL+C trapping needs a unix platform",
    ))
}

#[cfg(unix)]
fn release_active() {
    let flag = ACTIVE.swap(ptr::null_mut(), Ordering::SeqCst);
    if !flag.is_null() {
        unsafe { drop(Arc::from_raw(flag as *const AtomicBool)) };
    }
}

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    let flag = ACTIVE.load(Ordering::SeqCst);
    if flag.is_null() {
        return;
    }
    let already_stopping = unsafe { (*flag).swap(true, Ordering::SeqCst) };
    if already_stopping {
        write_stderr(FORCED_NOTICE);
        unsafe { libc::_exit(FORCED_EXIT_CODE) };
    }
    write_stderr(DRAIN_NOTICE);
}

#[cfg(unix)]
fn write_stderr(message: &[u8]) {
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            message.as_ptr() as *const libc::c_void,
            message.len(),
        );
    }
}

/// Serializes tests that change the process-wide SIGINT disposition.
#[cfg(test)]
pub(crate) static TRAP_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// The handler currently installed for SIGINT.
#[cfg(all(test, unix))]
pub(crate) fn sigint_disposition() -> libc::sighandler_t {
    let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::sigaction(libc::SIGINT, ptr::null(), &mut current) };
    assert_eq!(result, 0, "Failed to read the SIGINT disposition");
    current.sa_sigaction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let handle = InterruptHandle::new();
        let observer = handle.clone();
        assert!(!observer.stop_requested());
        handle.interrupt();
        assert!(observer.stop_requested());
    }

    #[cfg(unix)]
    #[test]
    fn sigint_sets_the_flag_while_installed() {
        let _lock = TRAP_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        assert_eq!(sigint_disposition(), libc::SIG_DFL);

        let handle = InterruptHandle::new();
        let listener = install(&handle).expect("Failed to trap SIGINT");
        assert_ne!(sigint_disposition(), libc::SIG_DFL);

        unsafe { libc::raise(libc::SIGINT) };
        assert!(handle.stop_requested());

        drop(listener);
        assert_eq!(sigint_disposition(), libc::SIG_DFL);
    }

    #[cfg(unix)]
    #[test]
    fn only_one_listener_at_a_time() {
        let _lock = TRAP_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let first = InterruptHandle::new();
        let second = InterruptHandle::new();

        let listener = install(&first).expect("Failed to trap SIGINT");
        let err = install(&second).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        drop(listener);
        let again = install(&second).expect("Failed to trap SIGINT after release");
        drop(again);
        assert_eq!(sigint_disposition(), libc::SIG_DFL);
        assert_eq!(Arc::strong_count(&first.stop), 1);
        assert_eq!(Arc::strong_count(&second.stop), 1);
    }
}
