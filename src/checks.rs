//! Invariant checks with an explicit severity.
//!
//! [`Severity::Debug`] checks only run in builds with debug assertions and
//! panic on failure. [`Severity::Fatal`] checks always run; a failure is logged
//! and the process is aborted.
//!
//! The macros are the usual entry point:
//!
//! ```
//! use modelbytes::{check_op, dcheck, dcheck_op};
//!
//! let size = 16usize;
//! dcheck!(size > 0);
//! dcheck_op!(size, <=, 4096);
//! check_op!(size % 8, ==, 0);
//! ```

use std::fmt;

/// How a failed check is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Panic in debug builds, compiled out of release builds
    Debug,
    /// Log and abort the process in every build
    Fatal,
}

/// Apply a check of the given severity.
///
/// `what` describes the failed condition and is only formatted on failure.
#[track_caller]
pub fn enforce(condition: bool, severity: Severity, what: fmt::Arguments<'_>) {
    if condition {
        return;
    }
    match severity {
        Severity::Debug => {
            if cfg!(debug_assertions) {
                panic!("check failed: {}", what);
            }
        }
        Severity::Fatal => {
            let location = std::panic::Location::caller();
            log::error!("fatal check failed at {}: {}", location, what);
            eprintln!("fatal check failed at {}: {}", location, what);
            std::process::abort();
        }
    }
}

/// Debug-only condition check
#[macro_export]
macro_rules! dcheck {
    ($cond:expr $(,)?) => {
        if cfg!(debug_assertions) {
            $crate::checks::enforce(
                $cond,
                $crate::checks::Severity::Debug,
                format_args!("{}", stringify!($cond)),
            )
        }
    };
}

/// Debug-only comparison check, e.g. `dcheck_op!(a, <=, b)`
#[macro_export]
macro_rules! dcheck_op {
    ($lhs:expr, $op:tt, $rhs:expr $(,)?) => {
        if cfg!(debug_assertions) {
            match (&$lhs, &$rhs) {
                (lhs, rhs) => $crate::checks::enforce(
                    *lhs $op *rhs,
                    $crate::checks::Severity::Debug,
                    format_args!(
                        "{} {} {} ({:?} vs {:?})",
                        stringify!($lhs),
                        stringify!($op),
                        stringify!($rhs),
                        lhs,
                        rhs
                    ),
                ),
            }
        }
    };
}

/// Always-on condition check; aborts on failure
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        $crate::checks::enforce(
            $cond,
            $crate::checks::Severity::Fatal,
            format_args!("{}", stringify!($cond)),
        )
    };
}

/// Always-on comparison check, e.g. `check_op!(a, ==, b)`; aborts on failure
#[macro_export]
macro_rules! check_op {
    ($lhs:expr, $op:tt, $rhs:expr $(,)?) => {
        match (&$lhs, &$rhs) {
            (lhs, rhs) => $crate::checks::enforce(
                *lhs $op *rhs,
                $crate::checks::Severity::Fatal,
                format_args!(
                    "{} {} {} ({:?} vs {:?})",
                    stringify!($lhs),
                    stringify!($op),
                    stringify!($rhs),
                    lhs,
                    rhs
                ),
            ),
        }
    };
}
