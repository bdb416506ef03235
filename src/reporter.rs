//! Diagnostic sinks for acquisition failures.
//!
//! Allocations never hand a structured error back through their infallible
//! constructors. Instead they describe the failure to an [`ErrorReporter`],
//! which is free to log it, print it, or keep it for later inspection.

use parking_lot::Mutex;
use std::fmt;

/// Receiver of formatted diagnostic messages.
///
/// A reporter is shared by reference between any number of allocations and
/// must therefore be usable from any thread.
pub trait ErrorReporter: Send + Sync {
    /// Surface one formatted message
    fn report(&self, args: fmt::Arguments<'_>);
}

/// Report a message built from a template and substitution values.
///
/// ```
/// use modelbytes::reporter::BufferedReporter;
/// use modelbytes::report;
///
/// let sink = BufferedReporter::new();
/// report!(sink, "Could not open '{}'.", "model.bin");
/// assert_eq!(sink.messages(), vec!["Could not open 'model.bin'.".to_string()]);
/// ```
#[macro_export]
macro_rules! report {
    ($reporter:expr, $($arg:tt)+) => {
        $crate::reporter::ErrorReporter::report(&$reporter, format_args!($($arg)+))
    };
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for &R {
    fn report(&self, args: fmt::Arguments<'_>) {
        (**self).report(args)
    }
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for std::sync::Arc<R> {
    fn report(&self, args: fmt::Arguments<'_>) {
        (**self).report(args)
    }
}

/// Forwards every message to the `log` facade at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, args: fmt::Arguments<'_>) {
        log::error!("{}", args);
    }
}

/// Writes every message to standard error, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, args: fmt::Arguments<'_>) {
        eprintln!("{}", args);
    }
}

/// Keeps every message in memory in arrival order.
#[derive(Debug, Default)]
pub struct BufferedReporter {
    messages: Mutex<Vec<String>>,
}

impl BufferedReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the messages received so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of messages received so far
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Remove and return all collected messages
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl ErrorReporter for BufferedReporter {
    fn report(&self, args: fmt::Arguments<'_>) {
        self.messages.lock().push(args.to_string());
    }
}
