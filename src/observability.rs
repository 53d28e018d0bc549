//! Crate-internal log macros for resolver fallbacks.
//!
//! Records go to `tracing` when that feature is on, else to `log` under the
//! default `logging` feature. With neither, the format arguments are still
//! type-checked but nothing is emitted.

macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        { tracing::$level!(target: "gui_endpoint", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), feature = "logging"))]
        { log::$level!(target: "gui_endpoint", $($arg)*); }

        #[cfg(all(not(feature = "tracing"), not(feature = "logging")))]
        { let _ = format_args!($($arg)*); }
    }};
}

/// An override was not usable as a URI and a fallback applies.
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::observability::log_event!(debug, $($arg)*) };
}

/// A configured value is invalid and is being ignored.
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::observability::log_event!(warn, $($arg)*) };
}

pub(crate) use log_debug;
pub(crate) use log_event;
pub(crate) use log_warn;
