//! Shared plumbing for the three lab simulators.
//!
//! Error type, comparative ranking, logging and configuration live here so
//! that `iosched`, `mmu` and `scheduler` report and rank their results the
//! same way.

pub mod error;
pub mod logger;
pub mod rank;
pub mod settings;

// re-exported so the trace macros resolve in dependent crates
pub use log;

pub use error::{Error, Result};
pub use rank::{rank, Ranked, Selection};
pub use settings::Settings;

/// Prints one line per simulated operation (enabled with `-v`).
#[macro_export]
macro_rules! v_trace {
    ($($arg:tt)*) => {
        $crate::log::debug!($($arg)*)
    };
}

/// Dumps queue and candidate state (enabled with `-q`).
#[macro_export]
macro_rules! q_trace {
    ($($arg:tt)*) => {
        $crate::log::trace!($($arg)*)
    };
}
