//! Host port boundary.
//!
//! The core never terminates the process itself. When an [`Engine`] entry
//! point is asked to abort on failure it hands the [`FatalError`] to a
//! [`Port`], which must not return.
//!
//! Diagnostics go through `tracing`; a host that installs no subscriber gets
//! a no-op sink.
//!
//! [`Engine`]: crate::api::Engine

use crate::errors::FatalError;

/// Fatal-error sink supplied by the host.
pub trait Port {
    /// Report `error` and never return.
    fn fatal(&self, error: &FatalError) -> !;
}

/// Port that panics with the fault description.
///
/// Useful for tests and for hosts that unwind instead of exiting.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicPort;

impl Port for PanicPort {
    fn fatal(&self, error: &FatalError) -> ! {
        panic!("fatal ({}): {}", error.cause(), error)
    }
}

/// Port that logs the fault and exits the process with the cause's code.
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessPort;

#[cfg(feature = "std")]
impl Port for ProcessPort {
    fn fatal(&self, error: &FatalError) -> ! {
        let cause = error.cause();
        tracing::error!(%cause, code = cause.exit_code(), "{}", error);
        std::process::exit(cause.exit_code())
    }
}
