//! Platform adapters for the input ports
//!
//! The `native` feature wires the global hook to rdev and injection to enigo,
//! both of which cover macOS, Windows and X11 Linux.

#[cfg(feature = "native")]
mod native;

#[cfg(feature = "native")]
pub use native::{EnigoInjector, RdevHook};

use crate::Error;

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not connect to the input backend: {0}")]
    Connect(String),
    #[error("listen failed: {0}")]
    Listen(String),
    #[error("injection failed: {0}")]
    Injection(String),
    #[error("input backend thread has exited")]
    Disconnected,
}

impl From<PlatformError> for Error {
    fn from(e: PlatformError) -> Self {
        match e {
            PlatformError::Listen(_) => Error::hook_failed(e),
            _ => Error::injection_failed("Input injection", e),
        }
    }
}
