//! autoclick-core - input ports and structured errors for the click recorder
//!
//! The recording/replay engine talks to the operating system only through
//! the [`InputHook`] and [`InputInjector`] traits defined here.
//!
//! ## Platform Support
//!
//! - **macOS / Windows / Linux (X11)**: via rdev + enigo, behind the `native` feature
//! - Without `native`: ports only, for embedding and tests

pub mod cancel;
pub mod error;
pub mod input;
pub mod platform;

pub use cancel::CancelToken;
pub use error::{Error, ErrorCode, Result};
pub use input::{
    InputEvent, InputHook, InputInjector, InputKind, MouseButton, CANCEL_KEY,
};

#[cfg(feature = "native")]
pub use platform::{EnigoInjector, RdevHook};

pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::input::{
        InputEvent, InputHook, InputInjector, InputKind, MouseButton, CANCEL_KEY,
    };

    #[cfg(feature = "native")]
    pub use crate::platform::{EnigoInjector, RdevHook};
}
