//! # autoclick
//!
//! Record mouse clicks, replay them in a loop.
//!
//! ## Features
//!
//! - **Gather**: every left click and the gap before it lands in a text file
//! - **Exec**: the file is replayed with smooth pointer moves, for N cycles or until `q`
//! - **Native input**: rdev hook and enigo injector behind the `native` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autoclick::prelude::*;
//! use std::sync::Arc;
//!
//! # #[cfg(feature = "native")]
//! # fn demo() -> autoclick::Result<()> {
//! let mut controller = SessionController::new(
//!     ControllerConfig::default(),
//!     Arc::new(RdevHook::new()),
//!     Box::new(EnigoInjector::new()?),
//!     Arc::new(LogHost::default()),
//! );
//! controller.ready()?;
//! let outcome = controller.start(RunParams {
//!     mode: "exec".into(),
//!     config_name: "mouse.txt".into(),
//!     min_interval: 500,
//!     cycle: 3,
//! })?;
//! println!("{:?}", outcome);
//! # Ok(())
//! # }
//! ```

// Re-export ports and errors
pub use autoclick_core::*;

// Re-export the engine
pub use autoclick_recorder as recorder;

pub use autoclick_recorder::{
    ConfigStore, ControllerConfig, Host, HostEvent, InitPayload, LogHost, Mode, Phase, Point,
    Record, RecordedSequence, RecordingSession, RecordingStats, ReplayConfig, ReplayExit,
    ReplaySession, ReplayStats, RunOutcome, RunParams, SessionController, SessionReport,
    StopReason,
};

/// Prelude - import everything you need
pub mod prelude {
    pub use autoclick_core::prelude::*;
    pub use autoclick_recorder::prelude::*;
}
