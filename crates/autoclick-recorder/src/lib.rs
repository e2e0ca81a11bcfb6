//! autoclick-recorder - mouse click recording and replay
//!
//! Gather mode appends left clicks and the gaps between them to a flat text
//! file; exec mode replays that file in cycles through an [`InputInjector`].
//! [`SessionController`] ties both to the global hook and the shell.
//!
//! [`InputInjector`]: autoclick_core::InputInjector

pub mod controller;
pub mod events;
pub mod host;
pub mod recorder;
pub mod replay;
pub mod storage;

pub use controller::{
    ControllerConfig, Mode, Phase, RunOutcome, RunParams, SessionConfig, SessionController,
    SessionReport, StopReason,
};
pub use events::{Point, Record, RecordedSequence};
pub use host::{Host, HostEvent, InitPayload, LogHost, ModeEnum};
pub use recorder::{RecordingSession, RecordingStats};
pub use replay::{ReplayConfig, ReplayExit, ReplaySession, ReplayStats};
pub use storage::ConfigStore;

pub mod prelude {
    pub use crate::controller::{
        ControllerConfig, Mode, Phase, RunOutcome, RunParams, SessionController, SessionReport,
        StopReason,
    };
    pub use crate::events::{Point, Record, RecordedSequence};
    pub use crate::host::{Host, HostEvent, InitPayload, LogHost};
    pub use crate::recorder::RecordingSession;
    pub use crate::replay::{ReplayConfig, ReplaySession};
    pub use crate::storage::ConfigStore;
}
