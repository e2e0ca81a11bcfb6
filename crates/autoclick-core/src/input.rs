//! Input ports: the global hook that delivers events and the injector that
//! produces synthetic ones.

use crate::Result;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key that ends the active session, matched case-insensitively
pub const CANCEL_KEY: char = 'q';

/// Steps used when gliding the pointer to a target
pub const SMOOTH_STEPS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "e", rename_all = "snake_case")]
pub enum InputKind {
    MouseDown { button: MouseButton, x: i32, y: i32 },
    KeyDown { key: char },
}

/// One global input event as delivered by the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Wall-clock milliseconds since the Unix epoch
    pub at_ms: i64,
    #[serde(flatten)]
    pub kind: InputKind,
}

impl InputEvent {
    pub fn mouse_down(button: MouseButton, x: i32, y: i32, at_ms: i64) -> Self {
        Self { at_ms, kind: InputKind::MouseDown { button, x, y } }
    }

    pub fn key_down(key: char, at_ms: i64) -> Self {
        Self { at_ms, kind: InputKind::KeyDown { key } }
    }

    pub fn is_cancel_key(&self) -> bool {
        matches!(self.kind, InputKind::KeyDown { key } if key.eq_ignore_ascii_case(&CANCEL_KEY))
    }
}

/// Global keyboard/mouse hook.
///
/// At most one subscriber is live at a time; a new subscription replaces the
/// previous one and `unsubscribe` detaches it so later events are dropped.
pub trait InputHook: Send + Sync {
    fn subscribe(&self) -> Result<Receiver<InputEvent>>;
    fn unsubscribe(&self);
}

/// Synthetic input producer
pub trait InputInjector: Send {
    /// Glide the pointer to absolute screen coordinates
    fn move_smooth(&mut self, x: i32, y: i32) -> Result<()>;
    /// Press and release a button at the current pointer position
    fn click(&mut self, button: MouseButton) -> Result<()>;
    fn key_tap(&mut self, key: char) -> Result<()>;
}

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Epoch milliseconds of a hook timestamp. A time before the epoch or past
/// the `i64` range falls back to the current clock.
pub fn epoch_ms(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or_else(now_ms)
}

/// Intermediate pointer positions from `from` to `to`, ending exactly on `to`.
///
/// Uses an ease-in-out curve so the glide starts and ends slowly.
pub fn smooth_path(from: (i32, i32), to: (i32, i32), steps: u32) -> Vec<(i32, i32)> {
    if steps <= 1 || from == to {
        return vec![to];
    }
    let (fx, fy) = (from.0 as f64, from.1 as f64);
    // f64 so targets at the i32 extremes cannot overflow
    let (dx, dy) = (to.0 as f64 - fx, to.1 as f64 - fy);

    let mut path: Vec<(i32, i32)> = (1..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let eased = t * t * (3.0 - 2.0 * t);
            ((fx + dx * eased).round() as i32, (fy + dy * eased).round() as i32)
        })
        .collect();
    path.dedup();
    path
}
