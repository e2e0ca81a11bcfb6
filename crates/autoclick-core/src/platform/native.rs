//! rdev global hook and enigo injector

use super::PlatformError;
use crate::input::{
    epoch_ms, smooth_path, InputEvent, InputHook, InputInjector, InputKind, MouseButton,
    SMOOTH_STEPS,
};
use crate::{Error, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

const GLIDE_STEP: Duration = Duration::from_millis(4);

// ============================================================================
// Hook
// ============================================================================

#[derive(Default)]
struct HookShared {
    subscriber: Mutex<Option<Sender<InputEvent>>>,
    // rdev reports button presses without coordinates
    cursor: Mutex<(f64, f64)>,
    listening: AtomicBool,
}

/// Process-wide hook backed by `rdev::listen`.
///
/// The listener thread starts on first subscription and lives for the rest
/// of the process; subscriptions only attach and detach the event channel.
#[derive(Default)]
pub struct RdevHook {
    shared: Arc<HookShared>,
}

impl RdevHook {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_listening(&self) -> Result<()> {
        if self.shared.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let shared = self.shared.clone();
        thread::Builder::new()
            .name("autoclick-hook".into())
            .spawn(move || {
                let cb = shared.clone();
                info!("global input hook listening");
                if let Err(e) = rdev::listen(move |event| cb.dispatch(event)) {
                    error!("{}", PlatformError::Listen(format!("{:?}", e)));
                    shared.listening.store(false, Ordering::SeqCst);
                    // disconnects the active subscriber
                    shared.subscriber.lock().take();
                }
            })
            .map_err(Error::hook_failed)?;
        Ok(())
    }
}

impl HookShared {
    fn dispatch(&self, event: rdev::Event) {
        let at_ms = epoch_ms(event.time);
        let kind = match event.event_type {
            rdev::EventType::MouseMove { x, y } => {
                *self.cursor.lock() = (x, y);
                return;
            }
            rdev::EventType::ButtonPress(button) => {
                let Some(button) = map_button(button) else { return };
                let (x, y) = *self.cursor.lock();
                InputKind::MouseDown {
                    button,
                    x: x.round() as i32,
                    y: y.round() as i32,
                }
            }
            rdev::EventType::KeyPress(key) => {
                let Some(key) = key_char(key, event.name.as_deref()) else { return };
                InputKind::KeyDown { key }
            }
            _ => return,
        };
        if let Some(tx) = self.subscriber.lock().as_ref() {
            let _ = tx.send(InputEvent { at_ms, kind });
        }
    }
}

impl InputHook for RdevHook {
    fn subscribe(&self) -> Result<Receiver<InputEvent>> {
        self.ensure_listening()?;
        let (tx, rx) = unbounded();
        *self.shared.subscriber.lock() = Some(tx);
        debug!("hook subscriber attached");
        Ok(rx)
    }

    fn unsubscribe(&self) {
        if self.shared.subscriber.lock().take().is_some() {
            debug!("hook subscriber detached");
        }
    }
}

fn map_button(button: rdev::Button) -> Option<MouseButton> {
    match button {
        rdev::Button::Left => Some(MouseButton::Left),
        rdev::Button::Right => Some(MouseButton::Right),
        rdev::Button::Middle => Some(MouseButton::Middle),
        rdev::Button::Unknown(_) => None,
    }
}

fn key_char(key: rdev::Key, name: Option<&str>) -> Option<char> {
    if let Some(c) = name.and_then(|n| n.chars().next()).filter(|c| c.is_alphanumeric()) {
        return Some(c);
    }
    match key {
        rdev::Key::KeyQ => Some('q'),
        _ => None,
    }
}

// ============================================================================
// Injector
// ============================================================================

enum Command {
    Move { x: i32, y: i32 },
    Click(MouseButton),
    Key(char),
}

type Reply = Sender<std::result::Result<(), PlatformError>>;

/// enigo-backed injector.
///
/// The `Enigo` handle lives on its own thread and is driven over a channel,
/// so the injector itself can move into the replay worker.
pub struct EnigoInjector {
    tx: Sender<(Command, Reply)>,
}

impl EnigoInjector {
    pub fn new() -> Result<Self> {
        let (tx, rx) = unbounded::<(Command, Reply)>();
        let (ready_tx, ready_rx) = bounded(1);

        thread::Builder::new()
            .name("autoclick-injector".into())
            .spawn(move || {
                let mut enigo = match Enigo::new(&Settings::default()) {
                    Ok(enigo) => {
                        let _ = ready_tx.send(Ok(()));
                        enigo
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(PlatformError::Connect(e.to_string())));
                        return;
                    }
                };
                for (cmd, reply) in rx {
                    let _ = reply.send(execute(&mut enigo, cmd));
                }
            })
            .map_err(|e| Error::injection_failed("Injector start", e))?;

        ready_rx
            .recv()
            .map_err(|_| PlatformError::Disconnected)?
            .map_err(Error::from)?;
        Ok(Self { tx })
    }

    fn call(&self, cmd: Command) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send((cmd, reply_tx))
            .map_err(|_| PlatformError::Disconnected)?;
        reply_rx
            .recv()
            .map_err(|_| PlatformError::Disconnected)?
            .map_err(Error::from)
    }
}

impl InputInjector for EnigoInjector {
    fn move_smooth(&mut self, x: i32, y: i32) -> Result<()> {
        self.call(Command::Move { x, y })
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.call(Command::Click(button))
    }

    fn key_tap(&mut self, key: char) -> Result<()> {
        self.call(Command::Key(key))
    }
}

fn execute(enigo: &mut Enigo, cmd: Command) -> std::result::Result<(), PlatformError> {
    let failed = |e: enigo::InputError| PlatformError::Injection(e.to_string());
    match cmd {
        Command::Move { x, y } => {
            let from = enigo.location().map_err(failed)?;
            for (px, py) in smooth_path(from, (x, y), SMOOTH_STEPS) {
                enigo.move_mouse(px, py, Coordinate::Abs).map_err(failed)?;
                thread::sleep(GLIDE_STEP);
            }
            Ok(())
        }
        Command::Click(button) => {
            let button = match button {
                MouseButton::Left => Button::Left,
                MouseButton::Right => Button::Right,
                MouseButton::Middle => Button::Middle,
            };
            enigo.button(button, Direction::Click).map_err(failed)
        }
        Command::Key(c) => enigo
            .key(enigo::Key::Unicode(c), Direction::Click)
            .map_err(failed),
    }
}
