//! In-memory hook, injector and host for driving the engine in tests
#![allow(dead_code)]

use autoclick_core::{
    Error, InputEvent, InputHook, InputInjector, MouseButton, Result, CANCEL_KEY,
};
use autoclick_recorder::{ControllerConfig, Host, HostEvent, InitPayload};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// Hook
// ============================================================================

#[derive(Default)]
pub struct FakeHook {
    subscriber: Mutex<Option<Sender<InputEvent>>>,
    subscriptions: AtomicUsize,
}

impl FakeHook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver an event to the live subscriber, if any
    pub fn send(&self, event: InputEvent) -> bool {
        match self.subscriber.lock().as_ref() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    pub fn press(&self, key: char) -> bool {
        self.send(InputEvent::key_down(key, 0))
    }

    pub fn click(&self, x: i32, y: i32, at_ms: i64) -> bool {
        self.send(InputEvent::mouse_down(MouseButton::Left, x, y, at_ms))
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriber.lock().is_some()
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

impl InputHook for FakeHook {
    fn subscribe(&self) -> Result<Receiver<InputEvent>> {
        let (tx, rx) = unbounded();
        *self.subscriber.lock() = Some(tx);
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        Ok(rx)
    }

    fn unsubscribe(&self) {
        self.subscriber.lock().take();
    }
}

// ============================================================================
// Injector
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Move(i32, i32),
    Click(MouseButton),
    Key(char),
}

/// Records every call. Key taps are echoed through `hook` the way a real
/// global hook sees synthetic keystrokes.
pub struct FakeInjector {
    pub calls: Arc<Mutex<Vec<Call>>>,
    hook: Option<Arc<FakeHook>>,
    /// Press the cancel key through the hook after this many clicks
    press_q_after: Option<usize>,
    clicks: usize,
}

impl FakeInjector {
    pub fn new(hook: Option<Arc<FakeHook>>) -> Self {
        Self { calls: Arc::default(), hook, press_q_after: None, clicks: 0 }
    }

    pub fn press_q_after(mut self, clicks: usize) -> Self {
        self.press_q_after = Some(clicks);
        self
    }
}

impl InputInjector for FakeInjector {
    fn move_smooth(&mut self, x: i32, y: i32) -> Result<()> {
        self.calls.lock().push(Call::Move(x, y));
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.calls.lock().push(Call::Click(button));
        self.clicks += 1;
        if self.press_q_after == Some(self.clicks) {
            if let Some(hook) = &self.hook {
                hook.press(CANCEL_KEY);
            }
        }
        Ok(())
    }

    fn key_tap(&mut self, key: char) -> Result<()> {
        self.calls.lock().push(Call::Key(key));
        if let Some(hook) = &self.hook {
            hook.press(key);
        }
        Ok(())
    }
}

pub fn moves(calls: &[Call]) -> Vec<(i32, i32)> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Move(x, y) => Some((*x, *y)),
            _ => None,
        })
        .collect()
}

pub fn keys(calls: &[Call]) -> Vec<char> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Key(k) => Some(*k),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Host
// ============================================================================

pub struct FakeHost {
    pub alerts: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub inits: Mutex<Vec<InitPayload>>,
    pub windows_shown: AtomicUsize,
    pub confirms: AtomicUsize,
    /// `None` makes the dialog fail
    answer: Option<bool>,
}

impl FakeHost {
    pub fn answering(answer: Option<bool>) -> Arc<Self> {
        Arc::new(Self {
            alerts: Mutex::default(),
            errors: Mutex::default(),
            inits: Mutex::default(),
            windows_shown: AtomicUsize::new(0),
            confirms: AtomicUsize::new(0),
            answer,
        })
    }

    pub fn new() -> Arc<Self> {
        Self::answering(Some(true))
    }

    pub fn saw_alert(&self, needle: &str) -> bool {
        self.alerts.lock().iter().any(|a| a.contains(needle))
    }

    pub fn count_alerts(&self, needle: &str) -> usize {
        self.alerts.lock().iter().filter(|a| a.contains(needle)).count()
    }

    pub fn windows_shown(&self) -> usize {
        self.windows_shown.load(Ordering::SeqCst)
    }
}

impl Host for FakeHost {
    fn emit(&self, event: HostEvent) {
        match event {
            HostEvent::AlertMsg(msg) => self.alerts.lock().push(msg),
            HostEvent::Init(payload) => self.inits.lock().push(payload),
        }
    }

    fn error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn confirm(&self, _title: &str, _message: &str) -> Result<bool> {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        self.answer.ok_or_else(|| Error::host_failed("no display"))
    }

    fn show_window(&self) {
        self.windows_shown.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Controller settings rooted at `dir` with no countdown
pub fn quick_config(dir: &Path) -> ControllerConfig {
    ControllerConfig {
        config_dir: dir.to_path_buf(),
        countdown_secs: 0,
        ..Default::default()
    }
}

/// Poll `cond` until it holds or `timeout` passes
pub fn wait_for(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
