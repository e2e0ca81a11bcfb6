//! Session controller - mode state machine, countdown and hook dispatch
//!
//! A run owns two activities: the hook dispatch loop on the caller's thread
//! and a session worker thread (countdown, then gather or exec). The loop
//! turns the cancel hotkey into the shared [`CancelToken`] and forwards clicks
//! to the recorder; the worker reports back over a channel and is joined
//! before `start` returns.

use crate::events::RecordedSequence;
use crate::host::{Host, HostEvent, InitPayload, ModeEnum};
use crate::recorder::{RecordingSession, RecordingStats};
use crate::replay::{ReplayConfig, ReplayExit, ReplaySession, ReplayStats};
use crate::storage::{ConfigStore, DEFAULT_CONFIG_DIR};
use autoclick_core::{CancelToken, Error, ErrorCode, InputEvent, InputHook, InputInjector, Result};
use crossbeam_channel::{bounded, never, select, unbounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const DEFAULT_CONFIG_NAME: &str = "mouse.txt";
pub const DEFAULT_MIN_INTERVAL_MS: i64 = 500;
pub const COUNTDOWN_SECS: u32 = 3;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
// How long a finished bounded replay waits for its own cancel key tap
const HOTKEY_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Gather,
    Exec,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Gather, Mode::Exec];

    pub fn key(&self) -> &'static str {
        match self {
            Mode::Gather => "gather",
            Mode::Exec => "exec",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mode::Gather => "Gather",
            Mode::Exec => "Exec",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Mode::ALL
            .into_iter()
            .find(|m| m.key() == s)
            .ok_or_else(|| Error::invalid_mode(s))
    }
}

/// Run request as sent by the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParams {
    pub mode: String,
    /// Empty keeps the current config name
    #[serde(default)]
    pub config_name: String,
    #[serde(default)]
    pub min_interval: i64,
    /// 0 repeats until cancelled
    #[serde(default)]
    pub cycle: u32,
}

/// Settings of a single run, fixed once it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: Mode,
    pub config_name: String,
    pub min_interval_ms: i64,
    pub cycle_count: u32,
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub config_dir: PathBuf,
    /// Config used when a run request leaves the name empty
    pub config_name: String,
    pub min_interval_ms: i64,
    /// Seconds counted down before a session starts
    pub countdown_secs: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_name: DEFAULT_CONFIG_NAME.to_string(),
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
            countdown_secs: COUNTDOWN_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    Completed,
    Failed,
}

/// `Stopped` is passed through on the way back to `Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    CountingDown,
    Running,
    Stopped(StopReason),
}

/// What the session worker got done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionReport {
    /// Cancelled during the countdown
    NotStarted,
    Gathered(RecordingStats),
    Replayed(ReplayStats),
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The user kept an existing recording; nothing ran
    Declined,
    Cancelled(SessionReport),
    /// A bounded replay ran all its cycles
    Completed(SessionReport),
    Failed(Error),
}

pub struct SessionController {
    config: ControllerConfig,
    store: ConfigStore,
    hook: Arc<dyn InputHook>,
    injector: Arc<Mutex<Box<dyn InputInjector>>>,
    host: Arc<dyn Host>,
    cancel: CancelToken,
    phase: Arc<Mutex<Phase>>,
    last_stop: Option<StopReason>,
}

impl SessionController {
    pub fn new(
        config: ControllerConfig,
        hook: Arc<dyn InputHook>,
        injector: Box<dyn InputInjector>,
        host: Arc<dyn Host>,
    ) -> Self {
        Self {
            store: ConfigStore::new(&config.config_dir),
            config,
            hook,
            injector: Arc::new(Mutex::new(injector)),
            host,
            cancel: CancelToken::new(),
            phase: Arc::new(Mutex::new(Phase::Idle)),
            last_stop: None,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    /// How the most recent run ended
    pub fn last_stop(&self) -> Option<StopReason> {
        self.last_stop
    }

    /// Token shared with the active session; setting it stops the run
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn mode_enum_list() -> Vec<ModeEnum> {
        Mode::ALL
            .iter()
            .map(|m| ModeEnum {
                key: m.key().to_string(),
                value: format!("{} mode", m.title()),
            })
            .collect()
    }

    /// Prepare the config directory and send the shell its startup data
    pub fn ready(&self) -> Result<InitPayload> {
        let files = self.store.list().map_err(|e| self.surface(e))?;
        let payload = InitPayload {
            config_name: self.config.config_name.clone(),
            config_file_list: files,
            mode_enum_list: Self::mode_enum_list(),
            min_interval: self.config.min_interval_ms,
        };
        self.host.emit(HostEvent::Init(payload.clone()));
        Ok(payload)
    }

    /// Load a recording without running it
    pub fn load(&self, name: &str) -> Result<RecordedSequence> {
        self.store.load(&self.store.path(name))
    }

    /// Run one session to the end. Returns once the hook loop has exited and
    /// the worker has been joined.
    pub fn start(&mut self, params: RunParams) -> Result<RunOutcome> {
        let mode: Mode = params.mode.parse().map_err(|e| self.surface(e))?;
        if !params.config_name.is_empty() {
            self.config.config_name = params.config_name.clone();
        }
        self.config.min_interval_ms = params.min_interval;

        let session = SessionConfig {
            mode,
            config_name: self.config.config_name.clone(),
            min_interval_ms: params.min_interval,
            cycle_count: params.cycle,
        };
        let path = self.store.path(&session.config_name);
        info!(
            mode = mode.key(),
            config = %session.config_name,
            min_interval_ms = session.min_interval_ms,
            cycles = session.cycle_count,
            "starting run"
        );

        if mode == Mode::Gather && !self.prepare_overwrite(&path)? {
            self.host.alert("Gathering cancelled");
            return Ok(RunOutcome::Declined);
        }

        self.cancel.reset();
        let events = self.hook.subscribe().map_err(|e| self.surface(e))?;
        self.set_phase(Phase::CountingDown);

        let (rec_tx, rec_rx) = unbounded();
        let (done_tx, done_rx) = bounded(1);
        let worker = Worker {
            session: session.clone(),
            path,
            store: self.store.clone(),
            host: self.host.clone(),
            injector: self.injector.clone(),
            cancel: self.cancel.clone(),
            phase: self.phase.clone(),
            countdown_secs: self.config.countdown_secs,
        };
        let handle = match worker.spawn(rec_rx, done_tx) {
            Ok(handle) => handle,
            Err(e) => {
                self.hook.unsubscribe();
                self.last_stop = Some(StopReason::Failed);
                self.set_phase(Phase::Idle);
                return Err(self.surface(e));
            }
        };

        let (result, hotkey_seen) = self.dispatch(mode, &events, rec_tx, &done_rx);
        let reason = match &result {
            Err(_) => StopReason::Failed,
            Ok(SessionReport::Replayed(ReplayStats { exit: ReplayExit::CycleLimit, .. })) => {
                if !hotkey_seen {
                    self.await_hotkey(&events);
                }
                StopReason::Completed
            }
            Ok(_) => StopReason::Cancelled,
        };
        self.stop(reason, handle);

        Ok(match result {
            Err(e) => RunOutcome::Failed(e),
            Ok(report) if reason == StopReason::Completed => RunOutcome::Completed(report),
            Ok(report) => RunOutcome::Cancelled(report),
        })
    }

    /// Hook event loop; returns the worker's result and whether the cancel
    /// key came through the hook
    fn dispatch(
        &self,
        mode: Mode,
        events: &Receiver<InputEvent>,
        rec_tx: Sender<InputEvent>,
        done_rx: &Receiver<Result<SessionReport>>,
    ) -> (Result<SessionReport>, bool) {
        let closed = never();
        let mut hook_open = true;
        let mut hotkey_seen = false;
        loop {
            let source = if hook_open { events } else { &closed };
            select! {
                recv(source) -> msg => match msg {
                    Ok(event) if event.is_cancel_key() => {
                        hotkey_seen = true;
                        if self.cancel.cancel() {
                            info!("cancel hotkey pressed");
                        }
                    }
                    Ok(event) => {
                        if mode == Mode::Gather
                            && self.phase() == Phase::Running
                            && !self.cancel.is_cancelled()
                        {
                            let _ = rec_tx.send(event);
                        }
                    }
                    Err(_) => {
                        warn!("input hook disconnected, stopping");
                        self.cancel.cancel();
                        hook_open = false;
                    }
                },
                recv(done_rx) -> msg => {
                    let result = msg.unwrap_or_else(|_| {
                        Err(Error::new(ErrorCode::Unknown, "Session worker exited unexpectedly"))
                    });
                    return (result, hotkey_seen);
                }
            }
        }
    }

    /// Give the cancel key tapped by a finished replay time to come back
    /// through the hook, so it is not left queued for the next run.
    fn await_hotkey(&self, events: &Receiver<InputEvent>) {
        let deadline = Instant::now() + HOTKEY_GRACE;
        while let Ok(event) = events.recv_deadline(deadline) {
            if event.is_cancel_key() {
                debug!("observed self-injected cancel key");
                return;
            }
        }
        warn!("cancel key tap was not observed by the hook");
    }

    fn stop(&mut self, reason: StopReason, handle: JoinHandle<()>) {
        self.cancel.cancel();
        self.hook.unsubscribe();
        if handle.join().is_err() {
            error!("session worker panicked");
        }
        self.set_phase(Phase::Stopped(reason));
        info!(?reason, "run stopped");

        if reason != StopReason::Failed {
            self.host.show_window();
            self.host.alert("Stopped: the run has exited");
        }
        self.last_stop = Some(reason);
        self.set_phase(Phase::Idle);
    }

    fn prepare_overwrite(&self, path: &Path) -> Result<bool> {
        if !self.store.exists(path) {
            return Ok(true);
        }
        let overwrite = self
            .host
            .confirm("Notice", "Config file already exists, overwrite?")
            .map_err(|e| self.surface(e))?;
        if !overwrite {
            info!(path = %path.display(), "overwrite declined");
            return Ok(false);
        }
        self.store.delete(path).map_err(|e| self.surface(e))?;
        Ok(true)
    }

    fn set_phase(&self, phase: Phase) {
        debug!(?phase, "phase");
        *self.phase.lock() = phase;
    }

    fn surface(&self, e: Error) -> Error {
        error!(%e, "run failed");
        self.host.error(&e.message);
        e
    }
}

/// Everything the session thread needs, detached from the controller
struct Worker {
    session: SessionConfig,
    path: PathBuf,
    store: ConfigStore,
    host: Arc<dyn Host>,
    injector: Arc<Mutex<Box<dyn InputInjector>>>,
    cancel: CancelToken,
    phase: Arc<Mutex<Phase>>,
    countdown_secs: u32,
}

impl Worker {
    fn spawn(
        self,
        rec_rx: Receiver<InputEvent>,
        done_tx: Sender<Result<SessionReport>>,
    ) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("autoclick-{}", self.session.mode.key()))
            .spawn(move || {
                let result = self.run(&rec_rx);
                if let Err(e) = &result {
                    error!(%e, "session failed");
                    self.host.error(&e.message);
                }
                let _ = done_tx.send(result);
            })
            .map_err(|e| Error::new(ErrorCode::Unknown, format!("Cannot start session worker: {}", e)))
    }

    fn run(&self, rec_rx: &Receiver<InputEvent>) -> Result<SessionReport> {
        if !self.countdown() {
            return Ok(SessionReport::NotStarted);
        }
        *self.phase.lock() = Phase::Running;

        let host = &*self.host;
        match self.session.mode {
            Mode::Gather => {
                host.alert("Gathering: click the left mouse button, press q to stop");
                RecordingSession::new(&self.store, &self.path, self.session.min_interval_ms, host)
                    .run(rec_rx, &self.cancel)
                    .map(SessionReport::Gathered)
            }
            Mode::Exec => {
                let sequence = self.store.load(&self.path)?;
                let config = ReplayConfig {
                    min_interval_ms: self.session.min_interval_ms,
                    cycle_limit: self.session.cycle_count,
                };
                let mut injector = self.injector.lock();
                ReplaySession::new(sequence, config, host, self.cancel.clone())
                    .run(&mut **injector)
                    .map(SessionReport::Replayed)
            }
        }
    }

    /// One alert per remaining second. `false` if cancelled meanwhile.
    fn countdown(&self) -> bool {
        let title = self.session.mode.title();
        for remaining in (1..=self.countdown_secs).rev() {
            self.host.alert(&format!(
                "{} starts in {}s, press q to stop, countdown: {}",
                title, self.countdown_secs, remaining
            ));
            if self.cancel.wait_timeout(COUNTDOWN_TICK) {
                return false;
            }
        }
        if self.cancel.is_cancelled() {
            return false;
        }
        self.host.alert(&format!("{} running, press q to stop", title));
        true
    }
}
