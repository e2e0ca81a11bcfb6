//! Gather mode: turn left clicks into position and interval records

use crate::events::{Point, Record};
use crate::host::Host;
use crate::storage::ConfigStore;
use autoclick_core::{CancelToken, InputEvent, InputKind, MouseButton, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// How often an idle session re-checks the cancel token
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordingStats {
    pub positions: usize,
    pub intervals: usize,
}

/// A click that made it into the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedClick {
    pub point: Point,
    /// Interval written before this point, 0 for the first click
    pub interval_ms: i64,
}

pub struct RecordingSession<'a> {
    store: &'a ConfigStore,
    path: PathBuf,
    min_interval_ms: i64,
    last_click_ms: Option<i64>,
    host: &'a dyn Host,
    stats: RecordingStats,
}

impl<'a> RecordingSession<'a> {
    pub fn new(
        store: &'a ConfigStore,
        path: impl Into<PathBuf>,
        min_interval_ms: i64,
        host: &'a dyn Host,
    ) -> Self {
        Self {
            store,
            path: path.into(),
            min_interval_ms: min_interval_ms.max(0),
            last_click_ms: None,
            host,
            stats: RecordingStats::default(),
        }
    }

    pub fn stats(&self) -> RecordingStats {
        self.stats
    }

    /// Record one event. Anything but a left mouse-down is ignored.
    pub fn handle(&mut self, event: &InputEvent) -> Result<Option<CapturedClick>> {
        let InputKind::MouseDown { button: MouseButton::Left, x, y } = event.kind else {
            return Ok(None);
        };

        let mut interval_ms = 0;
        if let Some(last) = self.last_click_ms {
            interval_ms = (event.at_ms - last).max(self.min_interval_ms);
            self.store.append(&self.path, &Record::Interval(interval_ms))?;
            self.stats.intervals += 1;
        }

        let point = Point::new(x, y);
        self.store.append(&self.path, &Record::Position(point))?;
        self.stats.positions += 1;
        self.last_click_ms = Some(event.at_ms);

        debug!(x, y, interval_ms, "captured click");
        self.host.alert(&format!(
            "Gathering: clicked x:{}, y:{}, interval:{}ms, press q to stop",
            x, y, interval_ms
        ));
        Ok(Some(CapturedClick { point, interval_ms }))
    }

    /// Consume events until the channel closes or the token is set, then
    /// drain whatever was already queued
    pub fn run(mut self, rx: &Receiver<InputEvent>, cancel: &CancelToken) -> Result<RecordingStats> {
        info!(path = %self.path.display(), min_interval_ms = self.min_interval_ms, "gathering");
        while !cancel.is_cancelled() {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    self.handle(&event)?;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // clicks delivered before the stop still count
        while let Ok(event) = rx.try_recv() {
            self.handle(&event)?;
        }
        info!(
            positions = self.stats.positions,
            intervals = self.stats.intervals,
            "gathering finished"
        );
        Ok(self.stats)
    }
}
