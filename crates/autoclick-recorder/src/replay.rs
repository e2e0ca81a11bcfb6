//! Exec mode: drive the injector through a recorded sequence in cycles

use crate::events::RecordedSequence;
use crate::host::Host;
use autoclick_core::{CancelToken, Error, InputInjector, MouseButton, Result, CANCEL_KEY};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Wait used for steps with no recorded interval
    pub min_interval_ms: i64,
    /// Number of cycles to run, 0 for no limit
    pub cycle_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayExit {
    Cancelled,
    /// Cycle limit reached; the cancel key was tapped
    CycleLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Fully completed cycles
    pub cycles: u32,
    pub clicks: u64,
    pub exit: ReplayExit,
}

pub struct ReplaySession<'a> {
    sequence: RecordedSequence,
    config: ReplayConfig,
    host: &'a dyn Host,
    cancel: CancelToken,
}

impl<'a> ReplaySession<'a> {
    pub fn new(
        sequence: RecordedSequence,
        config: ReplayConfig,
        host: &'a dyn Host,
        cancel: CancelToken,
    ) -> Self {
        Self { sequence, config, host, cancel }
    }

    pub fn run(&self, injector: &mut dyn InputInjector) -> Result<ReplayStats> {
        if self.sequence.is_empty() {
            return Err(Error::empty_config());
        }
        info!(
            steps = self.sequence.len(),
            cycle_limit = self.config.cycle_limit,
            "replaying"
        );

        let mut clicks = 0u64;
        let mut cycle = 0u32;
        loop {
            cycle += 1;
            if self.config.cycle_limit != 0 && cycle > self.config.cycle_limit {
                info!(cycles = cycle - 1, "cycle limit reached");
                injector.key_tap(CANCEL_KEY)?;
                return Ok(ReplayStats { cycles: cycle - 1, clicks, exit: ReplayExit::CycleLimit });
            }

            for (i, p) in self.sequence.positions.iter().enumerate() {
                if self.cancel.is_cancelled() {
                    return Ok(self.cancelled(cycle, clicks));
                }
                injector.move_smooth(p.x, p.y)?;
                injector.click(MouseButton::Left)?;
                clicks += 1;

                let wait = self.sequence.wait_after(i, self.config.min_interval_ms);
                debug!(cycle, step = i, x = p.x, y = p.y, wait, "clicked");
                if self.cancel.wait_timeout(Duration::from_millis(wait as u64)) {
                    return Ok(self.cancelled(cycle, clicks));
                }
                self.host.alert(&format!(
                    "Running: cycle {}, [X:{}, Y:{}] waited {}ms, press q to stop",
                    cycle, p.x, p.y, wait
                ));
            }
        }
    }

    fn cancelled(&self, cycle: u32, clicks: u64) -> ReplayStats {
        info!(cycle, clicks, "replay cancelled");
        ReplayStats { cycles: cycle - 1, clicks, exit: ReplayExit::Cancelled }
    }
}
