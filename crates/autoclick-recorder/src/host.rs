//! Host port: the shell that shows status text, dialogs and the main window

use autoclick_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Label pair for one selectable mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeEnum {
    pub key: String,
    pub value: String,
}

/// Startup data the shell needs to render its controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    pub config_name: String,
    pub config_file_list: Vec<String>,
    pub mode_enum_list: Vec<ModeEnum>,
    pub min_interval: i64,
}

/// Fire-and-forget notifications for the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum HostEvent {
    #[serde(rename = "init")]
    Init(InitPayload),
    #[serde(rename = "alertMsg")]
    AlertMsg(String),
}

pub trait Host: Send + Sync {
    fn emit(&self, event: HostEvent);

    /// Modal error for unrecoverable failures
    fn error(&self, message: &str);

    /// Yes/no question. `Err` if the dialog itself could not be shown.
    fn confirm(&self, title: &str, message: &str) -> Result<bool>;

    /// Bring the host window to the foreground
    fn show_window(&self);

    fn alert(&self, message: &str) {
        self.emit(HostEvent::AlertMsg(message.to_string()));
    }
}

/// Headless host that writes everything to the log
#[derive(Debug, Clone, Default)]
pub struct LogHost {
    /// Answer given to every confirmation
    pub assume_yes: bool,
}

impl Host for LogHost {
    fn emit(&self, event: HostEvent) {
        match event {
            HostEvent::AlertMsg(msg) => info!("{}", msg),
            HostEvent::Init(payload) => info!(
                config = %payload.config_name,
                files = payload.config_file_list.len(),
                "init"
            ),
        }
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn confirm(&self, title: &str, message: &str) -> Result<bool> {
        info!(%title, answer = self.assume_yes, "{}", message);
        Ok(self.assume_yes)
    }

    fn show_window(&self) {
        debug!("no window to surface");
    }
}
