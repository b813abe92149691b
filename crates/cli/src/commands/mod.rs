pub mod ask;
pub mod chat;
pub mod config;
pub mod menu;
pub mod phrases;

use foodie_core::config::{AppConfig, LoadOptions};
use foodie_core::errors::ApplicationError;
use serde::Serialize;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(&payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), error.exit_code())
    }

    /// Wraps a command-specific JSON payload.
    pub fn json(exit_code: u8, payload: &impl Serialize) -> Self {
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Interactive commands render their own output.
    pub fn quiet() -> Self {
        Self { exit_code: 0, output: String::new() }
    }
}

pub(crate) fn load_config(options: &LoadOptions) -> Result<AppConfig, ApplicationError> {
    AppConfig::load(options.clone())
        .map_err(|error| ApplicationError::Configuration(format!("configuration issue: {error}")))
}

pub(crate) fn build_runtime() -> Result<Runtime, ApplicationError> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        ApplicationError::Runtime(format!("failed to initialize async runtime: {error}"))
    })
}

fn serialize_payload(payload: &impl Serialize) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
