pub mod progress;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, warn};

use crate::error::AppError;

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::NoData { reason } => CommandError::new("NO_DATA", reason, None),
            AppError::NoTimeline { message } => CommandError::new("NO_TIMELINE", message, None),
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::Config { message } => CommandError::new("CONFIG_ERROR", message, None),
            AppError::Serialization(error) => {
                warn!(target: "app::command", error = %error, "payload could not be decoded");
                CommandError::new(
                    "INVALID_PAYLOAD",
                    "payload could not be decoded",
                    Some(serde_json::json!({
                        "line": error.line(),
                        "column": error.column(),
                        "reason": error.to_string(),
                    })),
                )
            }
            AppError::Yaml(error) => {
                warn!(target: "app::command", error = %error, "yaml configuration could not be decoded");
                CommandError::new("CONFIG_ERROR", error.to_string(), None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
