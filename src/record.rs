use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::{AppContext, DeviceInfo};
use crate::error::ShipError;

/// Log severity, mirroring the five level labels the collector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Priority {
    /// Maps a raw integer level from the host logging facade. Verbose and
    /// debug both collapse to DEBUG. An unknown value is a caller contract
    /// violation and fails loudly rather than being shipped mislabelled.
    pub fn from_raw(raw: i32) -> Result<Self, ShipError> {
        match raw {
            2 | 3 => Ok(Priority::Debug),
            4 => Ok(Priority::Info),
            5 => Ok(Priority::Warn),
            6 => Ok(Priority::Error),
            7 => Ok(Priority::Critical),
            other => Err(ShipError::ConfigError(format!(
                "Priority {} does not exist",
                other
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Debug => "DEBUG",
            Priority::Info => "INFO",
            Priority::Warn => "WARN",
            Priority::Error => "ERROR",
            Priority::Critical => "CRITICAL",
        }
    }
}

/// Description of an error attached to a log event: type name, message,
/// stack frames, and at most one nested cause.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub type_name: String,
    pub message: String,
    pub stack_frames: Vec<String>,
    pub cause: Option<CauseInfo>,
}

#[derive(Debug, Clone)]
pub struct CauseInfo {
    pub message: String,
    pub stack_frames: Vec<String>,
}

/// One captured log event, immutable once created.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub priority: Priority,
    pub tag: Option<String>,
    pub message: String,
    pub error: Option<ErrorInfo>,
}

impl LogEvent {
    pub fn new(
        priority: Priority,
        tag: Option<String>,
        message: String,
        error: Option<ErrorInfo>,
    ) -> Self {
        Self {
            priority,
            tag,
            message,
            error,
        }
    }
}

/// The wire-ready document for one event. Built once; retries reuse the
/// same record, so the `event.created` timestamp never changes across
/// attempts.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    app: AppBlock,
    android_device: String,
    android_version: String,
    event: EventBlock,
    level: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<ExceptionBlock>,
}

#[derive(Debug, Clone, Serialize)]
struct AppBlock {
    project: String,
    environment: String,
    version: String,
}

#[derive(Debug, Clone, Serialize)]
struct EventBlock {
    created: String,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ExceptionBlock {
    data: ExceptionData,
}

#[derive(Debug, Clone, Serialize)]
struct ExceptionData {
    message: String,
    stacktrace: String,
    // Serialized as explicit null when the error has no cause.
    previous: Option<CauseData>,
}

#[derive(Debug, Clone, Serialize)]
struct CauseData {
    message: String,
    stacktrace: String,
}

impl LogRecord {
    /// Pure transformation of one event plus static metadata into the
    /// collector's document shape. `created` is the build-time timestamp,
    /// formatted as `yyyy-MM-ddTHH:mm:ss±ZZZZ`.
    pub fn build(
        event: &LogEvent,
        context: &AppContext,
        device: &DeviceInfo,
        created: DateTime<Local>,
    ) -> Self {
        let message = match (&event.error, &event.tag) {
            (Some(error), _) => format!("{}: {}", error.type_name, error.message),
            (None, Some(tag)) => format!("{}: {}", tag, event.message),
            (None, None) => event.message.clone(),
        };

        let exception = event.error.as_ref().map(|error| ExceptionBlock {
            data: ExceptionData {
                message: error.message.clone(),
                stacktrace: error.stack_frames.join("\n"),
                previous: error.cause.as_ref().map(|cause| CauseData {
                    message: cause.message.clone(),
                    stacktrace: cause.stack_frames.join("\n"),
                }),
            },
        });

        Self {
            app: AppBlock {
                project: context.app_name.clone(),
                environment: context.environment.clone(),
                version: context.version_string(),
            },
            android_device: device.device_string(),
            android_version: device.version_string(),
            event: EventBlock {
                created: created.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
                kind: if event.error.is_some() {
                    "exception"
                } else {
                    "log"
                },
            },
            level: event.priority.label(),
            message,
            exception,
        }
    }
}
