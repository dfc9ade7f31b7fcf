//! Notice types.

use serde::{Deserialize, Serialize};

/// User-facing notices emitted by controllers and services.
///
/// The view layer renders them as toasts; `Celebration` additionally plays the
/// confetti animation after a contribution is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    Success { message: String },
    Error { message: String },
    Info { message: String },
    Celebration,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice::Success {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice::Error {
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice::Info {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error { .. })
    }
}
