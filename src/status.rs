//! Daemon status responses and the readiness predicate.
//!
//! A status response is a decoded key-value structure with an optional
//! numeric `code` and optional `message`. No `code`, or a `code` other than
//! the reserved "still starting" sentinel, means the daemon is ready.

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;

/// Fallback progress text when a starting daemon reports no message.
pub const UNKNOWN_PROGRESS: &str = "???";

/// Decoded response to a daemon status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Status code; absent on a fully started daemon.
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable progress or error message.
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    /// A response carrying no code at all (daemon fully started).
    #[must_use]
    pub const fn ready() -> Self {
        Self {
            code: None,
            message: None,
        }
    }

    /// A "still starting" response with the given progress message.
    #[must_use]
    pub fn starting(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: Some(message.into()),
        }
    }

    /// Whether this response carries the reserved "still starting" code.
    #[must_use]
    pub fn is_still_starting(&self, reserved_code: i64) -> bool {
        self.code == Some(reserved_code)
    }

    /// Progress text for display, defaulting to [`UNKNOWN_PROGRESS`].
    #[must_use]
    pub fn progress_text(&self) -> &str {
        self.message.as_deref().unwrap_or(UNKNOWN_PROGRESS)
    }

    /// Decode a JSON status document. Unknown keys are ignored, so the
    /// full `getinfo` payload of a running daemon decodes to a ready
    /// response (no `code` field present).
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Recognize the plain-text error form the companion CLI prints on
    /// stderr while the daemon is warming up:
    ///
    /// ```text
    /// error code: -28
    /// error message:
    /// Loading block index...
    /// ```
    ///
    /// Returns `None` when the text does not follow that shape.
    #[must_use]
    pub fn from_error_text(raw: &str) -> Option<Self> {
        let mut lines = raw.lines();
        let code_line = lines.next()?.trim();
        let code = code_line.strip_prefix("error code:")?.trim().parse().ok()?;
        let message = match lines.next().map(str::trim) {
            Some("error message:") => {
                let rest: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
                if rest.is_empty() {
                    None
                } else {
                    Some(rest.join(" "))
                }
            }
            Some(other) if !other.is_empty() => Some(other.to_string()),
            _ => None,
        };
        Some(Self {
            code: Some(code),
            message,
        })
    }
}
