//! WDH-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, WdhError>;

/// Top-level error type for Wallet Daemon Helper.
#[derive(Debug, Error)]
pub enum WdhError {
    #[error("[WDH-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[WDH-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[WDH-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[WDH-2001] wallet call failure: {details}")]
    WalletCall { details: String },

    #[error("[WDH-2002] malformed status response: {details}")]
    MalformedStatus { details: String },

    #[error("[WDH-3001] failed to spawn {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[WDH-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[WDH-3101] daemon not ready after {waited_ms}ms")]
    StartupTimeout { waited_ms: u64 },

    #[error("[WDH-3102] startup cancelled while waiting for daemon")]
    Cancelled,

    #[error("[WDH-3103] daemon reported status code {code}: {message}")]
    NotReady { code: i64, message: String },

    #[error("[WDH-3201] shutdown failure: {details}")]
    Shutdown { details: String },

    #[error("[WDH-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl WdhError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "WDH-1001",
            Self::MissingConfig { .. } => "WDH-1002",
            Self::ConfigParse { .. } => "WDH-1003",
            Self::WalletCall { .. } => "WDH-2001",
            Self::MalformedStatus { .. } => "WDH-2002",
            Self::Spawn { .. } => "WDH-3001",
            Self::Io { .. } => "WDH-3002",
            Self::StartupTimeout { .. } => "WDH-3101",
            Self::Cancelled => "WDH-3102",
            Self::NotReady { .. } => "WDH-3103",
            Self::Shutdown { .. } => "WDH-3201",
            Self::Runtime { .. } => "WDH-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::WalletCall { .. } | Self::Io { .. } | Self::Runtime { .. }
        )
    }

    /// Convenience constructor for wallet-call failures.
    #[must_use]
    pub fn wallet_call(details: impl Into<String>) -> Self {
        Self::WalletCall {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for WdhError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedStatus {
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for WdhError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::WdhError;

    #[test]
    fn codes_are_stable_and_prefixed() {
        let errors = [
            WdhError::wallet_call("connection refused"),
            WdhError::Cancelled,
            WdhError::StartupTimeout { waited_ms: 5000 },
            WdhError::NotReady {
                code: -10,
                message: "loading block index".to_string(),
            },
        ];
        for error in errors {
            assert!(error.code().starts_with("WDH-"));
            assert!(error.to_string().contains(error.code()));
        }
    }

    #[test]
    fn communication_failures_are_retryable() {
        assert!(WdhError::wallet_call("timed out").is_retryable());
        assert!(!WdhError::Cancelled.is_retryable());
        assert!(
            !WdhError::NotReady {
                code: -1,
                message: String::new()
            }
            .is_retryable()
        );
    }
}
