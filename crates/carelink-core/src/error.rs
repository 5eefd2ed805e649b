// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Carelink chat client.

use thiserror::Error;

/// The primary error type used across all Carelink crates.
#[derive(Debug, Error)]
pub enum CarelinkError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Bearer token missing, invalid, or expired. Never retried.
    #[error("unauthorized: bearer token missing, invalid, or expired")]
    Unauthorized,

    /// The caller is not a participant in the appointment. Never retried.
    #[error("forbidden: not a participant in this appointment")]
    Forbidden,

    /// The requested resource does not exist on the server.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transient transport failure (connection, non-2xx status, bad body).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A network request exceeded the configured timeout.
    #[error("request timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Client-side input validation failed; nothing was sent to the server.
    #[error("validation error: {0}")]
    Validation(String),

    /// Messaging is not permitted for the current appointment state.
    #[error("chat unavailable: {0}")]
    ChatUnavailable(String),

    /// A send is already in flight for this chat view.
    #[error("a send is already in flight")]
    SendInFlight,

    /// A send failed after the optimistic insert. Carries the attempted
    /// content so the caller can restore the input field.
    #[error("failed to send message: {source}")]
    SendFailed {
        content: String,
        #[source]
        source: Box<CarelinkError>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CarelinkError {
    /// True for errors that polling may silently retry on the next tick.
    ///
    /// Auth and participation errors are permanent and must surface instead.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CarelinkError::Transport { .. } | CarelinkError::Timeout { .. }
        )
    }
}
