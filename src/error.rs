//! Error types for talking to the launch API.

use thiserror::Error;

/// Anything that can go wrong while fetching a page of launches or a patch image.
///
/// The feed treats every variant the same way (log, keep state, clear loading);
/// the split only exists to make log lines useful.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Build a status error, keeping only a short prefix of the body for logs.
    pub fn status(status: reqwest::StatusCode, body: &str) -> Self {
        const MAX_BODY: usize = 200;
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((idx, _)) => format!("{}…", &body[..idx]),
            None => body.to_string(),
        };
        Self::Status { status, body }
    }
}
