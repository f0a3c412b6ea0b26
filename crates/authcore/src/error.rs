// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Error taxonomy for the authentication core.
///
/// The request pipeline absorbs 401s it can recover through a token
/// renewal; everything else surfaces unchanged, carrying the original
/// status and attempt count so the host can render a message. The core
/// itself never renders anything.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 401-class response that could not be recovered by a renewal.
    #[error("unauthenticated (status {status})")]
    Unauthenticated { status: u16 },

    /// 403-class response: authenticated but not allowed. Never retried,
    /// never triggers a renewal.
    #[error("forbidden (status {status})")]
    Forbidden { status: u16 },

    /// Transport-level failure (connect, timeout, no response) after
    /// exhausting the retry budget.
    #[error("transport failure after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Non-transient HTTP failure from the API, propagated unchanged.
    #[error("api error (status {status}, {attempts} attempt(s)): {message}")]
    Api { status: u16, attempts: u32, message: String },

    /// Token renewal failed; the session has been terminated.
    #[error("token refresh failed: {reason}")]
    RefreshFailed { reason: String },

    /// No refresh token, so no session to renew.
    #[error("no active session")]
    NoSession,

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}
