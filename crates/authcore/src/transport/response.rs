// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed handling of enveloped vs. raw API payloads.
//!
//! The console API sometimes wraps a payload in a `{"data": ...}` envelope
//! and sometimes returns it bare. Both shapes are one typed sum with a
//! single narrow unwrapping function; no per-call-site shape sniffing.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AuthError;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiPayload {
    Enveloped { data: Value },
    Raw(Value),
}

impl ApiPayload {
    /// Parse a response body. An empty body decodes as `Raw(Null)`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AuthError> {
        if bytes.is_empty() {
            return Ok(Self::Raw(Value::Null));
        }
        serde_json::from_slice(bytes).map_err(|e| AuthError::Decode(e.to_string()))
    }

    /// The payload itself, envelope removed.
    pub fn into_inner(self) -> Value {
        match self {
            Self::Enveloped { data } => data,
            Self::Raw(value) => value,
        }
    }
}
