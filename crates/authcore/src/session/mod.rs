// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session policy: idle and absolute timeout enforcement.

pub mod monitor;

use serde::{Deserialize, Serialize};

/// Observable state of the monitored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    IdleWarning,
    Expired,
}
