// ABOUTME: Defines the four terminal outcome states of a tool call.
// ABOUTME: Each status owns the default code used when none is supplied.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ErrorCode;

/// Terminal, mutually exclusive outcome of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    /// The operation did what was asked.
    Success,
    /// A person must intervene out-of-band (CAPTCHA, rate limit).
    NeedUserAction,
    /// Retrying as-is may succeed.
    RetryableError,
    /// Retrying without external remediation will not help.
    FatalError,
}

impl ToolStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::NeedUserAction => "need_user_action",
            ToolStatus::RetryableError => "retryable_error",
            ToolStatus::FatalError => "fatal_error",
        }
    }

    /// Code used when a result with this status carries no explicit code.
    pub fn default_code(&self) -> ErrorCode {
        match self {
            ToolStatus::Success => ErrorCode::Ok,
            ToolStatus::NeedUserAction => ErrorCode::UserActionRequired,
            ToolStatus::RetryableError => ErrorCode::TemporaryFailure,
            ToolStatus::FatalError => ErrorCode::UnknownError,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolStatus::Success)
    }
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
