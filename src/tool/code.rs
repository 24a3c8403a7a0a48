// ABOUTME: Defines the closed set of outcome codes and their default messages.
// ABOUTME: Codes are status-agnostic; raising sites pick the severity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable outcome code carried by every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Ok,
    ValidationError,
    NotLoggedIn,
    CaptchaRequired,
    RateLimited,
    UserActionRequired,
    SelectorChanged,
    NavigationTimeout,
    ActionUnconfirmed,
    TemporaryFailure,
    UnsupportedInput,
    UnknownError,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 12] = [
        ErrorCode::Ok,
        ErrorCode::ValidationError,
        ErrorCode::NotLoggedIn,
        ErrorCode::CaptchaRequired,
        ErrorCode::RateLimited,
        ErrorCode::UserActionRequired,
        ErrorCode::SelectorChanged,
        ErrorCode::NavigationTimeout,
        ErrorCode::ActionUnconfirmed,
        ErrorCode::TemporaryFailure,
        ErrorCode::UnsupportedInput,
        ErrorCode::UnknownError,
    ];

    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "OK",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotLoggedIn => "NOT_LOGGED_IN",
            ErrorCode::CaptchaRequired => "CAPTCHA_REQUIRED",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::UserActionRequired => "USER_ACTION_REQUIRED",
            ErrorCode::SelectorChanged => "SELECTOR_CHANGED",
            ErrorCode::NavigationTimeout => "NAVIGATION_TIMEOUT",
            ErrorCode::ActionUnconfirmed => "ACTION_UNCONFIRMED",
            ErrorCode::TemporaryFailure => "TEMPORARY_FAILURE",
            ErrorCode::UnsupportedInput => "UNSUPPORTED_INPUT",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Message used when neither the handler nor the error supplies one.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Ok => "Operation completed successfully",
            ErrorCode::ValidationError => "Input failed validation",
            ErrorCode::NotLoggedIn => "Session is not authenticated",
            ErrorCode::CaptchaRequired => "A CAPTCHA must be solved by a person",
            ErrorCode::RateLimited => "The site is rate limiting requests; wait before retrying",
            ErrorCode::UserActionRequired => "Manual action is required before continuing",
            ErrorCode::SelectorChanged => "Page structure changed; target element not found",
            ErrorCode::NavigationTimeout => "Page navigation timed out",
            ErrorCode::ActionUnconfirmed => {
                "The action could not be confirmed; verify before retrying"
            }
            ErrorCode::TemporaryFailure => "A temporary failure occurred; retry may succeed",
            ErrorCode::UnsupportedInput => "The requested operation or input is not supported",
            ErrorCode::UnknownError => "An unexpected error occurred",
        }
    }

    /// Whether a failure with this code warrants screenshot/page-dump capture.
    ///
    /// Only codes that point at the page itself qualify; human-gated codes
    /// such as CAPTCHA never trigger capture.
    pub fn triggers_diagnostics(&self) -> bool {
        matches!(
            self,
            ErrorCode::SelectorChanged | ErrorCode::NavigationTimeout
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
