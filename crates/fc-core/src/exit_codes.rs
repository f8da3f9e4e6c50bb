//! Exit codes for the fc-core CLI.
//!
//! Exit codes communicate the outcome without requiring output parsing.

/// Exit codes for fc-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Everything succeeded
    Clean = 0,

    /// One or more script steps failed
    StepsFailed = 1,

    /// Request rejected: bad input, unknown concept, or illegal transition
    RequestRejected = 2,

    /// Configuration error
    ConfigError = 10,

    /// I/O error (unreadable script, broken stdout)
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Check if this exit code indicates success.
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Map an error that aborted the whole command.
    pub fn for_error(err: &fc_common::Error) -> Self {
        use fc_common::Error;
        match err {
            Error::Config(_) => ExitCode::ConfigError,
            Error::Io(_) | Error::Json(_) => ExitCode::IoError,
            Error::Validation(_)
            | Error::NotFound { .. }
            | Error::InvalidState(_)
            | Error::InvalidTransition { .. } => ExitCode::RequestRejected,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
