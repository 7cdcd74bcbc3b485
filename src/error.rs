use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    /// Network failure, timeout, or non-2xx response after exhausting
    /// credential rotation. `status` is the last upstream HTTP status, when
    /// one was received at all.
    #[error("Upstream request failed after {attempts} attempt(s): {message}")]
    Upstream {
        message: String,
        status: Option<u16>,
        attempts: u32,
    },

    /// Credential rotation exhausted with a rate-limit response last.
    #[error("Rate limit exceeded after {attempts} attempt(s)")]
    RateLimit { attempts: u32 },

    #[error("Parse error: {0}")]
    Parse(String),

    /// Every raw point was discarded during reconciliation; treated as a
    /// fetch failure for that metal.
    #[error("Empty series after filtering: {0}")]
    EmptySeries(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
