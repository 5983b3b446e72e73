//! Error types for the call monitor.

/// Top-level error type for a monitor run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Notify error: {0}")]
    Notify(#[from] NotifyError),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl Error {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,
            Error::Fetch(_) => 3,
            Error::Notify(_) => 4,
            Error::Client(_) => 1,
        }
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Call-log fetch errors.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    Decode { provider: String, reason: String },
}

/// Notification delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Request to {provider} failed: {reason}")]
    Request { provider: String, reason: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },
}

/// Result type alias for the monitor.
pub type Result<T> = std::result::Result<T, Error>;
