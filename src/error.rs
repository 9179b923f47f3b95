use thiserror::Error;

/// Every failure the toolkit can report.
///
/// Variants separate bad input (never worth retrying) from transport and
/// archive failures (often transient), see [`HelioError::is_retryable`].
#[derive(Debug, Error)]
pub enum HelioError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("network request failed: {0}")]
    Network(String),

    #[error("archive returned status {status}: {message}")]
    Archive { status: u16, message: String },

    #[error("no data available: {0}")]
    NoData(String),

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("i/o error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ephemeris error: {0}")]
    Ephemeris(String),

    #[error("ill-posed fit: {0}")]
    Fit(String),

    #[error("fit did not converge: {0}")]
    Convergence(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HelioError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn parse(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }

    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// True for failures where repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            HelioError::Network(_) => true,
            HelioError::Archive { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for HelioError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => HelioError::Archive {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => HelioError::Network(err.to_string()),
        }
    }
}

pub type HelioResult<T> = Result<T, HelioError>;
