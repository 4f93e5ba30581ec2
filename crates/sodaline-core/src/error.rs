//! Error type for catalog fetch operations

use std::io;

/// Error from a single catalog request or artifact write.
///
/// `NotFound` is dataset-scoped and recoverable (the orchestrator turns it
/// into a permanent skip); everything else aborts the current run.
#[derive(Debug)]
pub enum FetchError {
    /// 404 from the catalog: the dataset does not exist (or was removed)
    NotFound,
    /// Any other non-2xx response, a transport failure, a request timeout,
    /// or an unparseable response body
    Remote {
        status: Option<u16>,
        message: String,
    },
    /// Local I/O failure while persisting an artifact or checkpoint
    Io(io::Error),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found (404)"),
            Self::Remote {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Remote {
                status: None,
                message,
            } => write!(f, "request failed: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl FetchError {
    /// Map a reqwest error, distinguishing 404 from other failures.
    ///
    /// Timeouts carry no status and land in `Remote { status: None }`.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        match e.status().map(|s| s.as_u16()) {
            Some(404) => Self::NotFound,
            status => Self::Remote {
                status,
                message: e.to_string(),
            },
        }
    }

    /// A 200 response whose body failed to parse as JSON.
    pub fn bad_body(e: &serde_json::Error) -> Self {
        Self::Remote {
            status: None,
            message: format!("invalid JSON body: {e}"),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl From<io::Error> for FetchError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
