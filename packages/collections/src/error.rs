//! Error types for collection info retrieval.

use syncstore_http::Error as HttpError;

/// Message reported when a failed response's own error message can't be read.
pub const REQUEST_FAILURE_FALLBACK: &str = "failed to retrieve collection info or its error message";

/// Which stage of a collection info call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token's endpoint could not be turned into a request URI.
    Uri,
    /// No auth header could be derived from the token.
    AuthSetup,
    /// The server answered with a failure status.
    RequestFailure,
    /// The request produced no usable response.
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum CollectionInfoError {
    #[error("unable to get collection info URI from {endpoint:?}: {source}")]
    Uri {
        endpoint: String,
        #[source]
        source: HttpError,
    },

    #[error("unable to get collection info auth header provider: {source}")]
    AuthSetup {
        #[source]
        source: HttpError,
    },

    #[error("failed to retrieve collection info: {message}")]
    RequestFailure { status: u16, message: String },

    #[error("{}", REQUEST_FAILURE_FALLBACK)]
    RequestFailureUnreadable {
        status: u16,
        #[source]
        source: HttpError,
    },

    #[error("collection info request failed: {source}")]
    Transport {
        #[source]
        source: HttpError,
    },
}

impl CollectionInfoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CollectionInfoError::Uri { .. } => ErrorKind::Uri,
            CollectionInfoError::AuthSetup { .. } => ErrorKind::AuthSetup,
            CollectionInfoError::RequestFailure { .. }
            | CollectionInfoError::RequestFailureUnreadable { .. } => ErrorKind::RequestFailure,
            CollectionInfoError::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// HTTP status of the failed response, for request failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            CollectionInfoError::RequestFailure { status, .. }
            | CollectionInfoError::RequestFailureUnreadable { status, .. } => Some(*status),
            _ => None,
        }
    }
}
