//! Collection info retrieval.
//!
//! One call resolves the token's storage endpoint, signs a GET for
//! `info/collections` and reports the collection names through exactly one
//! of three outcomes. Everything runs on the calling thread: the call blocks
//! for the whole network round trip and the callback fires before it
//! returns, so don't call it from an async runtime worker or a UI thread.

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use syncstore_http::{FetchOutcome, HttpExecutor, JsonRecordFetcher, ReqwestExecutor};

use crate::error::CollectionInfoError;
use crate::token::TokenServerToken;

/// Path appended to the storage endpoint.
pub const COLLECTION_INFO_PATH: &str = "/info/collections";

/// Receives the result of a collection info call.
///
/// Exactly one method is called, exactly once, per call.
pub trait CollectionInfoCallback {
    fn on_success(&mut self, collection_names: HashSet<String>);

    /// The server was reached and rejected the request.
    fn on_request_failure(&mut self, error: CollectionInfoError);

    /// Bad input or no usable response.
    fn on_error(&mut self, error: CollectionInfoError);
}

/// A [`CollectionInfoCallback`] assembled from three closures.
pub struct CollectionInfoHandlers<S, R, E> {
    pub on_success: S,
    pub on_request_failure: R,
    pub on_error: E,
}

impl<S, R, E> CollectionInfoCallback for CollectionInfoHandlers<S, R, E>
where
    S: FnMut(HashSet<String>),
    R: FnMut(CollectionInfoError),
    E: FnMut(CollectionInfoError),
{
    fn on_success(&mut self, collection_names: HashSet<String>) {
        (self.on_success)(collection_names)
    }

    fn on_request_failure(&mut self, error: CollectionInfoError) {
        (self.on_request_failure)(error)
    }

    fn on_error(&mut self, error: CollectionInfoError) {
        (self.on_error)(error)
    }
}

/// Terminal state of one collection info call.
#[derive(Debug)]
#[must_use]
pub enum CollectionInfoOutcome {
    Success(HashSet<String>),
    RequestFailure(CollectionInfoError),
    Error(CollectionInfoError),
}

impl CollectionInfoOutcome {
    /// Hand the outcome to the matching callback method.
    pub fn deliver<C: CollectionInfoCallback + ?Sized>(self, callback: &mut C) {
        match self {
            CollectionInfoOutcome::Success(names) => callback.on_success(names),
            CollectionInfoOutcome::RequestFailure(e) => callback.on_request_failure(e),
            CollectionInfoOutcome::Error(e) => callback.on_error(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CollectionInfoOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<HashSet<String>, CollectionInfoError> {
        match self {
            CollectionInfoOutcome::Success(names) => Ok(names),
            CollectionInfoOutcome::RequestFailure(e) | CollectionInfoOutcome::Error(e) => Err(e),
        }
    }
}

/// Build `<endpoint>/info/collections` for a token.
///
/// A trailing `/` on the endpoint is not doubled.
pub fn collection_info_uri(token: &TokenServerToken) -> Result<Url, CollectionInfoError> {
    let uri_error = |source: syncstore_http::Error| CollectionInfoError::Uri {
        endpoint: token.endpoint.clone(),
        source,
    };

    let base = token.server_uri().map_err(uri_error)?;
    let uri = format!(
        "{}{}",
        base.as_str().trim_end_matches('/'),
        COLLECTION_INFO_PATH
    );
    Url::parse(&uri).map_err(|e| uri_error(e.into()))
}

/// Lists the collections of sync accounts.
///
/// Holds only the HTTP executor, so one accessor can serve concurrent calls
/// from several threads.
pub struct CollectionInfoAccessor<E = ReqwestExecutor> {
    executor: E,
}

impl CollectionInfoAccessor<ReqwestExecutor> {
    /// Accessor backed by reqwest with the given request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, syncstore_http::Error> {
        Ok(Self::new(ReqwestExecutor::new(timeout)?))
    }

    pub fn with_default_timeout() -> Result<Self, syncstore_http::Error> {
        Ok(Self::new(ReqwestExecutor::with_default_timeout()?))
    }
}

impl<E: HttpExecutor> CollectionInfoAccessor<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Fetch the collection names owned by the token's account.
    ///
    /// No request is sent when the URI or the auth header can't be built.
    pub fn fetch_collection_names(&self, token: &TokenServerToken) -> CollectionInfoOutcome {
        let uri = match collection_info_uri(token) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::warn!(error = %e, "collection info URI resolution failed");
                return CollectionInfoOutcome::Error(e);
            }
        };

        let auth = match token.auth_header_provider() {
            Ok(auth) => auth,
            Err(source) => {
                let e = CollectionInfoError::AuthSetup { source };
                tracing::warn!(error = %e, "collection info auth setup failed");
                return CollectionInfoOutcome::Error(e);
            }
        };

        tracing::debug!(%uri, "fetching collection info");
        let fetcher = JsonRecordFetcher::new(uri, &auth);

        match fetcher.fetch(&self.executor) {
            FetchOutcome::Success(document) => {
                let names: HashSet<String> = document.into_iter().map(|(name, _)| name).collect();
                tracing::debug!(count = names.len(), "collection info retrieved");
                CollectionInfoOutcome::Success(names)
            }
            FetchOutcome::Failure(response) => {
                let status = response.status();
                let error = match response.error_message() {
                    Ok(message) => CollectionInfoError::RequestFailure { status, message },
                    Err(source) => CollectionInfoError::RequestFailureUnreadable { status, source },
                };
                tracing::warn!(status, error = %error, "collection info request failed");
                CollectionInfoOutcome::RequestFailure(error)
            }
            FetchOutcome::Error(source) => {
                let e = CollectionInfoError::Transport { source };
                tracing::warn!(error = %e, "collection info fetch errored");
                CollectionInfoOutcome::Error(e)
            }
        }
    }

    /// Fetch the collection names and report them to `callback`.
    ///
    /// Blocks the calling thread; the callback runs on it before this returns.
    pub fn get_blocking<C: CollectionInfoCallback + ?Sized>(
        &self,
        token: &TokenServerToken,
        callback: &mut C,
    ) {
        self.fetch_collection_names(token).deliver(callback)
    }
}

/// One-off blocking call with a default reqwest executor.
pub fn get_blocking<C: CollectionInfoCallback + ?Sized>(token: &TokenServerToken, callback: &mut C) {
    match CollectionInfoAccessor::with_default_timeout() {
        Ok(accessor) => accessor.get_blocking(token, callback),
        Err(source) => callback.on_error(CollectionInfoError::Transport { source }),
    }
}
