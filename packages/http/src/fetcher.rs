//! Single-shot JSON record fetching.

use serde_json::{Map, Value};
use url::Url;

use crate::auth::AuthHeaderProvider;
use crate::error::Error;
use crate::executor::HttpExecutor;
use crate::response::StorageResponse;
use crate::types::HttpRequest;

/// Result of one fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server answered with a success status and a JSON object body.
    Success(Map<String, Value>),
    /// The server answered with a failure status.
    Failure(StorageResponse),
    /// No usable response: signing, transport or body parsing failed.
    Error(Error),
}

/// Fetches one JSON object from a sync storage server with a signed GET.
pub struct JsonRecordFetcher<'a> {
    uri: Url,
    auth: &'a dyn AuthHeaderProvider,
}

impl<'a> JsonRecordFetcher<'a> {
    pub fn new(uri: Url, auth: &'a dyn AuthHeaderProvider) -> Self {
        Self { uri, auth }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Perform the GET on the calling thread.
    pub fn fetch<E: HttpExecutor + ?Sized>(&self, executor: &E) -> FetchOutcome {
        let request = HttpRequest::get(self.uri.as_str()).with_header("Accept", "application/json");

        let authorization = match self.auth.authorization(&request) {
            Ok(value) => value,
            Err(e) => return FetchOutcome::Error(e),
        };
        let request = request.with_header("Authorization", authorization);

        tracing::debug!(uri = %self.uri, "fetching JSON record");
        let response = match executor.execute(&request) {
            Ok(response) => StorageResponse::new(response),
            Err(e) => return FetchOutcome::Error(e),
        };

        if !response.was_successful() {
            return FetchOutcome::Failure(response);
        }

        match response.json_object_body() {
            Ok(map) => FetchOutcome::Success(map),
            Err(e) => FetchOutcome::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BasicAuthHeaderProvider;
    use crate::executor::mock::MockExecutor;
    use crate::types::Method;

    const URI: &str = "https://sync.example.com/1.5/7/info/collections";

    struct FailingAuth;

    impl AuthHeaderProvider for FailingAuth {
        fn authorization(&self, _request: &HttpRequest) -> crate::error::Result<String> {
            Err(Error::InvalidCredentials {
                message: "no key".to_string(),
            })
        }
    }

    fn auth() -> BasicAuthHeaderProvider {
        BasicAuthHeaderProvider::new("user", "pass").unwrap()
    }

    #[test]
    fn success_returns_object() {
        let executor = MockExecutor::new().with_response(
            URI,
            MockExecutor::success_response(serde_json::json!({"tabs": 1.0, "forms": 2.0})),
        );
        let auth = auth();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &auth);

        match fetcher.fetch(&executor) {
            FetchOutcome::Success(map) => {
                assert!(map.contains_key("tabs"));
                assert!(map.contains_key("forms"));
            }
            other => panic!("expected success, got {:?}", other),
        }

        let recorded = executor.recorded_requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].method, Method::GET);
        assert_eq!(recorded[0].url, URI);
        assert_eq!(recorded[0].header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(recorded[0].header("Accept"), Some("application/json"));
        assert!(recorded[0].body.is_none());
    }

    #[test]
    fn failure_status_returns_response() {
        let executor = MockExecutor::new().with_default_response(MockExecutor::error_response(401, "bad"));
        let auth = auth();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &auth);

        match fetcher.fetch(&executor) {
            FetchOutcome::Failure(response) => assert_eq!(response.status(), 401),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn no_content_is_a_failure() {
        let executor = MockExecutor::new()
            .with_default_response(MockExecutor::text_response(204, "No Content", ""));
        let auth = auth();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &auth);

        match fetcher.fetch(&executor) {
            FetchOutcome::Failure(response) => {
                assert_eq!(response.status(), 204);
                assert_eq!(response.error_message().unwrap(), "");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn fetcher_keeps_its_uri() {
        let auth = auth();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &auth);
        assert_eq!(fetcher.uri().as_str(), URI);
    }

    #[test]
    fn non_object_body_is_an_error() {
        let executor = MockExecutor::new().with_default_response(MockExecutor::text_response(200, "OK", "[]"));
        let auth = auth();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &auth);

        assert!(matches!(
            fetcher.fetch(&executor),
            FetchOutcome::Error(Error::NotJsonObject { .. })
        ));
    }

    #[test]
    fn transport_error_is_an_error() {
        let executor = MockExecutor::new().fail_with("connection refused");
        let auth = auth();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &auth);

        assert!(matches!(
            fetcher.fetch(&executor),
            FetchOutcome::Error(Error::Transport { .. })
        ));
    }

    #[test]
    fn signing_failure_skips_request() {
        let executor = MockExecutor::new();
        let fetcher = JsonRecordFetcher::new(Url::parse(URI).unwrap(), &FailingAuth);

        assert!(matches!(
            fetcher.fetch(&executor),
            FetchOutcome::Error(Error::InvalidCredentials { .. })
        ));
        assert_eq!(executor.request_count(), 0);
    }
}
