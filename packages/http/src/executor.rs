//! HTTP execution abstraction for testing.
//!
//! This module provides a trait for HTTP execution that can be mocked in tests,
//! avoiding the need for actual network calls.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::Result;
use crate::types::{HttpRequest, HttpResponse, ResponseBody};

/// Default request timeout used by [`ReqwestExecutor::with_default_timeout`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for executing HTTP requests.
///
/// Implementations block the calling thread until the response status and
/// headers are available. A response with a failure status is still `Ok`;
/// `Err` is reserved for requests that never produced a response.
pub trait HttpExecutor: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for &E {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for std::sync::Arc<E> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Production HTTP executor using the blocking reqwest client.
///
/// The client must not be created or dropped on an async runtime worker
/// thread; wrap calls in `spawn_blocking` when driving it from async code.
pub struct ReqwestExecutor {
    client: Client,
}

impl ReqwestExecutor {
    /// Create a new executor with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("syncstore/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout() -> Result<Self> {
        Self::new(DEFAULT_TIMEOUT)
    }

    /// Create an executor around an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let method: http::Method = request.method.into();

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::try_from(name.as_str())?;
            let header_value = HeaderValue::try_from(value.as_str())?;
            headers.insert(header_name, header_value);
        }

        let mut req_builder = self.client.request(method, &request.url).headers(headers);

        if let Some(body) = &request.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send()?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut resp_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(name.as_str().to_ascii_lowercase(), v.to_string());
            }
        }

        let body = match response.text() {
            Ok(text) => ResponseBody::Text(text),
            Err(e) => {
                tracing::debug!(status, error = %e, "failed to read response body");
                ResponseBody::Unreadable(e.to_string())
            }
        };

        Ok(HttpResponse {
            status,
            status_text,
            headers: resp_headers,
            body,
        })
    }
}

/// Mock HTTP executor for testing.
///
/// Returns predefined responses based on request matching.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    /// A mock HTTP executor that returns predefined responses.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Responses keyed by request URL.
        responses: Arc<Mutex<HashMap<String, HttpResponse>>>,
        /// Default response when no match found.
        default_response: Arc<Mutex<Option<HttpResponse>>>,
        /// Recorded requests for verification.
        recorded_requests: Arc<Mutex<Vec<HttpRequest>>>,
        /// Transport failure returned for every request, if set.
        failure: Arc<Mutex<Option<String>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a response for a specific URL.
        pub fn with_response(self, url: impl Into<String>, response: HttpResponse) -> Self {
            self.responses.lock().unwrap().insert(url.into(), response);
            self
        }

        /// Set a default response when no URL matches.
        pub fn with_default_response(self, response: HttpResponse) -> Self {
            *self.default_response.lock().unwrap() = Some(response);
            self
        }

        /// Configure to fail all requests with a transport error.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.failure.lock().unwrap() = Some(message.into());
            self
        }

        /// Get all recorded requests.
        pub fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.recorded_requests.lock().unwrap().len()
        }

        /// Create a simple success response.
        pub fn success_response(body: serde_json::Value) -> HttpResponse {
            Self::text_response(200, "OK", body.to_string())
        }

        /// Create a response with an arbitrary status and raw body.
        pub fn text_response(status: u16, status_text: &str, body: impl Into<String>) -> HttpResponse {
            HttpResponse {
                status,
                status_text: status_text.to_string(),
                headers: HashMap::new(),
                body: ResponseBody::Text(body.into()),
            }
        }

        /// Create a simple error response with a `{"error": message}` body.
        pub fn error_response(status: u16, message: &str) -> HttpResponse {
            Self::text_response(
                status,
                message,
                serde_json::json!({ "error": message }).to_string(),
            )
        }

        /// Create a response whose body fails to read.
        pub fn unreadable_response(status: u16, reason: &str) -> HttpResponse {
            HttpResponse {
                status,
                status_text: "Unknown".to_string(),
                headers: HashMap::new(),
                body: ResponseBody::Unreadable(reason.to_string()),
            }
        }

        /// Create a 404 Not Found response.
        pub fn not_found() -> HttpResponse {
            Self::error_response(404, "Not Found")
        }
    }

    impl HttpExecutor for MockExecutor {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.recorded_requests.lock().unwrap().push(request.clone());

            if let Some(message) = self.failure.lock().unwrap().clone() {
                return Err(Error::Transport { message });
            }

            if let Some(response) = self.responses.lock().unwrap().get(&request.url) {
                return Ok(response.clone());
            }

            if let Some(ref response) = *self.default_response.lock().unwrap() {
                return Ok(response.clone());
            }

            Ok(Self::not_found())
        }
    }
}
