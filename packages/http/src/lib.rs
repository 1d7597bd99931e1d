//! # syncstore-http
//!
//! Blocking HTTP plumbing for talking to a sync storage server.
//!
//! ## Pieces
//!
//! - [`HttpExecutor`]: the transport seam. [`ReqwestExecutor`] is the
//!   production implementation; tests use `executor::mock::MockExecutor`
//!   (enable the `mock` feature from other crates).
//! - [`AuthHeaderProvider`]: turns a request into an `Authorization` value.
//!   [`HawkAuthHeaderProvider`] signs requests the way sync storage servers
//!   expect.
//! - [`JsonRecordFetcher`]: one signed GET, classified into a
//!   [`FetchOutcome`].
//!
//! ```ignore
//! use syncstore_http::{FetchOutcome, HawkAuthHeaderProvider, JsonRecordFetcher, ReqwestExecutor};
//!
//! let executor = ReqwestExecutor::with_default_timeout()?;
//! let auth = HawkAuthHeaderProvider::new("id", "key", false, 0)?;
//! let fetcher = JsonRecordFetcher::new(url, &auth);
//!
//! match fetcher.fetch(&executor) {
//!     FetchOutcome::Success(object) => println!("{} keys", object.len()),
//!     FetchOutcome::Failure(response) => println!("HTTP {}", response.status()),
//!     FetchOutcome::Error(e) => println!("error: {}", e),
//! }
//! ```

pub mod auth;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod response;
pub mod types;

pub use auth::{AuthHeaderProvider, BasicAuthHeaderProvider, HawkAuthHeaderProvider};
pub use error::{Error, Result};
pub use executor::{HttpExecutor, ReqwestExecutor, DEFAULT_TIMEOUT};
pub use fetcher::{FetchOutcome, JsonRecordFetcher};
pub use response::StorageResponse;
pub use types::{HttpRequest, HttpResponse, Method, ResponseBody};
