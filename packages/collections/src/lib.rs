//! # syncstore-collections
//!
//! Lists the collections a sync account owns, given the token the token
//! server issued for it.
//!
//! ```ignore
//! use syncstore_collections::{CollectionInfoAccessor, CollectionInfoOutcome, TokenServerToken};
//!
//! let accessor = CollectionInfoAccessor::with_default_timeout()?;
//! match accessor.fetch_collection_names(&token) {
//!     CollectionInfoOutcome::Success(names) => println!("{:?}", names),
//!     CollectionInfoOutcome::RequestFailure(e) => eprintln!("rejected: {}", e),
//!     CollectionInfoOutcome::Error(e) => eprintln!("error: {}", e),
//! }
//! ```
//!
//! Calls block the current thread. From async code, run them inside
//! `tokio::task::spawn_blocking`.

pub mod accessor;
pub mod error;
pub mod token;

pub use accessor::{
    collection_info_uri, get_blocking, CollectionInfoAccessor, CollectionInfoCallback,
    CollectionInfoHandlers, CollectionInfoOutcome, COLLECTION_INFO_PATH,
};
pub use error::{CollectionInfoError, ErrorKind, REQUEST_FAILURE_FALLBACK};
pub use token::TokenServerToken;
