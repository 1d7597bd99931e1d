use serde::{Deserialize, Serialize};
use url::Url;

use syncstore_http::{Error as HttpError, HawkAuthHeaderProvider};

/// Credentials issued by the token server for one sync account.
///
/// Deserializes from the token server's response body, where the storage
/// endpoint is named `api_endpoint`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenServerToken {
    /// Hawk id.
    pub id: String,

    /// Hawk key, used as its UTF-8 bytes.
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashed_fxa_uid: Option<String>,

    /// Base URI of the account's storage server.
    #[serde(rename = "api_endpoint", alias = "endpoint")]
    pub endpoint: String,

    /// Lifetime of the token in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

impl std::fmt::Debug for TokenServerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenServerToken")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .field("uid", &self.uid)
            .field("hashed_fxa_uid", &self.hashed_fxa_uid)
            .field("endpoint", &self.endpoint)
            .field("duration", &self.duration)
            .finish()
    }
}

impl TokenServerToken {
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            uid: None,
            hashed_fxa_uid: None,
            endpoint: endpoint.into(),
            duration: None,
        }
    }

    /// Parse the storage endpoint.
    ///
    /// Fails for endpoints that cannot carry a path, such as `mailto:` URIs,
    /// and for endpoints without a host, such as `file:` URIs.
    pub fn server_uri(&self) -> Result<Url, HttpError> {
        let url = Url::parse(&self.endpoint)?;
        if url.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl {
                message: format!("{} cannot be used as a base URI", self.endpoint),
            });
        }
        if url.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                message: format!("{} has no host", self.endpoint),
            });
        }
        Ok(url)
    }

    /// Hawk signer for requests made with this token.
    pub fn auth_header_provider(&self) -> Result<HawkAuthHeaderProvider, HttpError> {
        HawkAuthHeaderProvider::new(self.id.as_str(), self.key.as_bytes(), false, 0)
    }
}
