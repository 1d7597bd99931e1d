//! Authorization header providers.
//!
//! Sync storage servers authenticate each request with a Hawk header signed
//! by the token server credentials. Basic auth is kept for older servers and
//! local test setups.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{Error, Result};
use crate::types::HttpRequest;

const HAWK_HEADER_VERSION: &str = "hawk.1.header";
const HAWK_PAYLOAD_VERSION: &str = "hawk.1.payload";
const HAWK_NONCE_BYTES: usize = 8;
const JSON_CONTENT_TYPE: &str = "application/json";

/// Produces the `Authorization` header value for a request.
pub trait AuthHeaderProvider: Send + Sync {
    fn authorization(&self, request: &HttpRequest) -> Result<String>;
}

/// Hawk (v1) request signing with HMAC-SHA256.
#[derive(Clone)]
pub struct HawkAuthHeaderProvider {
    id: String,
    key: Vec<u8>,
    include_payload_hash: bool,
    skew_seconds: i64,
    ext: Option<String>,
}

impl std::fmt::Debug for HawkAuthHeaderProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HawkAuthHeaderProvider")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .field("include_payload_hash", &self.include_payload_hash)
            .field("skew_seconds", &self.skew_seconds)
            .field("ext", &self.ext)
            .finish()
    }
}

impl HawkAuthHeaderProvider {
    /// Create a provider for the given credentials.
    ///
    /// The id ends up quoted inside the header, so it must be printable ASCII
    /// without `"` or `\`. The key must not be empty.
    pub fn new(
        id: impl Into<String>,
        key: impl Into<Vec<u8>>,
        include_payload_hash: bool,
        skew_seconds: i64,
    ) -> Result<Self> {
        let id = id.into();
        let key = key.into();

        if id.is_empty() {
            return Err(Error::InvalidCredentials {
                message: "Hawk id is empty".to_string(),
            });
        }
        if let Some(c) = id.chars().find(|c| !is_header_safe(*c)) {
            return Err(Error::InvalidCredentials {
                message: format!("Hawk id contains unsupported character {:?}", c),
            });
        }
        if key.is_empty() {
            return Err(Error::InvalidCredentials {
                message: "Hawk key is empty".to_string(),
            });
        }

        Ok(Self {
            id,
            key,
            include_payload_hash,
            skew_seconds,
            ext: None,
        })
    }

    /// Attach application-specific `ext` data to every header.
    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = Some(ext.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Build the header for a fixed timestamp and nonce.
    pub fn authorization_at(
        &self,
        request: &HttpRequest,
        timestamp: i64,
        nonce: &str,
    ) -> Result<String> {
        let url = Url::parse(&request.url)?;
        let host = url.host_str().ok_or_else(|| Error::InvalidUrl {
            message: format!("no host in {}", request.url),
        })?;
        let port = url.port_or_known_default().ok_or_else(|| Error::InvalidUrl {
            message: format!("no port for scheme {}", url.scheme()),
        })?;

        let mut resource = url.path().to_string();
        if let Some(query) = url.query() {
            resource.push('?');
            resource.push_str(query);
        }

        let payload_hash = match (&request.body, self.include_payload_hash) {
            (Some(body), true) if request.method.encloses_entity() => {
                Some(payload_hash(JSON_CONTENT_TYPE, &serde_json::to_vec(body)?))
            }
            _ => None,
        };

        let ext = self.ext.as_deref().map(escape_header_attribute);

        let normalized = format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            HAWK_HEADER_VERSION,
            timestamp,
            nonce,
            request.method.as_str(),
            resource,
            host.to_ascii_lowercase(),
            port,
            payload_hash.as_deref().unwrap_or(""),
            ext.as_deref().unwrap_or(""),
        );
        let mac = STANDARD.encode(hmac_sha256(&self.key, normalized.as_bytes()));

        let mut header = format!(
            "Hawk id=\"{}\", ts=\"{}\", nonce=\"{}\"",
            self.id, timestamp, nonce
        );
        if let Some(hash) = &payload_hash {
            header.push_str(&format!(", hash=\"{}\"", hash));
        }
        if let Some(ext) = &ext {
            header.push_str(&format!(", ext=\"{}\"", ext));
        }
        header.push_str(&format!(", mac=\"{}\"", mac));

        Ok(header)
    }
}

impl AuthHeaderProvider for HawkAuthHeaderProvider {
    fn authorization(&self, request: &HttpRequest) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let nonce_bytes: [u8; HAWK_NONCE_BYTES] = rand::random();
        let nonce = STANDARD.encode(nonce_bytes);

        self.authorization_at(request, now + self.skew_seconds, &nonce)
    }
}

/// HTTP Basic credentials.
#[derive(Clone)]
pub struct BasicAuthHeaderProvider {
    header: String,
}

impl BasicAuthHeaderProvider {
    pub fn new(username: &str, password: &str) -> Result<Self> {
        if username.contains(':') {
            return Err(Error::InvalidCredentials {
                message: "username must not contain ':'".to_string(),
            });
        }
        let encoded = STANDARD.encode(format!("{}:{}", username, password));
        Ok(Self {
            header: format!("Basic {}", encoded),
        })
    }
}

impl AuthHeaderProvider for BasicAuthHeaderProvider {
    fn authorization(&self, _request: &HttpRequest) -> Result<String> {
        Ok(self.header.clone())
    }
}

fn is_header_safe(c: char) -> bool {
    c.is_ascii_graphic() && c != '"' && c != '\\'
}

fn escape_header_attribute(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn payload_hash(content_type: &str, payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}\n{}\n", HAWK_PAYLOAD_VERSION, content_type).as_bytes());
    hasher.update(payload);
    hasher.update(b"\n");
    STANDARD.encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    const BLOCK_SIZE: usize = 64;
    const IPAD: u8 = 0x36;
    const OPAD: u8 = 0x5C;

    let mut key_block = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        let digest = Sha256::digest(key);
        key_block[..digest.len()].copy_from_slice(&digest);
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha256::new();
    inner.update(key_block.map(|b| b ^ IPAD));
    inner.update(data);
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(key_block.map(|b| b ^ OPAD));
    outer.update(inner_hash);
    outer.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn hmac_matches_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            to_hex(&mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_hashes_long_keys() {
        let key = [0xaau8; 131];
        let mac = hmac_sha256(&key, b"Test Using Larger Than Block-Size Key - Hash Key First");
        assert_eq!(
            to_hex(&mac),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn hawk_header_matches_reference_vector() {
        let provider = HawkAuthHeaderProvider::new(
            "dh37fgj492je",
            "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
            false,
            0,
        )
        .unwrap()
        .with_ext("some-app-ext-data");

        let request = HttpRequest::get("http://example.com:8000/resource/1?b=1&a=2");
        let header = provider
            .authorization_at(&request, 1353832234, "j4h3g2")
            .unwrap();

        assert_eq!(
            header,
            "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
             ext=\"some-app-ext-data\", mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\""
        );
    }

    #[test]
    fn hawk_header_without_ext_or_hash() {
        let provider = HawkAuthHeaderProvider::new("id", "key", true, 0).unwrap();
        let request = HttpRequest::get("https://sync.example.com/1.5/42/info/collections");
        let header = provider.authorization_at(&request, 1, "n").unwrap();

        assert!(header.starts_with("Hawk id=\"id\", ts=\"1\", nonce=\"n\", mac=\""));
        assert!(!header.contains("hash="));
        assert!(!header.contains("ext="));
    }

    #[test]
    fn hawk_payload_hash_only_for_bodies() {
        let provider = HawkAuthHeaderProvider::new("id", "key", true, 0).unwrap();
        let request = HttpRequest::post("https://sync.example.com/storage/bookmarks")
            .with_json_body(serde_json::json!({"id": "abc"}));
        let header = provider.authorization_at(&request, 1, "n").unwrap();
        assert!(header.contains(", hash=\""));

        let unhashed = HawkAuthHeaderProvider::new("id", "key", false, 0).unwrap();
        let header = unhashed.authorization_at(&request, 1, "n").unwrap();
        assert!(!header.contains("hash="));
    }

    #[test]
    fn hawk_signature_depends_on_key() {
        let request = HttpRequest::get("https://sync.example.com/info/collections");
        let a = HawkAuthHeaderProvider::new("id", "key-a", false, 0).unwrap();
        let b = HawkAuthHeaderProvider::new("id", "key-b", false, 0).unwrap();
        assert_ne!(
            a.authorization_at(&request, 1, "n").unwrap(),
            b.authorization_at(&request, 1, "n").unwrap()
        );
    }

    #[test]
    fn hawk_live_header_has_fresh_nonce() {
        let provider = HawkAuthHeaderProvider::new("id", "key", false, 0).unwrap();
        let request = HttpRequest::get("https://sync.example.com/info/collections");
        let first = provider.authorization(&request).unwrap();
        let second = provider.authorization(&request).unwrap();
        assert!(first.starts_with("Hawk id=\"id\""));
        assert_ne!(first, second);
    }

    #[test]
    fn hawk_rejects_bad_credentials() {
        assert!(matches!(
            HawkAuthHeaderProvider::new("", "key", false, 0),
            Err(Error::InvalidCredentials { .. })
        ));
        assert!(matches!(
            HawkAuthHeaderProvider::new("bad\"id", "key", false, 0),
            Err(Error::InvalidCredentials { .. })
        ));
        assert!(matches!(
            HawkAuthHeaderProvider::new("ünïcode", "key", false, 0),
            Err(Error::InvalidCredentials { .. })
        ));
        assert!(matches!(
            HawkAuthHeaderProvider::new("id", Vec::<u8>::new(), false, 0),
            Err(Error::InvalidCredentials { .. })
        ));
    }

    #[test]
    fn hawk_rejects_hostless_urls() {
        let provider = HawkAuthHeaderProvider::new("id", "key", false, 0).unwrap();
        let request = HttpRequest::get("not a url");
        assert!(provider.authorization(&request).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let provider = HawkAuthHeaderProvider::new("id", "secret-key", false, 0).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("secret-key"));
    }

    #[test]
    fn basic_auth_header() {
        let provider = BasicAuthHeaderProvider::new("Aladdin", "open sesame").unwrap();
        let request = HttpRequest::get("https://example.com/");
        assert_eq!(
            provider.authorization(&request).unwrap(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
        assert!(BasicAuthHeaderProvider::new("a:b", "c").is_err());
    }
}
