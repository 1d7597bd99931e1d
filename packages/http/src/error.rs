#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Response body unreadable: {message}")]
    BodyUnreadable { message: String },

    #[error("Expected a JSON object body, got {found}")]
    NotJsonObject { found: String },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
