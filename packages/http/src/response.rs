//! Sync storage server response introspection.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::types::HttpResponse;

/// Error codes a sync storage server may put in a failure body.
const SERVER_ERROR_MESSAGES: &[(&str, &str)] = &[
    ("1", "Illegal method/protocol"),
    ("2", "Incorrect/missing captcha"),
    ("3", "Invalid/missing username"),
    ("4", "Attempt to overwrite data that can't be overwritten (such as creating a user ID that already exists)"),
    ("5", "User ID does not match account in path"),
    ("6", "JSON parse failure"),
    ("7", "Missing password field"),
    ("8", "Invalid Weave Basic Object"),
    ("9", "Requested password not strong enough"),
    ("10", "Invalid/missing password reset code"),
    ("11", "Unsupported function"),
    ("12", "No email address on file"),
    ("13", "Invalid collection"),
    ("14", "User over quota"),
    ("15", "The email does not match the username"),
    ("16", "Client upgrade required"),
    ("255", "An unexpected server error occurred: pool is empty."),
];

/// Look up the text for a numeric sync server error code.
pub fn server_error_message(code: &str) -> Option<&'static str> {
    SERVER_ERROR_MESSAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
}

/// An HTTP response from a sync storage server.
#[derive(Debug, Clone)]
pub struct StorageResponse {
    response: HttpResponse,
}

impl StorageResponse {
    pub fn new(response: HttpResponse) -> Self {
        Self { response }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Sync storage servers answer successful reads with 200; any other
    /// status, including the rest of 2xx, is a failed request.
    pub fn was_successful(&self) -> bool {
        self.response.status == 200
    }

    pub fn http_response(&self) -> &HttpResponse {
        &self.response
    }

    /// The server's explanation of a failure.
    ///
    /// Numeric sync error codes are translated; any other body is returned
    /// trimmed. Fails if the body could not be read.
    pub fn error_message(&self) -> Result<String> {
        let body = self.response.body.text()?.trim();
        let code = body.trim_matches('"');
        Ok(server_error_message(code)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()))
    }

    /// Parse the body as a JSON object.
    pub fn json_object_body(&self) -> Result<Map<String, Value>> {
        let body = self.response.body.text()?;
        match serde_json::from_str::<Value>(body)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::NotJsonObject {
                found: json_type_name(&other).to_string(),
            }),
        }
    }

    /// Seconds requested by `X-Weave-Backoff` or `X-Backoff`, if any.
    pub fn backoff_seconds(&self) -> Option<u64> {
        self.header_seconds("x-weave-backoff")
            .or_else(|| self.header_seconds("x-backoff"))
    }

    /// Seconds requested by `Retry-After`, in its delta-seconds form.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        self.header_seconds("retry-after")
    }

    fn header_seconds(&self, name: &str) -> Option<u64> {
        self.response
            .header(name)
            .and_then(|value| value.trim().parse().ok())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
