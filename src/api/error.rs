use thiserror::Error;

/// Errors produced by [`ApiClient`](super::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP status. `message` is the backend's `error` field
    /// when it sent one, else `HTTP <status>`.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API base URL: {0}")]
    InvalidBase(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn http(status: u16) -> Self {
        ApiError::Http {
            status,
            message: format!("HTTP {}", status),
        }
    }

    /// HTTP status of the failed request, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_message() {
        let err = ApiError::http(502);
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_backend_message_is_display() {
        let err = ApiError::Http {
            status: 409,
            message: "conflict".to_string(),
        };
        assert_eq!(err.to_string(), "conflict");
    }
}
