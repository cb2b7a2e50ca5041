use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntrospectionError>;

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    #[error("failed to parse introspection result: {0}")]
    Parse(String),

    #[error("invalid introspection result: {0}")]
    Invalid(String),
}

impl IntrospectionError {
    /// Network failures and 5xx responses may succeed on a later attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http(status, _) => *status >= 500,
            Self::Parse(_) | Self::Invalid(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(IntrospectionError::Network("timeout".into()).is_retryable());
        assert!(IntrospectionError::Http(500, String::new()).is_retryable());
        assert!(IntrospectionError::Http(503, String::new()).is_retryable());
        assert!(!IntrospectionError::Http(401, String::new()).is_retryable());
        assert!(!IntrospectionError::Http(404, String::new()).is_retryable());
        assert!(!IntrospectionError::Parse("eof".into()).is_retryable());
        assert!(!IntrospectionError::Invalid("no data".into()).is_retryable());
    }
}
