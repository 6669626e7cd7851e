use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to send request, error={0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to call api, status={status}, response={body}")]
    Api { status: u16, body: String },
    #[error(transparent)]
    Invalid(#[from] anyhow::Error),
    #[error("response has no content")]
    EmptyResponse,
}

impl ChatError {
    pub fn is_rate_limited(&self) -> bool {
        if let ChatError::Api { status: 429, .. } = self {
            return true;
        }
        let message = self.to_string().to_lowercase();
        message.contains("rate limit") || message.contains("quota")
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn status_429_is_rate_limited() {
        let error = ChatError::Api {
            status: 429,
            body: "{}".to_string(),
        };
        assert!(error.is_rate_limited());
    }

    #[test]
    fn quota_message_is_rate_limited() {
        let error = ChatError::Api {
            status: 400,
            body: r#"{"error":{"message":"Daily Quota exhausted"}}"#.to_string(),
        };
        assert!(error.is_rate_limited());
        assert!(ChatError::Invalid(anyhow!("Rate limit reached for model")).is_rate_limited());
    }

    #[test]
    fn server_error_is_not_rate_limited() {
        let error = ChatError::Api {
            status: 500,
            body: "upstream unavailable".to_string(),
        };
        assert!(!error.is_rate_limited());
        assert!(!ChatError::EmptyResponse.is_rate_limited());
    }
}
