use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// Everything that can stop an analysis.
///
/// Auxiliary lookups inside extractors never surface these except
/// [`AnalysisError::RateLimitExhausted`]; they degrade to defaults instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("cannot parse repository input {input:?}: use 'owner/name' or a GitHub URL")]
    InvalidInput { input: String },

    #[error("repository not found: {owner}/{name}")]
    NotFound { owner: String, name: String },

    #[error("GitHub API rate limit exhausted{}", reset_hint(.reset_at))]
    RateLimitExhausted { reset_at: Option<i64> },

    #[error("request to {path} failed after {attempts} attempt(s)")]
    Transport {
        path: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API returned HTTP {status} for {path}")]
    Http { path: String, status: u16 },

    #[error("invalid JSON body from {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client")]
    ClientSetup(#[source] reqwest::Error),

    #[error("invalid header value")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl AnalysisError {
    /// Whether this error must abort the analysis even when raised by an auxiliary lookup.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AnalysisError::RateLimitExhausted { .. })
    }
}

fn reset_hint(reset_at: &Option<i64>) -> String {
    match reset_at {
        Some(epoch) => format!(" (resets at unix time {epoch})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mentions_repository() {
        let err = AnalysisError::NotFound {
            owner: "octocat".to_string(),
            name: "Hello-World".to_string(),
        };
        assert_eq!(err.to_string(), "repository not found: octocat/Hello-World");
    }

    #[test]
    fn test_rate_limit_message_includes_reset() {
        let err = AnalysisError::RateLimitExhausted {
            reset_at: Some(1_700_000_000),
        };
        assert!(err.to_string().contains("1700000000"));
        assert!(err.is_rate_limit());

        let err = AnalysisError::RateLimitExhausted { reset_at: None };
        assert_eq!(err.to_string(), "GitHub API rate limit exhausted");
    }
}
