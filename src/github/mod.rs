//! GitHub REST client with ETag caching, rate-budget tracking and bounded retry.
//!
//! One [`GitHubClient`] serves one analysis. Its mutable state (response cache,
//! rate counters, warnings) sits behind a single mutex that is never held across
//! an `.await`.

pub mod cache;
pub mod rate_limit;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, ETAG, IF_NONE_MATCH, LINK,
};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::identifier::RepositoryId;

use self::cache::{cache_key, ResponseCache};
use self::rate_limit::RateBudget;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = concat!("repoprobe/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const API_VERSION: &str = "2022-11-28";

/// Connection settings for a [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    /// Extra attempts after a transport failure.
    pub max_retries: u32,
    pub cache_capacity: usize,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            cache_capacity: cache::DEFAULT_CAPACITY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Outcome of a single API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Found(Value),
    /// 404, 401, or a 403 while budget remains: the resource is missing or hidden.
    Absent,
    RateLimited { reset_at: Option<i64> },
}

impl ApiResponse {
    /// `Some(payload)` for `Found`, `None` for `Absent`; rate limiting becomes an error.
    pub fn into_found(self) -> Result<Option<Value>, AnalysisError> {
        match self {
            ApiResponse::Found(payload) => Ok(Some(payload)),
            ApiResponse::Absent => Ok(None),
            ApiResponse::RateLimited { reset_at } => {
                Err(AnalysisError::RateLimitExhausted { reset_at })
            }
        }
    }
}

/// A response whose body has been read to the end.
#[derive(Debug)]
struct Fetched {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Fetched {
    async fn read(response: Response) -> reqwest::Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    fn json(&self, path: &str) -> Result<Value, AnalysisError> {
        serde_json::from_slice(&self.body).map_err(|source| AnalysisError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[derive(Debug, Default)]
struct ClientState {
    cache: ResponseCache,
    budget: RateBudget,
    warnings: Vec<String>,
}

#[derive(Debug)]
pub struct GitHubClient {
    http: Client,
    base_url: String,
    max_retries: u32,
    state: Mutex<ClientState>,
}

impl GitHubClient {
    pub fn new(config: ClientConfig) -> Result<Self, AnalysisError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(AnalysisError::ClientSetup)?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            state: Mutex::new(ClientState {
                cache: ResponseCache::new(config.cache_capacity),
                ..ClientState::default()
            }),
        })
    }

    /// GET `path` (relative to the API root) with conditional caching.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<ApiResponse, AnalysisError> {
        self.ensure_budget()?;

        let key = cache_key(path, query);
        let validator = self.lock().cache.validator(&key);
        let response = self.send(path, query, validator.as_deref()).await?;
        self.observe(&response.headers);

        if response.status != StatusCode::NOT_MODIFIED {
            return self.interpret(path, key, response);
        }

        let cached = self.lock().cache.revalidate(&key);
        if let Some(payload) = cached {
            debug!(key = %key, "served from cache");
            return Ok(ApiResponse::Found(payload));
        }

        // Entry evicted between the validator lookup and the 304.
        debug!(key = %key, "cache entry gone after 304, refetching");
        self.ensure_budget()?;
        let response = self.send(path, query, None).await?;
        self.observe(&response.headers);
        self.interpret(path, key, response)
    }

    /// Decoded text of a file from the repository's default branch.
    ///
    /// `None` when the file is missing or the contents envelope cannot be decoded.
    pub async fn file_content(
        &self,
        repo: &RepositoryId,
        path: &str,
    ) -> Result<Option<String>, AnalysisError> {
        let api_path = format!("{}/contents/{}", repo.api_path(), path);
        let Some(payload) = self.get(&api_path, &[]).await?.into_found()? else {
            return Ok(None);
        };
        let text = decode_content(&payload);
        if text.is_none() {
            debug!(path, "contents envelope did not decode");
        }
        Ok(text)
    }

    /// Number of contributors (anonymous included), read from the pagination links
    /// of a one-per-page listing.
    pub async fn contributor_count(&self, repo: &RepositoryId) -> Result<u64, AnalysisError> {
        self.ensure_budget()?;

        let path = format!("{}/contributors", repo.api_path());
        let response = self
            .send(&path, &[("per_page", "1"), ("anon", "true")], None)
            .await?;
        self.observe(&response.headers);

        let status = response.status;
        if status != StatusCode::OK {
            if let ApiResponse::RateLimited { reset_at } = self.denial(status) {
                return Err(AnalysisError::RateLimitExhausted { reset_at });
            }
            return Ok(0);
        }

        let last = response
            .headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(last_page);
        if let Some(count) = last {
            return Ok(count);
        }

        let body = response.json(&path)?;
        Ok(body.as_array().map_or(0, |entries| entries.len() as u64))
    }

    pub fn push_warning(&self, warning: impl Into<String>) {
        self.lock().warnings.push(warning.into());
    }

    /// Warnings raised by the client itself, in the order they occurred.
    pub fn warnings(&self) -> Vec<String> {
        self.lock().warnings.clone()
    }

    pub fn rate_remaining(&self) -> Option<u64> {
        self.lock().budget.remaining()
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_budget(&self) -> Result<(), AnalysisError> {
        let state = self.lock();
        if state.budget.is_exhausted() {
            return Err(AnalysisError::RateLimitExhausted {
                reset_at: state.budget.reset_at(),
            });
        }
        Ok(())
    }

    fn observe(&self, headers: &HeaderMap) {
        let mut state = self.lock();
        if let Some(warning) = state.budget.observe(headers) {
            warn!("{}", warning);
            state.warnings.push(warning);
        }
    }

    /// Classify a 401/403/404/429 answer.
    fn denial(&self, status: StatusCode) -> ApiResponse {
        let state = self.lock();
        let limited = status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN && state.budget.is_exhausted());
        if limited {
            ApiResponse::RateLimited {
                reset_at: state.budget.reset_at(),
            }
        } else {
            ApiResponse::Absent
        }
    }

    fn interpret(
        &self,
        path: &str,
        key: String,
        response: Fetched,
    ) -> Result<ApiResponse, AnalysisError> {
        let status = response.status;
        match status {
            StatusCode::NOT_FOUND
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::TOO_MANY_REQUESTS => Ok(self.denial(status)),
            StatusCode::NO_CONTENT => Ok(ApiResponse::Found(Value::Null)),
            s if s.is_success() => {
                let etag = response
                    .headers
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let payload = response.json(path)?;
                if let Some(etag) = etag {
                    debug!(key = %key, "caching response");
                    self.lock().cache.store(key, etag, payload.clone());
                }
                Ok(ApiResponse::Found(payload))
            }
            s => Err(AnalysisError::Http {
                path: path.to_string(),
                status: s.as_u16(),
            }),
        }
    }

    /// Send one GET and read its body, retrying transport failures (including a
    /// body cut short) up to `max_retries` more times.
    async fn send(
        &self,
        path: &str,
        query: &[(&str, &str)],
        validator: Option<&str>,
    ) -> Result<Fetched, AnalysisError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let mut request = self.http.get(&url);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(etag) = validator {
                request = request.header(IF_NONE_MATCH, etag);
            }

            let outcome = match request.send().await {
                Ok(response) => Fetched::read(response).await,
                Err(err) => Err(err),
            };
            match outcome {
                Ok(fetched) => return Ok(fetched),
                Err(err) if attempts <= self.max_retries && !err.is_builder() => {
                    debug!(path, attempts, error = %err, "transport failure, retrying");
                }
                Err(source) => {
                    warn!(path, attempts, "giving up after transport failures");
                    return Err(AnalysisError::Transport {
                        path: path.to_string(),
                        attempts,
                        source,
                    });
                }
            }
        }
    }
}

/// Text of a `{"content": "<base64>", "encoding": "base64"}` envelope.
fn decode_content(payload: &Value) -> Option<String> {
    if let Some(encoding) = payload.get("encoding").and_then(Value::as_str) {
        if encoding != "base64" {
            return None;
        }
    }
    let encoded = payload.get("content")?.as_str()?;
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// `page` number of the `rel="last"` target in a `Link` header.
fn last_page(link: &str) -> Option<u64> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="last""#) {
            return None;
        }
        let url = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(url).ok()?;
        let page = url
            .query_pairs()
            .find(|(name, _)| name == "page")
            .map(|(_, value)| value.into_owned())?;
        page.parse().ok()
    })
}
