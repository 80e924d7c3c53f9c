use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AnalysisError;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?$")
        .expect("repository URL regex")
});

static SHORTHAND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").expect("repository shorthand regex")
});

/// An `owner/name` pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Parse `owner/name` shorthand or a `https://github.com/owner/name[.git]` URL.
    ///
    /// Surrounding whitespace and a trailing slash are ignored; casing is preserved.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        let trimmed = raw.trim().trim_end_matches('/');

        let caps = URL_RE
            .captures(trimmed)
            .or_else(|| SHORTHAND_RE.captures(trimmed))
            .ok_or_else(|| AnalysisError::InvalidInput {
                input: raw.to_string(),
            })?;

        Ok(Self {
            owner: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }

    /// Prefix of every repository-scoped API path: `/repos/{owner}/{name}`.
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
