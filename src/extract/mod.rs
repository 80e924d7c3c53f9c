//! Facet extractors. Each turns raw API payloads (plus the file tree) into one
//! section of the [`AnalysisResult`](crate::models::AnalysisResult).

pub mod architecture;
pub mod health;
pub mod metadata;
pub mod security;
pub mod tech_stack;

use tracing::warn;

use crate::error::AnalysisError;

pub use architecture::extract_architecture;
pub use health::extract_health;
pub use metadata::extract_metadata;
pub use security::extract_security;
pub use tech_stack::{extract_tech_stack, TechStackFindings};

/// An extractor's value plus the non-fatal warnings it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Extracted<T> {
    pub fn new(value: T, warnings: Vec<String>) -> Self {
        Self { value, warnings }
    }
}

/// Replace a failed auxiliary lookup with `fallback` and record a warning.
///
/// Rate-limit exhaustion is never swallowed.
pub(crate) fn degrade<T>(
    result: Result<T, AnalysisError>,
    fallback: T,
    what: &str,
    warnings: &mut Vec<String>,
) -> Result<T, AnalysisError> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_rate_limit() => Err(err),
        Err(err) => {
            warn!(error = %err, "{} unavailable", what);
            warnings.push(format!("Could not fetch {}: {}", what, err));
            Ok(fallback)
        }
    }
}
