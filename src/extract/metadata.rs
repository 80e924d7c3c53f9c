use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{LanguageMix, RepoSummary};

/// License id GitHub reports when it cannot identify the license.
const NO_ASSERTION: &str = "NOASSERTION";

/// Build the summary facet from the repository record and the `languages` payload.
pub fn extract_metadata(repo: &Value, languages: Option<&Value>, now: DateTime<Utc>) -> RepoSummary {
    let age_days = timestamp(repo, "created_at").map_or(0, |created| (now - created).num_days());

    let license = repo
        .get("license")
        .and_then(|l| l.get("spdx_id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty() && *id != NO_ASSERTION)
        .map(str::to_string);

    RepoSummary {
        stars: count(repo, "stargazers_count"),
        forks: count(repo, "forks_count"),
        watchers: count(repo, "subscribers_count"),
        last_commit: timestamp(repo, "pushed_at"),
        age_days,
        license,
        primary_language: repo
            .get("language")
            .and_then(Value::as_str)
            .map(str::to_string),
        languages: languages.map(language_mix).unwrap_or_default(),
    }
}

/// Byte counts to percentages (one decimal), largest first. Ties keep API order.
pub fn language_mix(languages: &Value) -> LanguageMix {
    let Some(map) = languages.as_object() else {
        return LanguageMix::default();
    };

    let mut bytes: Vec<(&String, u64)> = map
        .iter()
        .filter_map(|(name, b)| Some((name, b.as_u64()?)))
        .collect();
    let total: u64 = bytes.iter().map(|(_, b)| b).sum();
    if total == 0 {
        return LanguageMix::default();
    }

    bytes.sort_by(|a, b| b.1.cmp(&a.1));
    LanguageMix(
        bytes
            .into_iter()
            .map(|(name, b)| {
                let pct = (b as f64 / total as f64 * 1000.0).round() / 10.0;
                (name.clone(), pct)
            })
            .collect(),
    )
}

pub(crate) fn timestamp(record: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = record.get(field)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn count(record: &Value, field: &str) -> u64 {
    record.get(field).and_then(Value::as_u64).unwrap_or(0)
}
