use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AnalysisError;
use crate::github::{ApiResponse, GitHubClient};
use crate::identifier::RepositoryId;
use crate::models::{CommitFrequency, Health, MaintenanceStatus};

use super::metadata::timestamp;
use super::{degrade, Extracted};

/// A repository untouched for longer than this is inactive regardless of history.
const STALE_AFTER_DAYS: i64 = 365;

pub async fn extract_health(
    client: &GitHubClient,
    repo: &RepositoryId,
    record: &Value,
    now: DateTime<Utc>,
) -> Result<Extracted<Health>, AnalysisError> {
    let mut warnings = Vec::new();
    let commits_path = format!("{}/commits", repo.api_path());

    let (commits, contributors) = tokio::join!(
        async {
            client
                .get(&commits_path, &[("per_page", "100")])
                .await
                .and_then(ApiResponse::into_found)
        },
        client.contributor_count(repo),
    );
    let commits = degrade(commits, None, "commit history", &mut warnings)?;
    let contributors = degrade(contributors, 0, "contributor count", &mut warnings)?;

    let dates = commits.as_ref().map(commit_dates).unwrap_or_default();
    let frequency = classify_commit_frequency(&dates, now);
    let archived = record
        .get("archived")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let status = classify_maintenance(frequency, archived, timestamp(record, "pushed_at"), now);

    let health = Health {
        open_issues: record
            .get("open_issues_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        open_prs: 0,
        contributors,
        commit_frequency: frequency,
        maintenance_status: status,
    };

    Ok(Extracted::new(health, warnings))
}

/// Committer dates of a `commits` listing; undated entries are skipped.
fn commit_dates(commits: &Value) -> Vec<DateTime<Utc>> {
    commits
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|c| c.get("commit")?.get("committer"))
                .filter_map(|committer| timestamp(committer, "date"))
                .collect()
        })
        .unwrap_or_default()
}

/// Classify from the median gap, in whole days, between consecutive commits.
///
/// With fewer than two dates the age of the only commit decides.
pub fn classify_commit_frequency(dates: &[DateTime<Utc>], now: DateTime<Utc>) -> CommitFrequency {
    if dates.len() < 2 {
        return match dates.first() {
            Some(only) => {
                let age = (now - *only).num_days();
                if age < 35 {
                    CommitFrequency::Monthly
                } else if age < 180 {
                    CommitFrequency::Sporadic
                } else {
                    CommitFrequency::Inactive
                }
            }
            None => CommitFrequency::Inactive,
        };
    }

    let mut sorted = dates.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let mut gaps: Vec<i64> = sorted
        .windows(2)
        .map(|pair| (pair[0] - pair[1]).num_days())
        .collect();
    gaps.sort_unstable();
    let median = gaps[gaps.len() / 2];

    match median {
        m if m < 2 => CommitFrequency::Daily,
        m if m < 8 => CommitFrequency::Weekly,
        m if m < 35 => CommitFrequency::Monthly,
        m if m < 180 => CommitFrequency::Sporadic,
        _ => CommitFrequency::Inactive,
    }
}

pub fn classify_maintenance(
    frequency: CommitFrequency,
    archived: bool,
    last_push: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> MaintenanceStatus {
    if archived {
        return MaintenanceStatus::Archived;
    }
    if last_push.is_some_and(|pushed| (now - pushed).num_days() > STALE_AFTER_DAYS) {
        return MaintenanceStatus::Inactive;
    }

    match frequency {
        CommitFrequency::Daily | CommitFrequency::Weekly => MaintenanceStatus::ActivelyMaintained,
        CommitFrequency::Monthly => MaintenanceStatus::Maintained,
        CommitFrequency::Sporadic => MaintenanceStatus::LightlyMaintained,
        CommitFrequency::Inactive => MaintenanceStatus::Inactive,
    }
}
