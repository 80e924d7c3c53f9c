//! The analysis pipeline: parse the identifier, fetch the base payloads, run the
//! extractors and assemble an [`AnalysisResult`].

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::extract::{
    degrade, extract_architecture, extract_health, extract_metadata, extract_security, extract_tech_stack,
};
use crate::github::{ApiResponse, ClientConfig, GitHubClient};
use crate::identifier::RepositoryId;
use crate::models::{AnalysisResult, SCHEMA_VERSION};
use crate::tree::RawTree;

pub const TRUNCATED_TREE_WARNING: &str =
    "Repository file tree was truncated by the API; path-based signals may be incomplete";

/// Analyze `input` (`owner/name` or a GitHub URL) with a fresh client.
pub async fn analyze(input: &str, config: ClientConfig) -> Result<AnalysisResult, AnalysisError> {
    let repo = RepositoryId::parse(input)?;
    let client = GitHubClient::new(config)?;
    run(&repo, &client, Utc::now()).await
}

/// Analyze `input` through a caller-owned client, e.g. to share its cache.
pub async fn analyze_with_client(
    input: &str,
    client: &GitHubClient,
) -> Result<AnalysisResult, AnalysisError> {
    let repo = RepositoryId::parse(input)?;
    run(&repo, client, Utc::now()).await
}

async fn run(
    repo: &RepositoryId,
    client: &GitHubClient,
    now: DateTime<Utc>,
) -> Result<AnalysisResult, AnalysisError> {
    info!(repo = %repo, "analysis started");
    let base = repo.api_path();
    let languages_path = format!("{}/languages", base);
    let tree_path = format!("{}/git/trees/HEAD", base);

    // A failed tree fetch (409 for an empty repository) degrades to an empty tree.
    let (record, languages, tree) = tokio::try_join!(
        client.get(&base, &[]),
        client.get(&languages_path, &[]),
        async { Ok::<_, AnalysisError>(client.get(&tree_path, &[("recursive", "1")]).await) },
    )?;

    let Some(record) = record.into_found()? else {
        return Err(AnalysisError::NotFound {
            owner: repo.owner().to_string(),
            name: repo.name().to_string(),
        });
    };
    let languages = languages.into_found()?;
    let mut warnings = Vec::new();
    let tree = degrade(
        tree.and_then(ApiResponse::into_found),
        None,
        "file tree",
        &mut warnings,
    )?
    .map(|payload| RawTree::from_api(&payload))
    .unwrap_or_default();
    debug!(truncated = tree.is_truncated(), "file tree loaded");

    let summary = extract_metadata(&record, languages.as_ref(), now);
    let primary_language = summary.primary_language.as_deref();

    let (tech, health, security) = tokio::try_join!(
        extract_tech_stack(client, repo, &tree, primary_language),
        extract_health(client, repo, &record, now),
        extract_security(client, repo, &tree, &record),
    )?;

    let findings = tech.value;
    let architecture = extract_architecture(
        &tree,
        &findings.tech_stack.key_deps,
        findings.workspace,
    );

    if tree.is_truncated() {
        warnings.push(TRUNCATED_TREE_WARNING.to_string());
    }
    warnings.extend(tech.warnings);
    warnings.extend(health.warnings);
    warnings.extend(security.warnings);
    warnings.extend(client.warnings());

    let result = AnalysisResult {
        schema_version: SCHEMA_VERSION.to_string(),
        repo: repo.full_name(),
        url: html_url(&record).unwrap_or_else(|| repo.html_url()),
        analyzed_at: now,
        summary,
        tech_stack: findings.tech_stack,
        architecture,
        health: health.value,
        security: security.value,
        warnings,
    };

    info!(
        repo = %repo,
        warnings = result.warnings.len(),
        rate_remaining = ?client.rate_remaining(),
        "analysis finished"
    );
    Ok(result)
}

fn html_url(record: &Value) -> Option<String> {
    record
        .get("html_url")
        .and_then(Value::as_str)
        .map(str::to_string)
}
