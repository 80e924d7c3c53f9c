use serde_json::Value;

use crate::error::AnalysisError;
use crate::github::GitHubClient;
use crate::identifier::RepositoryId;
use crate::models::Security;
use crate::tree::RawTree;

use super::{degrade, Extracted};

pub const ENV_FILE_WARNING: &str = ".env file committed to repository";
pub const BRANCH_PROTECTION_WARNING: &str =
    "Branch protection status unknown (requires admin access or authenticated request)";

const DEPENDABOT_FILES: [&str; 2] = [".github/dependabot.yml", ".github/dependabot.yaml"];

const SECURITY_POLICY_FILES: [&str; 4] = [
    "SECURITY.md",
    "security.md",
    ".github/SECURITY.md",
    "docs/SECURITY.md",
];

pub async fn extract_security(
    client: &GitHubClient,
    repo: &RepositoryId,
    tree: &RawTree,
    record: &Value,
) -> Result<Extracted<Security>, AnalysisError> {
    let mut warnings = Vec::new();

    let has_env_file = tree.has_file(".env");
    if has_env_file {
        warnings.push(ENV_FILE_WARNING.to_string());
    }

    let default_branch = record
        .get("default_branch")
        .and_then(Value::as_str)
        .filter(|b| !b.is_empty())
        .unwrap_or("main");
    let path = format!("{}/branches/{}/protection", repo.api_path(), default_branch);
    let protection = client.get(&path, &[]).await.and_then(|r| r.into_found());
    let protection = degrade(protection, None, "branch protection", &mut warnings)?;

    let branch_protection = protection.is_some();
    if !branch_protection {
        warnings.push(BRANCH_PROTECTION_WARNING.to_string());
    }

    let security = Security {
        has_env_file,
        dependabot_enabled: DEPENDABOT_FILES.iter().any(|f| tree.has_file(f)),
        branch_protection,
        security_policy: SECURITY_POLICY_FILES.iter().any(|f| tree.has_file(f)),
    };

    Ok(Extracted::new(security, warnings))
}
