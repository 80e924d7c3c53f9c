use tracing::debug;

use crate::detection::{framework_for, LANGUAGE_RUNTIMES, LOCKFILES};
use crate::error::AnalysisError;
use crate::github::GitHubClient;
use crate::identifier::RepositoryId;
use crate::manifest::{DependencySet, ManifestKind, ParsedManifest};
use crate::models::{DependencyCounts, TechStack};
use crate::tree::RawTree;

use super::{degrade, Extracted};

const KEY_DEPS_LIMIT: usize = 10;

/// Tech-stack facet plus the manifest's workspace flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TechStackFindings {
    pub tech_stack: TechStack,
    /// The manifest declared a workspace (e.g. `[workspace]` in `Cargo.toml`).
    pub workspace: bool,
}

pub async fn extract_tech_stack(
    client: &GitHubClient,
    repo: &RepositoryId,
    tree: &RawTree,
    primary_language: Option<&str>,
) -> Result<Extracted<TechStackFindings>, AnalysisError> {
    let mut warnings = Vec::new();
    let runtime = primary_language
        .and_then(|lang| LANGUAGE_RUNTIMES.get(lang))
        .map(|r| r.to_string());

    let preferred = primary_language.map_or(&[][..], ManifestKind::for_language);
    let mut tried: Vec<ManifestKind> = Vec::new();
    let mut manifest = read_first(client, repo, tree, preferred, &mut tried, &mut warnings).await?;

    if manifest.is_none() {
        let remaining: Vec<ManifestKind> = ManifestKind::FALLBACK_ORDER
            .into_iter()
            .filter(|kind| !tried.contains(kind))
            .collect();
        manifest = read_first(client, repo, tree, &remaining, &mut tried, &mut warnings).await?;
    }

    let parsed = manifest.unwrap_or_default();
    let package_manager = parsed
        .package_manager
        .clone()
        .or_else(|| lockfile_package_manager(tree));
    let framework = parsed
        .deps
        .direct
        .iter()
        .find_map(|dep| framework_for(dep))
        .map(str::to_string);

    let tech_stack = TechStack {
        runtime,
        framework,
        package_manager,
        dependencies: DependencyCounts {
            direct: parsed.deps.direct.len(),
            dev: parsed.deps.dev.len(),
            test: parsed.deps.test.len(),
        },
        key_deps: key_dependencies(&parsed.deps),
    };

    Ok(Extracted::new(
        TechStackFindings {
            tech_stack,
            workspace: parsed.workspace,
        },
        warnings,
    ))
}

/// The first direct dependencies in declaration order.
pub(crate) fn key_dependencies(deps: &DependencySet) -> Vec<String> {
    deps.direct.iter().take(KEY_DEPS_LIMIT).cloned().collect()
}

/// Parse the first manifest among `kinds` that is present at the root and readable.
async fn read_first(
    client: &GitHubClient,
    repo: &RepositoryId,
    tree: &RawTree,
    kinds: &[ManifestKind],
    tried: &mut Vec<ManifestKind>,
    warnings: &mut Vec<String>,
) -> Result<Option<ParsedManifest>, AnalysisError> {
    for &kind in kinds {
        tried.push(kind);
        for file in kind.file_names() {
            if !tree.has_file(file) {
                continue;
            }
            let content = degrade(client.file_content(repo, file).await, None, file, warnings)?;
            if let Some(content) = content {
                debug!(manifest = file, "parsing manifest");
                return Ok(Some(kind.parse(&content)));
            }
        }
    }
    Ok(None)
}

/// Package manager implied by the first root lockfile present.
pub fn lockfile_package_manager(tree: &RawTree) -> Option<String> {
    LOCKFILES
        .iter()
        .find(|(file, _)| tree.has_file(file))
        .map(|(_, manager)| manager.to_string())
}
