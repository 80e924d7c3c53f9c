use std::collections::HashMap;

use serde::Deserialize;

use super::{requirement_name, ParsedManifest};

/// PEP 621 optional-dependency groups that count as development dependencies.
const DEV_GROUPS: [&str; 4] = ["dev", "test", "testing", "development"];

#[derive(Debug, Default, Deserialize)]
struct Pyproject {
    #[serde(default)]
    project: PyprojectProject,
    #[serde(default)]
    tool: Tool,
    #[serde(default, rename = "build-system")]
    build_system: BuildSystem,
}

#[derive(Debug, Default, Deserialize)]
struct PyprojectProject {
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default, rename = "optional-dependencies")]
    optional_dependencies: HashMap<String, Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct Tool {
    poetry: Option<Poetry>,
}

/// Legacy Poetry layout. Values are version strings or inline tables, so only the keys
/// are read.
#[derive(Debug, Default, Deserialize)]
struct Poetry {
    #[serde(default)]
    dependencies: toml::Table,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: toml::Table,
    #[serde(default)]
    group: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
struct BuildSystem {
    #[serde(default, rename = "build-backend")]
    build_backend: String,
}

/// Parse `pyproject.toml`: PEP 621 `[project]` plus legacy `[tool.poetry]` tables.
pub fn parse_pyproject_toml(content: &str) -> ParsedManifest {
    let pyproject: Pyproject = match toml::from_str(content) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "pyproject.toml could not be parsed");
            return ParsedManifest::default();
        }
    };

    let mut parsed = ParsedManifest::default();

    for spec in &pyproject.project.dependencies {
        parsed.deps.add_direct(requirement_name(spec));
    }

    for group in DEV_GROUPS {
        if let Some(specs) = pyproject.project.optional_dependencies.get(group) {
            for spec in specs {
                parsed.deps.add_dev(requirement_name(spec));
            }
        }
    }

    if let Some(poetry) = &pyproject.tool.poetry {
        for name in poetry.dependencies.keys() {
            let name = name.to_lowercase();
            if name != "python" {
                parsed.deps.add_direct(name);
            }
        }

        // [tool.poetry.group.<name>.dependencies], every group counts as dev
        for group in poetry.group.values() {
            if let Some(deps) = group.get("dependencies").and_then(|d| d.as_table()) {
                for name in deps.keys() {
                    parsed.deps.add_dev(name.to_lowercase());
                }
            }
        }

        for name in poetry.dev_dependencies.keys() {
            parsed.deps.add_dev(name.to_lowercase());
        }
    }

    parsed.package_manager = package_manager_for_backend(&pyproject.build_system.build_backend);
    parsed
}

fn package_manager_for_backend(backend: &str) -> Option<String> {
    let pm = if backend.contains("poetry") {
        "poetry"
    } else if backend.contains("hatchling")
        || backend.contains("hatch")
        || backend.contains("setuptools")
        || backend.contains("flit")
    {
        "pip"
    } else if backend.contains("pdm") {
        "pdm"
    } else {
        return None;
    };
    Some(pm.to_string())
}

/// Parse `requirements.txt`: one requirement per line; comments and `-` options skipped.
pub fn parse_requirements_txt(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        parsed.deps.add_direct(requirement_name(line));
    }

    parsed
}
