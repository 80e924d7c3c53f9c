use serde::Deserialize;

use super::ParsedManifest;

#[derive(Debug, Deserialize)]
struct CargoManifest {
    #[serde(default)]
    dependencies: toml::Table,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: toml::Table,
    /// Only its presence matters.
    workspace: Option<toml::Value>,
}

/// Parse `Cargo.toml`: `[dependencies]`, `[dev-dependencies]` and the `[workspace]` flag.
pub fn parse_cargo_toml(content: &str) -> ParsedManifest {
    let manifest: CargoManifest = match toml::from_str(content) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "Cargo.toml could not be parsed");
            return ParsedManifest::default();
        }
    };

    let mut parsed = ParsedManifest {
        workspace: manifest.workspace.is_some(),
        ..ParsedManifest::default()
    };

    for name in manifest.dependencies.keys() {
        parsed.deps.add_direct(name.as_str());
    }
    for name in manifest.dev_dependencies.keys() {
        parsed.deps.add_dev(name.as_str());
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cargo_toml() {
        let content = r#"
[package]
name = "my-app"
version = "0.1.0"

[dependencies]
actix-web = "4"
serde = { version = "1", features = ["derive"] }
tokio = { version = "1", features = ["full"] }

[dev-dependencies]
criterion = "0.5"

[workspace]
members = ["crate-a", "crate-b"]
"#;
        let parsed = parse_cargo_toml(content);
        assert_eq!(parsed.deps.direct, vec!["actix-web", "serde", "tokio"]);
        assert_eq!(parsed.deps.dev, vec!["criterion"]);
        assert!(parsed.workspace);
        assert_eq!(parsed.package_manager, None);
    }

    #[test]
    fn test_no_workspace_no_deps() {
        let parsed = parse_cargo_toml("[package]\nname = \"tiny\"\n");
        assert!(parsed.deps.is_empty());
        assert!(!parsed.workspace);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_cargo_toml("[dependencies\nserde ="), ParsedManifest::default());
    }
}
