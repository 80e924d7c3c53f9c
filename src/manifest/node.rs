use serde_json::Value;

use super::ParsedManifest;

const KNOWN_MANAGERS: [&str; 4] = ["npm", "yarn", "pnpm", "bun"];

/// Parse `package.json`: `dependencies` and `devDependencies` keys in document order,
/// plus the `packageManager` field.
pub fn parse_package_json(content: &str) -> ParsedManifest {
    let json: Value = match serde_json::from_str(content) {
        Ok(json) => json,
        Err(e) => {
            tracing::debug!(error = %e, "package.json is not valid JSON");
            return ParsedManifest::default();
        }
    };

    let mut parsed = ParsedManifest::default();

    if let Some(pkgs) = json.get("dependencies").and_then(|v| v.as_object()) {
        for name in pkgs.keys() {
            parsed.deps.add_direct(name.as_str());
        }
    }

    if let Some(pkgs) = json.get("devDependencies").and_then(|v| v.as_object()) {
        for name in pkgs.keys() {
            parsed.deps.add_dev(name.as_str());
        }
    }

    // "pnpm@8.6.0+sha256.abc" → "pnpm"
    parsed.package_manager = json
        .get("packageManager")
        .and_then(|v| v.as_str())
        .and_then(|field| field.split('@').next())
        .map(str::to_lowercase)
        .filter(|name| KNOWN_MANAGERS.contains(&name.as_str()));

    parsed
}
