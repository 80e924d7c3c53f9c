use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ParsedManifest;

static FIND_PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)find_package\s*\(\s*(\w+)").expect("find_package regex"));

/// Parse `CMakeLists.txt`: the first argument of every `find_package(...)` call.
///
/// Names are deduplicated case-insensitively; the casing of the first occurrence is kept.
pub fn parse_cmakelists(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    let mut seen: HashSet<String> = HashSet::new();

    for caps in FIND_PACKAGE_RE.captures_iter(content) {
        let name = &caps[1];
        if seen.insert(name.to_lowercase()) {
            parsed.deps.add_direct(name);
        }
    }

    parsed
}
