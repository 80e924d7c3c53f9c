use once_cell::sync::Lazy;
use regex::Regex;

use super::ParsedManifest;

const DEV_GROUPS: [&str; 3] = ["development", "test", "dev"];

static GEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^gem\s*\(?\s*['"]([^'"]+)['"]"#).expect("gem regex"));

static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^group\s*\(?(.+?)\)?\s+do\s*(\|[^|]*\|)?$").expect("group regex"));

static GROUP_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#":(\w+)|['"](\w+)['"]"#).expect("group name regex"));

// Any other construct closed by `end`: `platforms :jruby do`, `if ENV[...]`, ...
static BLOCK_OPEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\bdo\s*(\|[^|]*\|)?$)|^(if|unless|case|begin|while|until)\b")
        .expect("block regex")
});

/// Parse a `Gemfile`: gems inside a development/test group are dev dependencies.
///
/// Blocks are tracked on a stack, so a block nested inside a dev group stays dev and the
/// group only ends at its own `end`.
pub fn parse_gemfile(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    // One entry per open block: whether gems inside it are dev dependencies.
    let mut blocks: Vec<bool> = Vec::new();

    for line in content.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let in_dev = blocks.last().copied().unwrap_or(false);

        if let Some(caps) = GROUP_RE.captures(stripped) {
            let is_dev_group = GROUP_NAME_RE.captures_iter(&caps[1]).any(|c| {
                c.get(1)
                    .or_else(|| c.get(2))
                    .is_some_and(|m| DEV_GROUPS.contains(&m.as_str()))
            });
            blocks.push(in_dev || is_dev_group);
            continue;
        }

        if stripped == "end" || stripped.starts_with("end ") {
            blocks.pop();
            continue;
        }

        if let Some(caps) = GEM_RE.captures(stripped) {
            let name = &caps[1];
            if in_dev {
                parsed.deps.add_dev(name);
            } else {
                parsed.deps.add_direct(name);
            }
            continue;
        }

        if BLOCK_OPEN_RE.is_match(stripped) {
            blocks.push(in_dev);
        }
    }

    parsed
}
