use super::ParsedManifest;

/// Parse `go.mod`: module paths from `require ( … )` blocks and single-line `require`s.
///
/// A block may open and close on the same line.
pub fn parse_go_mod(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    let mut in_require = false;

    for line in content.lines() {
        let mut line = line.trim();

        if !in_require {
            match block_body(line) {
                Some(body) => {
                    in_require = true;
                    line = body.trim();
                }
                None => {
                    if let Some(rest) = line.strip_prefix("require ") {
                        if let Some(module) = rest.split_whitespace().next() {
                            parsed.deps.add_direct(module);
                        }
                    }
                    continue;
                }
            }
        }

        if line.starts_with("//") {
            continue;
        }

        let code = line.split("//").next().unwrap_or_default();
        let (entry, closes) = match code.find(')') {
            Some(end) => (&code[..end], true),
            None => (code, false),
        };
        if let Some(module) = entry.split_whitespace().next() {
            parsed.deps.add_direct(module);
        }
        if closes {
            in_require = false;
        }
    }

    parsed
}

/// Text after the `(` of a `require (` line, with or without the space.
fn block_body(line: &str) -> Option<&str> {
    line.strip_prefix("require")?.trim_start().strip_prefix('(')
}
