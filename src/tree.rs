use std::collections::HashSet;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub kind: EntryKind,
}

/// Flattened recursive file tree of the default branch tip.
#[derive(Debug, Clone, Default)]
pub struct RawTree {
    entries: Vec<TreeEntry>,
    files: HashSet<String>,
    truncated: bool,
}

impl RawTree {
    /// Build from a `git/trees/{sha}?recursive=1` payload.
    ///
    /// `blob` entries become files, `tree` entries directories; submodules are dropped.
    pub fn from_api(payload: &Value) -> Self {
        let entries = payload
            .get("tree")
            .and_then(|t| t.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let path = item.get("path")?.as_str()?;
                        let kind = match item.get("type")?.as_str()? {
                            "blob" => EntryKind::File,
                            "tree" => EntryKind::Directory,
                            _ => return None,
                        };
                        Some(TreeEntry {
                            path: path.to_string(),
                            kind,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let truncated = payload
            .get("truncated")
            .and_then(|t| t.as_bool())
            .unwrap_or(false);

        Self::from_entries(entries, truncated)
    }

    pub fn from_entries(entries: Vec<TreeEntry>, truncated: bool) -> Self {
        let files = entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.path.clone())
            .collect();
        Self {
            entries,
            files,
            truncated,
        }
    }

    /// Convenience for tests and fixtures: a tree made only of files.
    pub fn from_file_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = paths
            .into_iter()
            .map(|p| TreeEntry {
                path: p.into(),
                kind: EntryKind::File,
            })
            .collect();
        Self::from_entries(entries, false)
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::File)
            .map(|e| e.path.as_str())
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Directory)
            .map(|e| e.path.as_str())
    }

    /// Exact path match against files only.
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Last path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_api_kinds() {
        let payload = json!({
            "sha": "abc",
            "tree": [
                {"path": "src", "type": "tree"},
                {"path": "src/main.rs", "type": "blob"},
                {"path": "vendor/lib", "type": "commit"},
                {"type": "blob"}
            ],
            "truncated": true
        });
        let tree = RawTree::from_api(&payload);
        assert_eq!(tree.files().collect::<Vec<_>>(), vec!["src/main.rs"]);
        assert_eq!(tree.directories().collect::<Vec<_>>(), vec!["src"]);
        assert!(tree.has_file("src/main.rs"));
        assert!(!tree.has_file("src"));
        assert!(tree.is_truncated());
    }

    #[test]
    fn test_from_api_missing_tree() {
        let tree = RawTree::from_api(&json!({"message": "Not Found"}));
        assert!(tree.is_empty());
        assert!(!tree.is_truncated());
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("a/b/Dockerfile"), "Dockerfile");
        assert_eq!(file_name("Dockerfile"), "Dockerfile");
    }
}
