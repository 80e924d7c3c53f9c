use crate::detection::{test_framework_for, CI_SYSTEMS, TEST_CONFIG_FILES};
use crate::models::Architecture;
use crate::tree::{file_name, RawTree};

/// Root files that declare a JavaScript or Go multi-project workspace.
const WORKSPACE_CONFIGS: [&str; 5] = [
    "lerna.json",
    "pnpm-workspace.yaml",
    "nx.json",
    "turbo.json",
    "go.work",
];

const MONOREPO_DIRS: [&str; 2] = ["packages", "apps"];

const DOCKER_FILES: [&str; 6] = [
    "Dockerfile",
    "Containerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

const TEST_DIRS: [&str; 3] = ["tests", "test", "__tests__"];

const TEST_FILE_SUFFIXES: [&str; 9] = [
    "_test.py",
    "_test.go",
    "_test.rs",
    ".test.js",
    ".test.ts",
    ".test.tsx",
    ".spec.js",
    ".spec.ts",
    ".spec.tsx",
];

/// Derive architecture signals from the tree and the tech stack's key dependencies.
pub fn extract_architecture(
    tree: &RawTree,
    key_deps: &[String],
    cargo_workspace: bool,
) -> Architecture {
    let has_tests = detect_has_tests(tree);
    let test_framework = detect_test_framework(tree, key_deps, has_tests);

    Architecture {
        monorepo: cargo_workspace || detect_monorepo(tree),
        docker: tree.files().any(|p| DOCKER_FILES.contains(&file_name(p))),
        ci_cd: detect_ci(tree),
        test_framework,
        has_tests,
    }
}

fn detect_monorepo(tree: &RawTree) -> bool {
    if WORKSPACE_CONFIGS.iter().any(|f| tree.has_file(f)) {
        return true;
    }

    let nested_package_json = tree
        .files()
        .filter(|p| p.contains('/') && file_name(p) == "package.json")
        .count();
    if nested_package_json >= 2 {
        return true;
    }

    directory_names(tree).any(|dir| MONOREPO_DIRS.contains(&dir))
}

fn detect_ci(tree: &RawTree) -> Vec<String> {
    CI_SYSTEMS
        .iter()
        .filter(|(_, signature)| tree.files().any(|p| signature.matches(p)))
        .map(|(name, _)| name.to_string())
        .collect()
}

fn detect_has_tests(tree: &RawTree) -> bool {
    directory_names(tree).any(|dir| TEST_DIRS.contains(&dir))
        || tree
            .files()
            .any(|p| TEST_FILE_SUFFIXES.iter().any(|suffix| p.ends_with(suffix)))
}

fn detect_test_framework(tree: &RawTree, key_deps: &[String], has_tests: bool) -> Option<String> {
    let from_deps = key_deps.iter().find_map(|dep| test_framework_for(dep));
    if let Some(framework) = from_deps {
        return Some(framework.to_string());
    }

    let from_config = TEST_CONFIG_FILES.iter().find(|(pattern, _)| {
        tree.files().any(|p| {
            let name = file_name(p);
            name == *pattern
                || name
                    .strip_prefix(*pattern)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    });
    if let Some((_, framework)) = from_config {
        return Some(framework.to_string());
    }

    if !has_tests {
        return None;
    }
    if tree.files().any(|p| p.ends_with("_test.go")) {
        return Some("go test".to_string());
    }
    let rust_tests = tree.files().any(|p| {
        p.ends_with("_test.rs") || (p.ends_with(".rs") && in_directory_named(p, "tests"))
    });
    rust_tests.then(|| "cargo test".to_string())
}

/// Names of every directory in the tree: explicit directory entries plus the parent
/// segments of every file path.
fn directory_names(tree: &RawTree) -> impl Iterator<Item = &str> {
    let explicit = tree.directories().map(file_name);
    let parents = tree.files().flat_map(|p| {
        let mut segments: Vec<&str> = p.split('/').collect();
        segments.pop();
        segments
    });
    explicit.chain(parents)
}

fn in_directory_named(path: &str, dir: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments.contains(&dir)
}
