//! Dependency-manifest parsers, one module per ecosystem.
//!
//! Every parser is a pure `&str -> ParsedManifest` function. Malformed input yields an
//! empty [`ParsedManifest`] rather than an error so a bad manifest never aborts an
//! analysis. [`ManifestKind`] is the single dispatch point used by the tech-stack
//! extractor.

pub mod cmake;
pub mod go;
pub mod java;
pub mod node;
pub mod python;
pub mod ruby;
pub mod rust;

use once_cell::sync::Lazy;
use regex::Regex;

/// Direct, dev and test dependency identifiers, each list free of duplicates and in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub direct: Vec<String>,
    pub dev: Vec<String>,
    pub test: Vec<String>,
}

impl DependencySet {
    pub fn add_direct(&mut self, name: impl Into<String>) {
        push_unique(&mut self.direct, name.into());
    }

    pub fn add_dev(&mut self, name: impl Into<String>) {
        push_unique(&mut self.dev, name.into());
    }

    pub fn add_test(&mut self, name: impl Into<String>) {
        push_unique(&mut self.test, name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.dev.is_empty() && self.test.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, name: String) {
    if !name.is_empty() && !list.contains(&name) {
        list.push(name);
    }
}

/// Output of one parser call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub deps: DependencySet,
    /// Package manager declared by the manifest itself, if any.
    pub package_manager: Option<String>,
    /// The manifest declares a multi-project workspace.
    pub workspace: bool,
}

/// The manifest formats we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    NodeManifest,
    PythonProject,
    Requirements,
    RustManifest,
    GoModule,
    GradleScript,
    MavenPom,
    Gemfile,
    CMakeScript,
}

impl ManifestKind {
    /// Priority order used when the primary language gives no usable manifest.
    pub const FALLBACK_ORDER: [ManifestKind; 9] = [
        ManifestKind::NodeManifest,
        ManifestKind::PythonProject,
        ManifestKind::Requirements,
        ManifestKind::RustManifest,
        ManifestKind::GoModule,
        ManifestKind::GradleScript,
        ManifestKind::MavenPom,
        ManifestKind::Gemfile,
        ManifestKind::CMakeScript,
    ];

    /// Root-level file names this format is read from, most preferred first.
    pub fn file_names(self) -> &'static [&'static str] {
        match self {
            ManifestKind::NodeManifest => &["package.json"],
            ManifestKind::PythonProject => &["pyproject.toml"],
            ManifestKind::Requirements => &["requirements.txt"],
            ManifestKind::RustManifest => &["Cargo.toml"],
            ManifestKind::GoModule => &["go.mod"],
            ManifestKind::GradleScript => &["build.gradle", "build.gradle.kts"],
            ManifestKind::MavenPom => &["pom.xml"],
            ManifestKind::Gemfile => &["Gemfile"],
            ManifestKind::CMakeScript => &["CMakeLists.txt"],
        }
    }

    /// Manifests to try first for a repository whose primary language is `language`.
    pub fn for_language(language: &str) -> &'static [ManifestKind] {
        match language {
            "JavaScript" | "TypeScript" => &[ManifestKind::NodeManifest],
            "Python" => &[ManifestKind::PythonProject, ManifestKind::Requirements],
            "Rust" => &[ManifestKind::RustManifest],
            "Go" => &[ManifestKind::GoModule],
            "Java" | "Kotlin" | "Groovy" => &[ManifestKind::GradleScript, ManifestKind::MavenPom],
            "Ruby" => &[ManifestKind::Gemfile],
            "C" | "C++" => &[ManifestKind::CMakeScript],
            _ => &[],
        }
    }

    pub fn parse(self, content: &str) -> ParsedManifest {
        match self {
            ManifestKind::NodeManifest => node::parse_package_json(content),
            ManifestKind::PythonProject => python::parse_pyproject_toml(content),
            ManifestKind::Requirements => python::parse_requirements_txt(content),
            ManifestKind::RustManifest => rust::parse_cargo_toml(content),
            ManifestKind::GoModule => go::parse_go_mod(content),
            ManifestKind::GradleScript => java::parse_build_gradle(content),
            ManifestKind::MavenPom => java::parse_pom_xml(content),
            ManifestKind::Gemfile => ruby::parse_gemfile(content),
            ManifestKind::CMakeScript => cmake::parse_cmakelists(content),
        }
    }
}

static PEP508_NAME_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[><=!~\[;@\s]").expect("requirement name regex"));

/// Strip version specifiers, extras and markers from a PEP 508 requirement, lowercased.
pub(crate) fn requirement_name(spec: &str) -> String {
    let spec = spec.trim();
    let end = PEP508_NAME_END.find(spec).map_or(spec.len(), |m| m.start());
    spec[..end].trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_set_dedups_in_order() {
        let mut deps = DependencySet::default();
        deps.add_direct("b");
        deps.add_direct("a");
        deps.add_direct("b");
        deps.add_dev("");
        assert_eq!(deps.direct, vec!["b", "a"]);
        assert!(deps.dev.is_empty());
    }

    #[test]
    fn test_requirement_name() {
        assert_eq!(requirement_name("FastAPI>=0.100"), "fastapi");
        assert_eq!(requirement_name("uvicorn[standard]==0.2"), "uvicorn");
        assert_eq!(requirement_name("pkg ; python_version < '3.9'"), "pkg");
        assert_eq!(requirement_name("name @ https://x/y.whl"), "name");
        assert_eq!(requirement_name("pydantic~=2.0"), "pydantic");
        assert_eq!(requirement_name(""), "");
    }

    #[test]
    fn test_every_fallback_kind_has_a_file() {
        for kind in ManifestKind::FALLBACK_ORDER {
            assert!(!kind.file_names().is_empty());
        }
        assert_eq!(
            ManifestKind::for_language("Python"),
            &[ManifestKind::PythonProject, ManifestKind::Requirements]
        );
        assert!(ManifestKind::for_language("COBOL").is_empty());
    }

    #[test]
    fn test_dispatch_is_deterministic() {
        let content = "flask>=2\nrequests\nflask\n";
        let a = ManifestKind::Requirements.parse(content);
        let b = ManifestKind::Requirements.parse(content);
        assert_eq!(a, b);
        assert_eq!(a.deps.direct, vec!["flask", "requests"]);
    }
}
