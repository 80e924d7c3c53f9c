use std::collections::HashSet;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use super::ParsedManifest;

/// Gradle configurations holding main-code dependencies, legacy and annotation
/// processors included.
const DIRECT_CONFIGS: [&str; 8] = [
    "implementation",
    "api",
    "compileOnly",
    "runtimeOnly",
    "compile",
    "runtime",
    "kapt",
    "ksp",
];

const TEST_CONFIGS: [&str; 4] = [
    "testImplementation",
    "testCompileOnly",
    "testRuntimeOnly",
    "androidTestImplementation",
];

// Groovy: implementation 'group:artifact:version'
static GROOVY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\w+)\s+['"]([^'"]+:[^'"]+)['"]"#).expect("groovy dependency regex")
});

// Kotlin DSL: implementation("group:artifact:version")
static KTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\w+)\s*\(\s*['"]([^'"]+:[^'"]+)['"]\s*\)"#).expect("kts dependency regex")
});

/// Parse `build.gradle` / `build.gradle.kts` into `group:artifact` coordinates.
///
/// Both dialects are scanned, Groovy first. The first declaration of a coordinate wins,
/// even when its configuration is neither a main nor a test one.
pub fn parse_build_gradle(content: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    let mut seen: HashSet<String> = HashSet::new();

    for re in [&*GROOVY_RE, &*KTS_RE] {
        for caps in re.captures_iter(content) {
            let config = &caps[1];
            let coordinate = coordinate_without_version(&caps[2]);

            if !seen.insert(coordinate.clone()) {
                continue;
            }

            if TEST_CONFIGS.contains(&config) {
                parsed.deps.add_test(coordinate);
            } else if DIRECT_CONFIGS.contains(&config) {
                parsed.deps.add_direct(coordinate);
            }
        }
    }

    parsed
}

/// "group:artifact:version[:classifier]" → "group:artifact"
fn coordinate_without_version(raw: &str) -> String {
    let mut parts = raw.split(':');
    match (parts.next(), parts.next()) {
        (Some(group), Some(artifact)) => format!("{}:{}", group, artifact),
        _ => raw.to_string(),
    }
}

#[derive(Debug, Default)]
struct PomDependency {
    group_id: String,
    artifact_id: String,
    scope: String,
}

/// Parse `pom.xml`: `<project><dependencies><dependency>` entries as `groupId:artifactId`.
///
/// Elements are matched by local name, so namespaced POMs work. Dependencies under
/// `<dependencyManagement>` or plugins are not direct children and are ignored. Any XML
/// error discards the whole file.
pub fn parse_pom_xml(content: &str) -> ParsedManifest {
    let Some(entries) = read_pom_dependencies(content) else {
        tracing::debug!("pom.xml is not well-formed XML");
        return ParsedManifest::default();
    };

    let mut parsed = ParsedManifest::default();
    for dep in entries {
        if dep.group_id.is_empty() || dep.artifact_id.is_empty() {
            continue;
        }
        let name = format!("{}:{}", dep.group_id, dep.artifact_id);
        if dep.scope.eq_ignore_ascii_case("test") {
            parsed.deps.add_test(name);
        } else {
            parsed.deps.add_direct(name);
        }
    }
    parsed
}

fn read_pom_dependencies(content: &str) -> Option<Vec<PomDependency>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<PomDependency> = None;
    let mut entries = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                path.push(name);
                saw_root = true;
                if is_dependency(&path) {
                    current = Some(PomDependency::default());
                }
            }
            Event::End(_) => {
                if is_dependency(&path) {
                    if let Some(dep) = current.take() {
                        entries.push(dep);
                    }
                }
                path.pop();
            }
            Event::Empty(_) => saw_root = true,
            Event::Text(ref e) => {
                if let (Some(dep), [_, _, _, field]) = (current.as_mut(), path.as_slice()) {
                    let text = e.unescape().ok()?.trim().to_string();
                    match field.as_str() {
                        "groupId" => dep.group_id = text,
                        "artifactId" => dep.artifact_id = text,
                        "scope" => dep.scope = text,
                        _ => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Unclosed elements or no element at all
    if !path.is_empty() || !saw_root {
        return None;
    }
    Some(entries)
}

/// `<root>/<dependencies>/<dependency>`
fn is_dependency(path: &[String]) -> bool {
    matches!(path, [_, deps, dep] if deps == "dependencies" && dep == "dependency")
}
