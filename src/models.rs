use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Version of the serialized [`AnalysisResult`] layout.
pub const SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub schema_version: String,
    /// `owner/name`.
    pub repo: String,
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    pub summary: RepoSummary,
    pub tech_stack: TechStack,
    pub architecture: Architecture,
    pub health: Health,
    pub security: Security,
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    /// Top-level field names, in serialization order.
    pub const FIELDS: [&'static str; 10] = [
        "schema_version",
        "repo",
        "url",
        "analyzed_at",
        "summary",
        "tech_stack",
        "architecture",
        "health",
        "security",
        "warnings",
    ];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepoSummary {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub last_commit: Option<DateTime<Utc>>,
    pub age_days: i64,
    pub license: Option<String>,
    pub primary_language: Option<String>,
    pub languages: LanguageMix,
}

/// Language → share of total bytes (percent, one decimal), largest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LanguageMix(pub Vec<(String, f64)>);

impl LanguageMix {
    pub fn get(&self, language: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == language)
            .map(|(_, pct)| *pct)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, pct)| (name.as_str(), *pct))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LanguageMix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, pct)| (name, pct)))
    }
}

impl<'de> Deserialize<'de> for LanguageMix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MixVisitor;

        impl<'de> Visitor<'de> for MixVisitor {
            type Value = LanguageMix;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language to percentage")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((name, pct)) = map.next_entry::<String, f64>()? {
                    entries.push((name, pct));
                }
                Ok(LanguageMix(entries))
            }
        }

        deserializer.deserialize_map(MixVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TechStack {
    pub runtime: Option<String>,
    pub framework: Option<String>,
    pub package_manager: Option<String>,
    pub dependencies: DependencyCounts,
    /// First ten direct dependencies, in manifest order.
    pub key_deps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DependencyCounts {
    pub direct: usize,
    pub dev: usize,
    pub test: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Architecture {
    pub monorepo: bool,
    pub docker: bool,
    pub ci_cd: Vec<String>,
    pub test_framework: Option<String>,
    pub has_tests: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// GitHub's `open_issues_count`, which also counts open pull requests.
    pub open_issues: u64,
    /// Not fetched separately; always 0.
    pub open_prs: u64,
    pub contributors: u64,
    pub commit_frequency: CommitFrequency,
    pub maintenance_status: MaintenanceStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Security {
    pub has_env_file: bool,
    pub dependabot_enabled: bool,
    pub branch_protection: bool,
    pub security_policy: bool,
}

/// How often commits land, from the median gap between recent commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitFrequency {
    Daily,
    Weekly,
    Monthly,
    Sporadic,
    Inactive,
}

impl fmt::Display for CommitFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitFrequency::Daily => write!(f, "daily"),
            CommitFrequency::Weekly => write!(f, "weekly"),
            CommitFrequency::Monthly => write!(f, "monthly"),
            CommitFrequency::Sporadic => write!(f, "sporadic"),
            CommitFrequency::Inactive => write!(f, "inactive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    ActivelyMaintained,
    Maintained,
    LightlyMaintained,
    Inactive,
    Archived,
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceStatus::ActivelyMaintained => write!(f, "actively maintained"),
            MaintenanceStatus::Maintained => write!(f, "maintained"),
            MaintenanceStatus::LightlyMaintained => write!(f, "lightly maintained"),
            MaintenanceStatus::Inactive => write!(f, "inactive"),
            MaintenanceStatus::Archived => write!(f, "archived"),
        }
    }
}
