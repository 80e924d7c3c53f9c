//! `repoprobe`: profile a GitHub repository from its API metadata and manifests.
//!
//! # Flow
//! 1. Parse the identifier ([`identifier::RepositoryId`]).
//! 2. Fetch the repository record, language breakdown and file tree ([`github`]).
//! 3. Run the facet extractors ([`extract`]), reading manifests through [`manifest`]
//!    and matching them against the [`detection`] tables.
//! 4. Assemble an [`AnalysisResult`] ([`analysis::analyze`]).

pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod extract;
pub mod github;
pub mod identifier;
pub mod manifest;
pub mod models;
pub mod tree;

pub use analysis::{analyze, analyze_with_client};
pub use error::AnalysisError;
pub use github::{ApiResponse, ClientConfig, GitHubClient};
pub use identifier::RepositoryId;
pub use models::AnalysisResult;
