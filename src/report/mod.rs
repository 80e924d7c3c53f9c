//! Report renderers for analysis results.
//!
//! - [`terminal`]: colored header plus one table per facet, then warnings.
//!
//! JSON output is plain `serde_json` and lives in `main`.

pub mod terminal;
