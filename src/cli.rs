use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "repoprobe",
    about = "Profile a GitHub repository's stack, architecture, health and security posture",
    version
)]
pub struct Cli {
    /// Repository as `owner/name` or a GitHub URL
    pub repo: String,

    /// GitHub token [default: config file, then $GITHUB_TOKEN]
    #[arg(short, long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Config file [default: ./.repoprobe/config.toml, fallback ~/.config/repoprobe/config.toml]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Indent JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Print a single top-level field of the result
    #[arg(short, long, value_name = "NAME")]
    pub field: Option<String>,

    /// No progress spinner
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["repoprobe", "octocat/Hello-World"]).unwrap();
        assert_eq!(cli.repo, "octocat/Hello-World");
        assert_eq!(cli.report, ReportFormat::Json);
        assert!(!cli.pretty && !cli.quiet && !cli.verbose);
        assert!(cli.token.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from([
            "repoprobe", "-p", "-q", "-f", "health", "-t", "abc", "--report", "terminal", "a/b",
        ])
        .unwrap();
        assert!(cli.pretty && cli.quiet);
        assert_eq!(cli.field.as_deref(), Some("health"));
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert_eq!(cli.report, ReportFormat::Terminal);
    }

    #[test]
    fn test_repo_is_required() {
        assert!(Cli::try_parse_from(["repoprobe"]).is_err());
    }
}
