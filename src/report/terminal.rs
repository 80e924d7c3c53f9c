use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use repoprobe::models::{AnalysisResult, CommitFrequency, MaintenanceStatus};

/// Render a colored terminal report.
pub fn render(result: &AnalysisResult) -> Result<()> {
    println!(
        "\n {} v{}",
        "repoprobe".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" {}  {}", result.repo.bold().cyan(), result.url.dimmed());
    println!(
        " Analyzed: {}\n",
        result.analyzed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    render_summary(result);
    render_tech_stack(result);
    render_architecture(result);
    render_health(result);
    render_security(result);

    if !result.warnings.is_empty() {
        println!(" {} Warnings:\n", "[WARN]".yellow().bold());
        for warning in &result.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
        println!();
    }

    Ok(())
}

fn render_summary(result: &AnalysisResult) {
    let s = &result.summary;
    let mut table = facet_table();
    table.add_row(vec![Cell::new("Stars"), Cell::new(s.stars)]);
    table.add_row(vec![Cell::new("Forks"), Cell::new(s.forks)]);
    table.add_row(vec![Cell::new("Watchers"), Cell::new(s.watchers)]);
    table.add_row(vec![Cell::new("Age (days)"), Cell::new(s.age_days)]);
    table.add_row(vec![
        Cell::new("Last push"),
        Cell::new(
            s.last_commit
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]);
    table.add_row(vec![Cell::new("License"), optional(s.license.as_deref())]);
    table.add_row(vec![
        Cell::new("Primary language"),
        optional(s.primary_language.as_deref()),
    ]);

    let languages: Vec<String> = s
        .languages
        .iter()
        .take(5)
        .map(|(name, pct)| format!("{} {:.1}%", name, pct))
        .collect();
    table.add_row(vec![
        Cell::new("Languages"),
        Cell::new(if languages.is_empty() {
            "-".to_string()
        } else {
            languages.join(", ")
        }),
    ]);

    section("SUMMARY", table);
}

fn render_tech_stack(result: &AnalysisResult) {
    let t = &result.tech_stack;
    let mut table = facet_table();
    table.add_row(vec![Cell::new("Runtime"), optional(t.runtime.as_deref())]);
    table.add_row(vec![Cell::new("Framework"), optional(t.framework.as_deref())]);
    table.add_row(vec![
        Cell::new("Package manager"),
        optional(t.package_manager.as_deref()),
    ]);
    table.add_row(vec![
        Cell::new("Dependencies"),
        Cell::new(format!(
            "{} direct, {} dev, {} test",
            t.dependencies.direct, t.dependencies.dev, t.dependencies.test
        )),
    ]);
    table.add_row(vec![
        Cell::new("Key dependencies"),
        Cell::new(if t.key_deps.is_empty() {
            "-".to_string()
        } else {
            t.key_deps.join(", ")
        }),
    ]);

    section("TECH STACK", table);
}

fn render_architecture(result: &AnalysisResult) {
    let a = &result.architecture;
    let mut table = facet_table();
    table.add_row(vec![Cell::new("Monorepo"), flag(a.monorepo)]);
    table.add_row(vec![Cell::new("Docker"), flag(a.docker)]);
    table.add_row(vec![
        Cell::new("CI/CD"),
        Cell::new(if a.ci_cd.is_empty() {
            "-".to_string()
        } else {
            a.ci_cd.join(", ")
        }),
    ]);
    table.add_row(vec![Cell::new("Tests"), flag(a.has_tests)]);
    table.add_row(vec![
        Cell::new("Test framework"),
        optional(a.test_framework.as_deref()),
    ]);

    section("ARCHITECTURE", table);
}

fn render_health(result: &AnalysisResult) {
    let h = &result.health;
    let frequency_color = match h.commit_frequency {
        CommitFrequency::Daily | CommitFrequency::Weekly => Color::Green,
        CommitFrequency::Monthly => Color::Yellow,
        CommitFrequency::Sporadic => Color::DarkYellow,
        CommitFrequency::Inactive => Color::Red,
    };
    let status_color = match h.maintenance_status {
        MaintenanceStatus::ActivelyMaintained => Color::Green,
        MaintenanceStatus::Maintained => Color::Yellow,
        MaintenanceStatus::LightlyMaintained => Color::DarkYellow,
        MaintenanceStatus::Inactive => Color::Red,
        MaintenanceStatus::Archived => Color::DarkGrey,
    };

    let mut table = facet_table();
    table.add_row(vec![
        Cell::new("Open issues (incl. PRs)"),
        Cell::new(h.open_issues),
    ]);
    table.add_row(vec![Cell::new("Contributors"), Cell::new(h.contributors)]);
    table.add_row(vec![
        Cell::new("Commit frequency"),
        Cell::new(h.commit_frequency.to_string()).fg(frequency_color),
    ]);
    table.add_row(vec![
        Cell::new("Maintenance"),
        Cell::new(h.maintenance_status.to_string()).fg(status_color),
    ]);

    section("HEALTH", table);
}

fn render_security(result: &AnalysisResult) {
    let s = &result.security;
    let mut table = facet_table();
    // A committed .env is the one signal where "yes" is bad.
    table.add_row(vec![
        Cell::new(".env committed"),
        if s.has_env_file {
            Cell::new("✗ yes").fg(Color::Red)
        } else {
            Cell::new("✓ no").fg(Color::Green)
        }
        .set_alignment(CellAlignment::Center),
    ]);
    table.add_row(vec![Cell::new("Dependabot"), flag(s.dependabot_enabled)]);
    table.add_row(vec![
        Cell::new("Branch protection"),
        flag(s.branch_protection),
    ]);
    table.add_row(vec![Cell::new("Security policy"), flag(s.security_policy)]);

    section("SECURITY", table);
}

fn facet_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Signal").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
    table
}

fn section(title: &str, table: Table) {
    println!(" {}\n", title.bold());
    println!("{}\n", table);
}

fn flag(value: bool) -> Cell {
    let (text, color) = if value {
        ("✓ yes", Color::Green)
    } else {
        ("✗ no", Color::DarkGrey)
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Center)
}

fn optional(value: Option<&str>) -> Cell {
    match value {
        Some(v) => Cell::new(v),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}
