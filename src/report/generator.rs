//! Report generation.
//!
//! Renders a [`Summary`] as plain text, Markdown or JSON.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::models::{CategoryBreakdown, Drilldown, MetricsSummary, PageBreakdown, Summary};

/// Render the summary in the requested format.
pub fn render(summary: &Summary, format: OutputFormat, precision: usize) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(generate_text_report(summary, precision)),
        OutputFormat::Markdown => Ok(generate_markdown_report(summary, precision)),
        OutputFormat::Json => generate_json_report(summary),
    }
}

/// The drilldown line printed at the end of a text report.
pub fn drilldown_line(drilldown: &Drilldown) -> String {
    format!("Drilldown Data: {}", drilldown)
}

/// Generate a plain text report.
pub fn generate_text_report(summary: &Summary, precision: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("📊 Audit Summary: {}\n", summary.metadata.input));
    output.push_str(&format!("   Pages scanned: {}\n", summary.pages_scanned));
    output.push_str(&format!(
        "   Pages with issues: {} | without issues: {}\n\n",
        summary.pages.with_issues, summary.pages.without_issues
    ));

    output.push_str(&text_drilldown("All issues", &summary.drilldown_all));
    output.push_str(&text_drilldown(
        "High severity issues",
        &summary.drilldown_high,
    ));

    match summary.metrics {
        Some(ref metrics) => {
            output.push_str(&format!(
                "🔴 High severity: {} of {} tagged issues ({:.*}%)\n",
                metrics.high_severity_count,
                metrics.total_count,
                precision,
                metrics.high_severity_percentage
            ));
        }
        None => output.push_str("🔴 High severity: unavailable (malformed records)\n"),
    }

    let severity = &summary.severity;
    output.push_str(&format!(
        "   Tagged: {} | High: {} | Medium: {} | Low: {} | Other: {}\n",
        severity.total(),
        severity.high,
        severity.medium,
        severity.low,
        severity.other
    ));
    output.push_str(&text_categories(&summary.categories));
    output.push_str(&format!(
        "   Health score: {:.*}\n\n",
        precision, summary.dashboard.health_score
    ));

    if !summary.pages.most_problematic.is_empty() {
        output.push_str("Most problematic pages:\n");
        for (i, page) in summary.pages.most_problematic.iter().enumerate() {
            output.push_str(&format!(
                "   {}. {} ({} issue{})\n",
                i + 1,
                page.page,
                page.issue_count,
                if page.issue_count == 1 { "" } else { "s" }
            ));
        }
        output.push('\n');
    }

    output.push_str(&drilldown_line(&summary.drilldown_high));
    output.push('\n');

    output
}

fn text_categories(categories: &CategoryBreakdown) -> String {
    let parts: Vec<String> = categories
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(topic, count)| format!("{}: {}", topic, count))
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    format!("   By category: {}\n", parts.join(" | "))
}

fn text_drilldown(title: &str, drilldown: &Drilldown) -> String {
    let mut section = format!(
        "{} ({}, {} in tracked categories):\n",
        title,
        drilldown.total,
        drilldown.categorized()
    );
    for (category, count) in drilldown.iter() {
        section.push_str(&format!("   {:<18} {}\n", format!("{}:", category), count));
    }
    section.push('\n');
    section
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(summary: &Summary, precision: usize) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# SEO Audit Summary\n\n");

    // Metadata section
    output.push_str("## Metadata\n\n");
    output.push_str(&format!("- **Input:** `{}`\n", summary.metadata.input));
    output.push_str(&format!(
        "- **Generated:** {}\n",
        summary.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("- **Pages Scanned:** {}\n\n", summary.pages_scanned));

    // Dashboard
    output.push_str("## Overview\n\n");
    output.push_str("| Critical Issues | Overall Issues | Pages Scanned | Health Score |\n");
    output.push_str("|:---:|:---:|:---:|:---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} | {:.*} |\n\n",
        summary.dashboard.critical_issues,
        summary.dashboard.overall_issues,
        summary.dashboard.pages_scanned,
        precision,
        summary.dashboard.health_score
    ));

    output.push_str(&generate_drilldown_section(
        &summary.drilldown_all,
        &summary.drilldown_high,
    ));
    output.push_str(&generate_metrics_section(summary.metrics.as_ref(), precision));

    let severity = &summary.severity;
    output.push_str("### Severity Breakdown\n\n");
    output.push_str("| High | Medium | Low | Other |\n");
    output.push_str("|:---:|:---:|:---:|:---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        severity.high, severity.medium, severity.low, severity.other
    ));

    output.push_str(&generate_categories_section(&summary.categories));
    output.push_str(&generate_pages_section(&summary.pages));

    // Footer
    output.push_str("---\n\n");
    output.push_str(&format!(
        "*Generated by seodrill v{}*\n",
        summary.metadata.tool_version
    ));

    output
}

/// Generate the drilldown table with both views side by side.
fn generate_drilldown_section(all: &Drilldown, high: &Drilldown) -> String {
    let mut section = String::new();

    section.push_str("## Drilldown\n\n");
    section.push_str("| Category | Issue Types | All | High |\n");
    section.push_str("|:---|:---|:---:|:---:|\n");

    for (category, count) in all.iter() {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            category,
            category.issue_types().join(", "),
            count,
            high.get(category)
        ));
    }
    section.push_str(&format!(
        "| **Total** | | **{}** | **{}** |\n\n",
        all.total, high.total
    ));

    section
}

fn generate_metrics_section(metrics: Option<&MetricsSummary>, precision: usize) -> String {
    let mut section = String::new();

    section.push_str("## Severity Metrics\n\n");

    let Some(metrics) = metrics else {
        section.push_str("Severity metrics were skipped because some records are malformed.\n\n");
        return section;
    };

    section.push_str(&format!(
        "- **High Severity Issues:** {}\n",
        metrics.high_severity_count
    ));
    section.push_str(&format!("- **Tagged Issues:** {}\n", metrics.total_count));
    section.push_str(&format!(
        "- **High Severity Share:** {:.*}%\n\n",
        precision, metrics.high_severity_percentage
    ));

    section
}

/// Generate the issues-by-category table.
fn generate_categories_section(categories: &CategoryBreakdown) -> String {
    let mut section = String::new();

    section.push_str("### Issues by Category\n\n");
    section.push_str("| Category | Count |\n");
    section.push_str("|:---|:---:|\n");

    for (topic, count) in categories.iter() {
        section.push_str(&format!("| {} | {} |\n", topic, count));
    }
    section.push('\n');

    section
}

fn generate_pages_section(pages: &PageBreakdown) -> String {
    let mut section = String::new();

    section.push_str("## Pages\n\n");
    section.push_str(&format!(
        "{} page(s) with issues, {} without.\n\n",
        pages.with_issues, pages.without_issues
    ));

    if pages.most_problematic.is_empty() {
        return section;
    }

    section.push_str("### Most Problematic Pages\n\n");
    section.push_str("| Page | Issues |\n");
    section.push_str("|:---|:---:|\n");
    for page in &pages.most_problematic {
        section.push_str(&format!("| `{}` | {} |\n", page.page, page.issue_count));
    }
    section.push('\n');

    section
}

/// Generate a JSON report.
pub fn generate_json_report(summary: &Summary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DashboardStats, DrilldownCategory, IssueTopic, PageIssueCount, ReportMetadata,
        SeverityBreakdown,
    };
    use chrono::Utc;

    fn create_test_summary() -> Summary {
        let mut drilldown_all = Drilldown::default();
        drilldown_all.increment(DrilldownCategory::Heading);
        drilldown_all.increment(DrilldownCategory::Canonical);
        drilldown_all.increment(DrilldownCategory::MetaDescription);
        drilldown_all.total = 3;

        let mut drilldown_high = Drilldown::default();
        drilldown_high.increment(DrilldownCategory::Heading);
        drilldown_high.increment(DrilldownCategory::MetaDescription);
        drilldown_high.total = 2;

        let mut categories = CategoryBreakdown::default();
        categories.increment(IssueTopic::MetaAndTags);
        categories.increment(IssueTopic::MetaAndTags);
        categories.increment(IssueTopic::ContentAndSeo);

        Summary {
            metadata: ReportMetadata {
                input: "sample.json".to_string(),
                generated_at: Utc::now(),
                tool_version: "1.0.0".to_string(),
            },
            pages_scanned: 2,
            drilldown_all,
            drilldown_high,
            metrics: Some(MetricsSummary::from_counts(2, 3)),
            severity: SeverityBreakdown {
                high: 2,
                medium: 0,
                low: 1,
                other: 0,
            },
            categories,
            pages: PageBreakdown {
                with_issues: 2,
                without_issues: 0,
                most_problematic: vec![PageIssueCount {
                    page: "https://a.test/".to_string(),
                    issue_count: 2,
                }],
            },
            dashboard: DashboardStats {
                critical_issues: 2,
                overall_issues: 3,
                pages_scanned: 2,
                health_score: 100.0,
            },
        }
    }

    #[test]
    fn test_generate_text_report() {
        let summary = create_test_summary();
        let text = generate_text_report(&summary, 1);

        assert!(text.contains("Pages scanned: 2"));
        assert!(text.contains("All issues (3, 3 in tracked categories):"));
        assert!(text.contains("Tagged: 3 | High: 2"));
        assert!(text.contains("2 of 3 tagged issues (66.7%)"));
        assert!(text.contains("https://a.test/ (2 issues)"));
        assert!(text.contains("By category: Meta & Tags: 2 | Content & SEO: 1\n"));
        assert!(text.ends_with(
            "Drilldown Data: {'Heading': 1, 'Canonical': 0, 'Meta Description': 1}\n"
        ));
    }

    #[test]
    fn test_text_report_without_metrics() {
        let mut summary = create_test_summary();
        summary.metrics = None;

        let text = generate_text_report(&summary, 1);
        assert!(text.contains("unavailable"));
    }

    #[test]
    fn test_generate_markdown_report() {
        let summary = create_test_summary();
        let markdown = generate_markdown_report(&summary, 0);

        assert!(markdown.contains("# SEO Audit Summary"));
        assert!(markdown.contains("## Drilldown"));
        assert!(markdown.contains("| Canonical | Canonical | 1 | 0 |"));
        assert!(markdown.contains("| Heading | H1, H2 | 1 | 1 |"));
        assert!(markdown.contains("| **Total** | | **3** | **2** |"));
        assert!(markdown.contains("- **High Severity Share:** 67%"));
        assert!(markdown.contains("`https://a.test/`"));
        assert!(markdown.contains("### Issues by Category"));
        assert!(markdown.contains("| Meta & Tags | 2 |"));
        assert!(markdown.contains("| Linking | 0 |"));
    }

    #[test]
    fn test_generate_json_report() {
        let summary = create_test_summary();
        let json = generate_json_report(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["pages_scanned"], 2);
        assert_eq!(value["drilldown_high"]["Canonical"], 0);
        assert_eq!(value["metrics"]["total_count"], 3);
        assert_eq!(value["dashboard"]["critical_issues"], 2);
        assert_eq!(value["categories"]["Meta & Tags"], 2);
        assert_eq!(value["categories"]["Other"], 0);
    }

    #[test]
    fn test_render_dispatch() {
        let summary = create_test_summary();
        let json = render(&summary, OutputFormat::Json, 1).unwrap();
        assert!(json.trim_start().starts_with('{'));

        let text = render(&summary, OutputFormat::Text, 1).unwrap();
        assert!(text.starts_with("📊"));
    }
}
