//! Issue aggregation and statistics.
//!
//! Every function here is a single pass over the page records. The counting
//! and drilldown functions are lenient about missing fields and degrade to
//! zero counts; [`compute_metrics`] requires well-formed records.

use crate::error::MalformedRecord;
use crate::models::{
    CategoryBreakdown, DashboardStats, Drilldown, MetricsSummary, PageBreakdown, PageIssueCount, PageRecord,
    SeverityBreakdown, HIGH_SEVERITY,
};
use serde_json::Value;

/// Number of pages in the decoded export, or 0 if it is not an array.
pub fn count_pages_scanned(data: &Value) -> usize {
    data.as_array().map_or(0, Vec::len)
}

/// Count every issue by drilldown category.
pub fn drilldown_all(pages: &[PageRecord]) -> Drilldown {
    let mut drilldown = Drilldown::default();

    for issue in pages.iter().flat_map(PageRecord::issues) {
        drilldown.total += 1;
        if let Some(category) = issue.category() {
            drilldown.increment(category);
        }
    }

    drilldown
}

/// Count high-severity issues by drilldown category.
pub fn drilldown_high(pages: &[PageRecord]) -> Drilldown {
    let mut drilldown = Drilldown::default();

    for issue in pages
        .iter()
        .flat_map(PageRecord::issues)
        .filter(|issue| issue.is_high())
    {
        drilldown.total += 1;
        if let Some(category) = issue.category() {
            drilldown.increment(category);
        }
    }

    drilldown
}

/// Compute high-severity metrics over all severity-tagged issues.
///
/// Every page must carry `issues` and every issue must carry `severity`
/// (which may be null).
pub fn compute_metrics(pages: &[PageRecord]) -> Result<MetricsSummary, MalformedRecord> {
    let mut high_severity_count = 0;
    let mut total_count = 0;

    for (page_index, page) in pages.iter().enumerate() {
        let issues = page
            .issues
            .as_ref()
            .ok_or(MalformedRecord::MissingPageField {
                page: page_index,
                field: "issues",
            })?;

        for (issue_index, issue) in issues.iter().enumerate() {
            let severity = issue
                .severity
                .as_ref()
                .ok_or(MalformedRecord::MissingIssueField {
                    page: page_index,
                    issue: issue_index,
                    field: "severity",
                })?;

            if let Some(label) = severity {
                total_count += 1;
                if label == HIGH_SEVERITY {
                    high_severity_count += 1;
                }
            }
        }
    }

    Ok(MetricsSummary::from_counts(high_severity_count, total_count))
}

/// Group severity-tagged issues by label, ignoring case.
///
/// Blank labels count as untagged.
pub fn severity_breakdown(pages: &[PageRecord]) -> SeverityBreakdown {
    let mut breakdown = SeverityBreakdown::default();

    for issue in pages.iter().flat_map(PageRecord::issues) {
        let Some(label) = issue.severity_label().map(str::trim) else {
            continue;
        };

        match label.to_ascii_uppercase().as_str() {
            "" => {}
            "HIGH" => breakdown.high += 1,
            "MEDIUM" => breakdown.medium += 1,
            "LOW" => breakdown.low += 1,
            _ => breakdown.other += 1,
        }
    }

    breakdown
}

/// Group every issue by keyword topic.
pub fn category_breakdown(pages: &[PageRecord]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();

    for issue in pages.iter().flat_map(PageRecord::issues) {
        breakdown.increment(issue.topic());
    }

    breakdown
}

/// Split pages by whether they have issues and pick the `top_n` worst ones.
pub fn page_breakdown(pages: &[PageRecord], top_n: usize) -> PageBreakdown {
    let mut counts: Vec<PageIssueCount> = pages
        .iter()
        .enumerate()
        .map(|(index, page)| PageIssueCount {
            page: page.label(index),
            issue_count: page.issues().len(),
        })
        .collect();

    let with_issues = counts.iter().filter(|p| p.issue_count > 0).count();

    // Stable sort keeps input order among equal counts
    counts.retain(|p| p.issue_count > 0);
    counts.sort_by_key(|p| std::cmp::Reverse(p.issue_count));
    counts.truncate(top_n);

    PageBreakdown {
        with_issues,
        without_issues: pages.len() - with_issues,
        most_problematic: counts,
    }
}

/// Headline numbers for the dashboard.
pub fn dashboard_stats(pages_scanned: usize, all: &Drilldown, high: &Drilldown) -> DashboardStats {
    let health_score = high.total as f64 / pages_scanned.max(1) as f64 * 100.0;

    DashboardStats {
        critical_issues: high.total,
        overall_issues: all.total,
        pages_scanned,
        health_score,
    }
}
