//! Data models for the audit statistics.
//!
//! This module contains the page and issue records decoded from an audit
//! export, the fixed drilldown taxonomy, and the summary values derived
//! from them.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Severity label that marks an issue as high severity. Matched exactly.
pub const HIGH_SEVERITY: &str = "HIGH";

/// Category of the fixed drilldown taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrilldownCategory {
    /// Heading problems (`H1`, `H2`)
    Heading,
    /// Canonical tag problems
    Canonical,
    /// Meta description problems
    MetaDescription,
}

impl DrilldownCategory {
    /// Every category, in report order.
    pub const ALL: [DrilldownCategory; 3] = [
        DrilldownCategory::Heading,
        DrilldownCategory::Canonical,
        DrilldownCategory::MetaDescription,
    ];

    /// Issue types matched by each category. Shared by both drilldowns.
    const TAXONOMY: [(DrilldownCategory, &'static [&'static str]); 3] = [
        (DrilldownCategory::Heading, &["H1", "H2"]),
        (DrilldownCategory::Canonical, &["Canonical"]),
        (DrilldownCategory::MetaDescription, &["Meta Description"]),
    ];

    /// Returns the label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            DrilldownCategory::Heading => "Heading",
            DrilldownCategory::Canonical => "Canonical",
            DrilldownCategory::MetaDescription => "Meta Description",
        }
    }

    /// Returns the issue types that fall into this category.
    pub fn issue_types(&self) -> &'static [&'static str] {
        Self::TAXONOMY
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, keys)| *keys)
            .unwrap_or(&[])
    }

    /// Maps an issue type onto its category, if it is part of the taxonomy.
    ///
    /// Matching is exact and case-sensitive.
    pub fn from_issue_type(issue_type: &str) -> Option<Self> {
        Self::TAXONOMY
            .iter()
            .find(|(_, keys)| keys.contains(&issue_type))
            .map(|(category, _)| *category)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DrilldownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for DrilldownCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A single issue detected on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Free-form category label (e.g. "H1", "Canonical", "Title").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    /// Severity label.
    ///
    /// The outer `Option` is `None` when the key is absent, the inner one
    /// is `None` when the key is present but `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub severity: Option<Option<String>>,
    /// Short issue text, used when `type` is missing.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    /// Human-readable explanation of the issue.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub explanation: Option<String>,
}

/// Marks a key as present, keeping `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Decodes an informational field, mapping a value of the wrong type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl IssueRecord {
    /// Creates an issue with a type and a (possibly null) severity.
    #[cfg(test)]
    pub fn new(issue_type: &str, severity: Option<&str>) -> Self {
        Self {
            issue_type: Some(issue_type.to_string()),
            severity: Some(severity.map(String::from)),
            text: None,
            explanation: None,
        }
    }

    /// Returns the severity label, treating absent and `null` alike.
    pub fn severity_label(&self) -> Option<&str> {
        self.severity.as_ref().and_then(|s| s.as_deref())
    }

    /// Whether the severity is exactly [`HIGH_SEVERITY`].
    pub fn is_high(&self) -> bool {
        self.severity_label() == Some(HIGH_SEVERITY)
    }

    /// Returns the drilldown category of this issue, if any.
    pub fn category(&self) -> Option<DrilldownCategory> {
        self.issue_type
            .as_deref()
            .and_then(DrilldownCategory::from_issue_type)
    }

    /// Text the issue topic is classified from: the first non-empty of
    /// `type`, `text` and `explanation`.
    pub fn topic_text(&self) -> &str {
        [&self.issue_type, &self.text, &self.explanation]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|text| !text.is_empty())
            .unwrap_or("")
    }

    /// Returns the dashboard topic of this issue.
    pub fn topic(&self) -> IssueTopic {
        IssueTopic::classify(self.topic_text())
    }
}

/// One scanned page of the audit export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page URL.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    /// Page title.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    /// Issues detected on the page; `None` when the key is absent or null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<IssueRecord>>,
}

impl PageRecord {
    /// Creates a page carrying the given issues.
    #[cfg(test)]
    pub fn with_issues(issues: Vec<IssueRecord>) -> Self {
        Self {
            url: None,
            title: None,
            issues: Some(issues),
        }
    }

    /// Label for reports: the URL, else the title, else `page #<index>`.
    pub fn label(&self, index: usize) -> String {
        self.url
            .as_deref()
            .or(self.title.as_deref())
            .filter(|label| !label.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("page #{}", index))
    }

    /// Returns the issues on this page, empty when the field is missing.
    pub fn issues(&self) -> &[IssueRecord] {
        self.issues.as_deref().unwrap_or(&[])
    }
}

/// Broad topic of an issue, matched by keywords in its text.
///
/// Unlike [`DrilldownCategory`] this covers every issue: anything that
/// matches no keyword is [`IssueTopic::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueTopic {
    MetaAndTags,
    Performance,
    ContentAndSeo,
    Linking,
    Technical,
    Other,
}

impl IssueTopic {
    /// Every topic, in report order.
    pub const ALL: [IssueTopic; 6] = [
        IssueTopic::MetaAndTags,
        IssueTopic::Performance,
        IssueTopic::ContentAndSeo,
        IssueTopic::Linking,
        IssueTopic::Technical,
        IssueTopic::Other,
    ];

    /// Lowercase keywords per topic. The first topic with a match wins.
    const KEYWORDS: [(IssueTopic, &'static [&'static str]); 5] = [
        (
            IssueTopic::MetaAndTags,
            &["meta", "title", "canonical", "graph", "social", "tags", "description"],
        ),
        (
            IssueTopic::Performance,
            &["speed", "optimized", "size", "ratio", "compress"],
        ),
        (
            IssueTopic::ContentAndSeo,
            &[
                "alt text",
                "h1",
                "content",
                "keyword",
                "breadcrumb",
                "heading",
                "image",
                "readability",
            ],
        ),
        (
            IssueTopic::Linking,
            &["link", "broken link", "external link", "internal link"],
        ),
        (
            IssueTopic::Technical,
            &[
                "robot", "sitemap", "redirect", "https", "favicon", "language", "schema",
                "indexing",
            ],
        ),
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IssueTopic::MetaAndTags => "Meta & Tags",
            IssueTopic::Performance => "Performance",
            IssueTopic::ContentAndSeo => "Content & SEO",
            IssueTopic::Linking => "Linking",
            IssueTopic::Technical => "Technical",
            IssueTopic::Other => "Other",
        }
    }

    /// Classifies issue text, ignoring case.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();

        Self::KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
            .map(|(topic, _)| *topic)
            .unwrap_or(IssueTopic::Other)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for IssueTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Issue counts per [`IssueTopic`]. Every issue lands in exactly one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryBreakdown {
    counts: [usize; 6],
}

impl CategoryBreakdown {
    pub fn get(&self, topic: IssueTopic) -> usize {
        self.counts[topic.index()]
    }

    pub fn increment(&mut self, topic: IssueTopic) {
        self.counts[topic.index()] += 1;
    }

    /// Iterates over `(topic, count)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (IssueTopic, usize)> + '_ {
        IssueTopic::ALL
            .into_iter()
            .map(move |topic| (topic, self.get(topic)))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl Serialize for CategoryBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(IssueTopic::ALL.len()))?;
        for (topic, count) in self.iter() {
            map.serialize_entry(topic.label(), &count)?;
        }
        map.end()
    }
}

/// Per-category issue counts over the drilldown taxonomy.
///
/// All categories are always present, starting at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drilldown {
    counts: [usize; 3],
    /// Number of issues the drilldown considered, whatever their type.
    pub total: usize,
}

impl Drilldown {
    /// Returns the count for a category.
    pub fn get(&self, category: DrilldownCategory) -> usize {
        self.counts[category.index()]
    }

    /// Increments the count for a category.
    pub fn increment(&mut self, category: DrilldownCategory) {
        self.counts[category.index()] += 1;
    }

    /// Iterates over `(category, count)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (DrilldownCategory, usize)> + '_ {
        DrilldownCategory::ALL
            .into_iter()
            .map(move |c| (c, self.get(c)))
    }

    /// Sum of the category counts (issues inside the taxonomy).
    pub fn categorized(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for Drilldown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (category, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", category, count)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Drilldown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(DrilldownCategory::ALL.len() + 1))?;
        for (category, count) in self.iter() {
            map.serialize_entry(category.label(), &count)?;
        }
        map.serialize_entry("Total", &self.total)?;
        map.end()
    }
}

/// Severity metrics over all severity-tagged issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Issues whose severity is exactly "HIGH".
    pub high_severity_count: usize,
    /// Issues with a non-null severity.
    pub total_count: usize,
    /// `100 * high / total`, or 0 when there are no tagged issues.
    pub high_severity_percentage: f64,
}

impl MetricsSummary {
    /// Builds the summary from the two counters.
    pub fn from_counts(high_severity_count: usize, total_count: usize) -> Self {
        let high_severity_percentage = if total_count > 0 {
            (high_severity_count as f64 / total_count as f64) * 100.0
        } else {
            0.0
        };

        Self {
            high_severity_count,
            total_count,
            high_severity_percentage,
        }
    }
}

/// Severity-tagged issues grouped by label, case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Non-blank labels other than high/medium/low.
    pub other: usize,
}

impl SeverityBreakdown {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.other
    }
}

/// Issue count of a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageIssueCount {
    /// URL of the page, or `page #<index>` when it has none.
    pub page: String,
    pub issue_count: usize,
}

/// How issues are spread across pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageBreakdown {
    pub with_issues: usize,
    pub without_issues: usize,
    /// Pages with the most issues, highest first.
    pub most_problematic: Vec<PageIssueCount>,
}

/// Headline numbers of the audit dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// High-severity issues of any type.
    pub critical_issues: usize,
    /// Issues of any type and severity.
    pub overall_issues: usize,
    pub pages_scanned: usize,
    /// High-severity issues per scanned page, as a percentage.
    pub health_score: f64,
}

/// Metadata about a generated summary.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the audit export that was read.
    pub input: String,
    /// When the summary was generated.
    pub generated_at: DateTime<Utc>,
    /// Version of the tool that produced it.
    pub tool_version: String,
}

/// Complete statistics for one audit export.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub metadata: ReportMetadata,
    pub pages_scanned: usize,
    pub drilldown_all: Drilldown,
    pub drilldown_high: Drilldown,
    /// `None` when metrics were skipped in lenient mode.
    pub metrics: Option<MetricsSummary>,
    pub severity: SeverityBreakdown,
    /// Every issue grouped by keyword topic.
    pub categories: CategoryBreakdown,
    pub pages: PageBreakdown,
    pub dashboard: DashboardStats,
}
