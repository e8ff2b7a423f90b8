// martgate-core/src/domain/report.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::check::{CheckResult, CheckStatus, StatusCounts};

const TITLE: &str = "# Data Quality Report (Post-Transformation Validation)";

/// Run context printed at the top of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub generated_utc: String,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
    pub engine: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!(
                "unknown report format '{}' (expected markdown or json)",
                other
            )),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Markdown => f.write_str("markdown"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

/// One run's worth of results. Built once, rendered, discarded.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub summary: StatusCounts,
    pub checks: Vec<CheckResult>,
}

#[derive(Serialize)]
struct SampleEntry<'a> {
    name: &'a str,
    query: &'a str,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    #[serde(flatten)]
    report: &'a Report,
    failure_sample_queries: Vec<SampleEntry<'a>>,
}

impl Report {
    /// Keeps `results` in the order given: no sorting, no deduplication.
    pub fn new(metadata: ReportMetadata, results: Vec<CheckResult>) -> Self {
        let summary = StatusCounts::tally(&results);
        Self {
            metadata,
            summary,
            checks: results,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.fail > 0
    }

    /// FAIL results that carry a reproduction query, in check order.
    pub fn failure_samples(&self) -> impl Iterator<Item = (&str, &str)> {
        self.checks.iter().filter_map(|r| match (r.status(), r.sample_query()) {
            (CheckStatus::Fail, Some(q)) => Some((r.name(), q)),
            _ => None,
        })
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Markdown => Ok(self.to_markdown()),
            ReportFormat::Json => self.to_json(),
        }
    }

    pub fn to_markdown(&self) -> String {
        let meta = &self.metadata;
        let mut lines: Vec<String> = vec![
            TITLE.to_string(),
            String::new(),
            format!("- **Generated (UTC):** {}", meta.generated_utc),
            format!("- **Database:** `{}`", meta.database),
            format!("- **Mart schema:** `{}`", meta.schema),
            format!("- **Warehouse:** `{}`", meta.warehouse),
            format!("- **Engine:** `{}`", meta.engine),
            String::new(),
            "## Summary".to_string(),
        ];

        for status in [CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Warn] {
            lines.push(format!("- {}: **{}**", status, self.summary.get(status)));
        }
        lines.push(String::new());

        lines.push("## Checks".to_string());
        lines.push(String::new());
        lines.push("| Status | Check | Details |".to_string());
        lines.push("|---|---|---|".to_string());
        for r in &self.checks {
            lines.push(format!(
                "| {} | {} | {} |",
                r.status(),
                table_cell(r.name()),
                table_cell(r.details())
            ));
        }
        lines.push(String::new());

        let samples: Vec<(&str, &str)> = self.failure_samples().collect();
        if !samples.is_empty() {
            lines.push("## Failure Sample Queries".to_string());
            lines.push("These queries return example failing rows (limited).".to_string());
            lines.push(String::new());
            for (name, query) in samples {
                lines.push(format!("### {}", name));
                lines.push("```sql".to_string());
                lines.push(query.to_string());
                lines.push("```".to_string());
                lines.push(String::new());
            }
        }

        let mut doc = lines.join("\n");
        if !doc.ends_with('\n') {
            doc.push('\n');
        }
        doc
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let doc = JsonDocument {
            report: self,
            failure_sample_queries: self
                .failure_samples()
                .map(|(name, query)| SampleEntry { name, query })
                .collect(),
        };
        serde_json::to_string_pretty(&doc)
    }
}

/// Single-line form of a value for a Markdown table cell.
fn table_cell(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .replace('|', "\\|")
}
