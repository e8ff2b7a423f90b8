// martgate-core/src/domain/check.rs

use std::fmt;

use serde::Serialize;

/// Outcome taxonomy of a check.
///
/// WARN means the invariant could not be evaluated (missing structure);
/// FAIL means it was evaluated and violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform record produced by every check.
///
/// Fields are private: a sample query can only be attached through
/// [`CheckResult::fail_with_sample`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    name: String,
    status: CheckStatus,
    details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_query: Option<String>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::build(name, CheckStatus::Pass, details, None)
    }

    pub fn warn(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::build(name, CheckStatus::Warn, details, None)
    }

    pub fn fail(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self::build(name, CheckStatus::Fail, details, None)
    }

    /// FAIL attributable to rows: `sample_query` returns (a bounded sample of) them.
    pub fn fail_with_sample(
        name: impl Into<String>,
        details: impl Into<String>,
        sample_query: impl Into<String>,
    ) -> Self {
        let query = sample_query.into().trim().to_string();
        let query = (!query.is_empty()).then_some(query);
        Self::build(name, CheckStatus::Fail, details, query)
    }

    fn build(
        name: impl Into<String>,
        status: CheckStatus,
        details: impl Into<String>,
        sample_query: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            details: details.into(),
            sample_query,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn sample_query(&self) -> Option<&str> {
        self.sample_query.as_deref()
    }

    pub fn is_pass(&self) -> bool {
        self.status == CheckStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}

/// Per-status tally. Statuses that never occurred count as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub warn: usize,
}

impl StatusCounts {
    pub fn tally(results: &[CheckResult]) -> Self {
        results
            .iter()
            .fold(Self::default(), |mut counts, r| {
                match r.status() {
                    CheckStatus::Pass => counts.pass += 1,
                    CheckStatus::Fail => counts.fail += 1,
                    CheckStatus::Warn => counts.warn += 1,
                }
                counts
            })
    }

    pub fn get(&self, status: CheckStatus) -> usize {
        match status {
            CheckStatus::Pass => self.pass,
            CheckStatus::Fail => self.fail,
            CheckStatus::Warn => self.warn,
        }
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PASS={}, FAIL={}, WARN={}", self.pass, self.fail, self.warn)
    }
}
