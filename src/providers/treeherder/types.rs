use std::fmt;

use serde::Deserialize;

pub type JobId = u64;

/// A Treeherder result set, the grouping of jobs pushed for one revision.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    pub id: u64,
}

/// One executed CI job as reported by Treeherder.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    /// Job type, e.g. "build-linux64/opt" or "test-windows10-64/debug-mochitest-1"
    pub job_type_name: String,
    /// Final outcome of the job
    pub result: JobOutcome,
    /// Epoch seconds
    pub start_timestamp: i64,
    /// Epoch seconds
    pub end_timestamp: i64,
}

impl JobRecord {
    /// Total wall-clock time of the job in seconds.
    pub fn total_seconds(&self) -> i64 {
        self.end_timestamp - self.start_timestamp
    }
}

/// Outcome of a job.
///
/// Statuses other than success, failure and retry are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum JobOutcome {
    Success,
    Failure,
    Retry,
    Other(String),
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
            Self::Retry => f.write_str("retry"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

impl From<String> for JobOutcome {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "testfailed" | "busted" | "failure" => Self::Failure,
            "retry" => Self::Retry,
            _ => Self::Other(value),
        }
    }
}

/// An artifact attached to a job. Only the log summary payload is modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    pub blob: ArtifactBlob,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactBlob {
    #[serde(default)]
    pub logurl: Option<String>,
}

impl Artifact {
    pub fn log_url(&self) -> Option<&str> {
        self.blob.logurl.as_deref()
    }
}

/// Paginated list envelope used by most Treeherder endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct ResultsPage<T> {
    pub results: Vec<T>,
}

/// Some endpoints answer with a bare list, others with a `results` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum ListResponse<T> {
    Page(ResultsPage<T>),
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Page(page) => page.results,
            Self::Bare(items) => items,
        }
    }
}
