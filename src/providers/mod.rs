mod treeherder;

use async_trait::async_trait;

use crate::error::Result;

pub use treeherder::{Artifact, JobId, JobOutcome, JobRecord, ResultSet, TreeherderClient};

/// Read-only view of a CI metadata service.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Result sets (pushes) recorded for a revision.
    async fn result_sets(&self, repo: &str, revision: &str) -> Result<Vec<ResultSet>>;

    /// Up to `count` jobs belonging to a result set, in service order.
    async fn jobs(&self, repo: &str, result_set_id: u64, count: usize) -> Result<Vec<JobRecord>>;

    /// Artifacts of the given kind attached to a job.
    async fn artifacts(&self, repo: &str, job_id: JobId, kind: &str) -> Result<Vec<Artifact>>;
}

/// Raw, still-encoded body of a downloaded log.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// Value of the `Content-Encoding` response header, if any.
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

/// Transport used to download log bodies.
#[async_trait]
pub trait LogTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawLog>;
}
