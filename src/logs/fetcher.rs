use std::io::Read;

use flate2::read::MultiGzDecoder;
use log::{info, warn};

use crate::error::{PhaseLensError, Result};
use crate::providers::{JobId, JobRecord, LogTransport, MetadataService};

use super::store::LogStore;

/// Artifact kind whose payload carries the URL of a job's log.
pub const TEXT_LOG_SUMMARY: &str = "text_log_summary";

/// Ordered log lines, each keeping its line terminator.
pub type LogLines = Vec<String>;

/// Resolves job logs for one revision, serving them from the store when possible.
pub struct LogFetcher<'a, M, T, S> {
    service: &'a M,
    transport: &'a T,
    store: &'a S,
    repo: &'a str,
    revision: &'a str,
    artifact_name: &'a str,
}

impl<'a, M, T, S> LogFetcher<'a, M, T, S>
where
    M: MetadataService,
    T: LogTransport,
    S: LogStore,
{
    pub fn new(
        service: &'a M,
        transport: &'a T,
        store: &'a S,
        repo: &'a str,
        revision: &'a str,
    ) -> Self {
        Self {
            service,
            transport,
            store,
            repo,
            revision,
            artifact_name: TEXT_LOG_SUMMARY,
        }
    }

    pub fn with_artifact_name(mut self, artifact_name: &'a str) -> Self {
        self.artifact_name = artifact_name;
        self
    }

    /// Prepares the store for this revision. Must run before any job is fetched.
    pub fn prepare(&self) -> Result<()> {
        self.store.prepare(self.revision)
    }

    /// Returns the log lines of `job`, or `None` when the job has no log.
    ///
    /// # Errors
    ///
    /// Fails when the download is not gzip-encoded, when the service answers
    /// with anything other than a connectivity failure, or on storage errors.
    pub async fn fetch(&self, job: &JobRecord) -> Result<Option<LogLines>> {
        let Some(log_url) = self.resolve_log_url(job.id).await? else {
            return Ok(None);
        };

        if let Some(contents) = self.store.load(self.revision, job.id)? {
            return Ok(Some(split_lines(&contents)));
        }

        info!("Downloading {}({})", job.job_type_name, job.id);
        let contents = self.download_and_uncompress(&log_url).await?;
        self.store.save(self.revision, job.id, &contents)?;

        Ok(Some(split_lines(&contents)))
    }

    async fn resolve_log_url(&self, job_id: JobId) -> Result<Option<String>> {
        let artifacts = match self
            .service
            .artifacts(self.repo, job_id, self.artifact_name)
            .await
        {
            Ok(artifacts) => artifacts,
            Err(e) if e.is_connectivity() => {
                warn!("Connection failed for {job_id}: {e}");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(artifact) = artifacts.first() else {
            info!("No artifacts for {job_id}");
            return Ok(None);
        };

        match artifact.log_url() {
            Some(url) => Ok(Some(url.to_string())),
            None => {
                warn!("Artifact for {job_id} carries no log URL");
                Ok(None)
            }
        }
    }

    async fn download_and_uncompress(&self, url: &str) -> Result<Vec<u8>> {
        let raw = self.transport.get(url).await?;

        if raw.content_encoding.as_deref() != Some("gzip") {
            return Err(PhaseLensError::UnexpectedEncoding(raw.content_encoding));
        }

        // Streamed logs may be several gzip members back to back
        let mut contents = Vec::new();
        MultiGzDecoder::new(raw.body.as_slice()).read_to_end(&mut contents)?;
        Ok(contents)
    }
}

fn split_lines(contents: &[u8]) -> LogLines {
    String::from_utf8_lossy(contents)
        .split_inclusive('\n')
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    use crate::error::{PhaseLensError, Result};
    use crate::providers::{
        Artifact, JobId, JobRecord, LogTransport, MetadataService, RawLog, ResultSet,
    };

    pub fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    /// Error with the same shape as a refused TCP connection.
    pub async fn connection_refused() -> PhaseLensError {
        reqwest::get("http://127.0.0.1:1/").await.unwrap_err().into()
    }

    /// Metadata service serving canned jobs and log URLs.
    #[derive(Default)]
    pub struct FakeService {
        pub result_set_ids: Vec<u64>,
        pub jobs: Vec<JobRecord>,
        /// job id -> log URL; jobs missing here have no artifact
        pub log_urls: HashMap<JobId, String>,
        /// job ids whose artifact listing fails with a connection error
        pub unreachable: Vec<JobId>,
        /// job ids whose artifact listing fails with a server error
        pub failing: Vec<JobId>,
        /// job ids whose artifact carries no log URL
        pub without_url: Vec<JobId>,
        pub artifact_calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataService for FakeService {
        async fn result_sets(&self, _repo: &str, _revision: &str) -> Result<Vec<ResultSet>> {
            Ok(self
                .result_set_ids
                .iter()
                .map(|&id| ResultSet { id })
                .collect())
        }

        async fn jobs(&self, _repo: &str, result_set_id: u64, count: usize) -> Result<Vec<JobRecord>> {
            if self.result_set_ids.first() != Some(&result_set_id) {
                return Ok(Vec::new());
            }
            Ok(self.jobs.iter().take(count).cloned().collect())
        }

        async fn artifacts(&self, _repo: &str, job_id: JobId, _kind: &str) -> Result<Vec<Artifact>> {
            self.artifact_calls.fetch_add(1, Ordering::SeqCst);
            if self.unreachable.contains(&job_id) {
                return Err(connection_refused().await);
            }
            if self.failing.contains(&job_id) {
                return Err(PhaseLensError::Api {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            if self.without_url.contains(&job_id) {
                let json = serde_json::json!({"blob": {}});
                return Ok(vec![serde_json::from_value(json).unwrap()]);
            }
            Ok(self
                .log_urls
                .get(&job_id)
                .map(|url| {
                    let json = serde_json::json!({"blob": {"logurl": url}});
                    vec![serde_json::from_value(json).unwrap()]
                })
                .unwrap_or_default())
        }
    }

    /// Transport serving canned bodies and counting downloads.
    #[derive(Default)]
    pub struct FakeTransport {
        /// url -> (content encoding, body)
        pub bodies: HashMap<String, (Option<String>, Vec<u8>)>,
        pub calls: AtomicUsize,
    }

    impl FakeTransport {
        pub fn with_gzip_log(mut self, url: &str, text: &str) -> Self {
            self.bodies
                .insert(url.to_string(), (Some("gzip".to_string()), gzip(text)));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LogTransport for FakeTransport {
        async fn get(&self, url: &str) -> Result<RawLog> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (content_encoding, body) = self.bodies.get(url).cloned().ok_or_else(|| {
                PhaseLensError::Api {
                    status: 404,
                    message: format!("no log at {url}"),
                }
            })?;
            Ok(RawLog {
                content_encoding,
                body,
            })
        }
    }
}
