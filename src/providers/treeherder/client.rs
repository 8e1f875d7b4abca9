use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{PhaseLensError, Result};
use crate::providers::{LogTransport, MetadataService, RawLog};

use super::types::{Artifact, JobId, JobRecord, ListResponse, ResultSet};

/// Client for Treeherder's REST API and the log storage it links to.
pub struct TreeherderClient {
    client: Client,
    api_url: Url,
}

impl TreeherderClient {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        // No automatic decompression, so the declared encoding can be checked.
        let client = Client::builder()
            .user_agent(user_agent.to_owned())
            .no_gzip()
            .build()
            .map_err(|e| PhaseLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| PhaseLensError::Config(format!("Invalid base URL: {e}")))?
            .join("api/")
            .map_err(|e| PhaseLensError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self { client, api_url })
    }

    /// Construct an endpoint URL under `project/{repo}/`
    fn project_url(&self, repo: &str, endpoint: &str) -> Result<Url> {
        if repo.is_empty() || repo.contains(['/', '?', '#']) {
            return Err(PhaseLensError::Config(format!(
                "Invalid repository name: {repo}"
            )));
        }

        self.api_url
            .join(&format!("project/{repo}/{endpoint}/"))
            .map_err(|e| PhaseLensError::Config(format!("Invalid project URL: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(PhaseLensError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MetadataService for TreeherderClient {
    async fn result_sets(&self, repo: &str, revision: &str) -> Result<Vec<ResultSet>> {
        let mut url = self.project_url(repo, "resultset")?;
        url.query_pairs_mut().append_pair("revision", revision);

        let response: ListResponse<ResultSet> = self.get_json(url).await?;
        Ok(response.into_vec())
    }

    async fn jobs(&self, repo: &str, result_set_id: u64, count: usize) -> Result<Vec<JobRecord>> {
        let mut url = self.project_url(repo, "jobs")?;
        url.query_pairs_mut()
            .append_pair("count", &count.to_string())
            .append_pair("result_set_id", &result_set_id.to_string());

        let response: ListResponse<JobRecord> = self.get_json(url).await?;
        Ok(response.into_vec())
    }

    async fn artifacts(&self, repo: &str, job_id: JobId, kind: &str) -> Result<Vec<Artifact>> {
        let mut url = self.project_url(repo, "artifact")?;
        url.query_pairs_mut()
            .append_pair("job_id", &job_id.to_string())
            .append_pair("name", kind);

        let response: ListResponse<Artifact> = self.get_json(url).await?;
        Ok(response.into_vec())
    }
}

#[async_trait]
impl LogTransport for TreeherderClient {
    async fn get(&self, url: &str) -> Result<RawLog> {
        debug!("Downloading log from {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT_ENCODING, HeaderValue::from_static("gzip"))
            .send()
            .await?
            .error_for_status()?;

        let content_encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        let body = response.bytes().await?.to_vec();

        Ok(RawLog {
            content_encoding,
            body,
        })
    }
}
