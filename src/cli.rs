use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use crate::config::Config;
use crate::logs::{FsLogStore, LogFetcher};
use crate::measure::PhaseMarkers;
use crate::output::{self, stopped, JobProgress};
use crate::pipeline::{enumerate_jobs, Pipeline};
use crate::providers::TreeherderClient;

#[derive(Parser, Debug)]
#[command(name = "phaselens")]
#[command(author, version, about = "Measure how long a log phase takes across the CI jobs of a revision", long_about = None)]
pub struct Cli {
    /// Revision whose jobs are analyzed
    #[arg(short, long)]
    revision: String,

    /// Repository (project) name on the metadata service
    #[arg(long = "repo", alias = "repo-name")]
    repo_name: String,

    /// Substring marking the beginning of the phase
    #[arg(long)]
    beg_string: String,

    /// Substring marking the end of the phase
    #[arg(long)]
    end_string: String,

    /// Maximum number of jobs to process [default: 5]
    #[arg(long, value_parser = parse_job_count)]
    num_jobs: Option<usize>,

    /// Treeherder instance base URL
    #[arg(short, long, env = "TREEHERDER_URL")]
    url: Option<String>,

    /// Directory where downloaded logs are kept
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_job_count(value: &str) -> std::result::Result<usize, String> {
    let count: usize = value
        .parse()
        .map_err(|e| format!("'{value}' is not a job count: {e}"))?;
    if count == 0 {
        return Err("at least one job must be processed".to_string());
    }
    Ok(count)
}

/// The flag wins over the configured count; either way at least one job is processed.
fn resolve_job_count(flag: Option<usize>, configured: usize) -> Result<usize> {
    let count = flag.unwrap_or(configured);
    ensure!(count >= 1, "num-jobs must be at least 1, got {count}");
    Ok(count)
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        let base_url = self.url.as_deref().unwrap_or(&config.treeherder.base_url);
        let cache_dir = self.cache_dir.as_ref().unwrap_or(&config.cache.dir);
        let num_jobs = resolve_job_count(self.num_jobs, config.analysis.num_jobs)?;

        let client = TreeherderClient::new(base_url, &config.treeherder.user_agent)?;
        let store = FsLogStore::new(cache_dir);
        let markers = PhaseMarkers::new(self.beg_string.as_str(), self.end_string.as_str());

        let jobs = enumerate_jobs(
            &client,
            &self.repo_name,
            &self.revision,
            config.treeherder.job_fetch_count,
        )
        .await
        .with_context(|| format!("Failed to fetch jobs for {}/{}", self.repo_name, self.revision))?;

        info!("Process logs for {}", self.revision);

        let fetcher = LogFetcher::new(&client, &client, &store, &self.repo_name, &self.revision)
            .with_artifact_name(&config.analysis.artifact_name);
        let pipeline = Pipeline::new(fetcher, &markers);

        let progress = JobProgress::start(num_jobs.min(jobs.len()));
        let timings = pipeline
            .run(&jobs, num_jobs, &progress)
            .await
            .with_context(|| format!("Failed to process logs for {}", self.revision))?;

        match timings.aborted_at {
            Some(job_id) => {
                progress.abandon(job_id);
                warn!("{}", stopped(format!("Stopped processing at job {job_id}")));
            }
            None => progress.finish(timings.timed.len()),
        }

        output::print_report(&timings);

        Ok(())
    }
}
