use indexmap::IndexMap;
use log::{debug, error, info, warn};

use crate::error::Result;
use crate::logs::{LogFetcher, LogStore};
use crate::measure::{measure, PhaseMarkers};
use crate::output::JobProgress;
use crate::providers::{JobId, JobOutcome, JobRecord, LogTransport, MetadataService};
use crate::timings::{PhaseTimings, TimingResult, UnmatchedEntry};

/// Number of jobs requested when enumerating a result set.
pub const DEFAULT_JOB_FETCH_COUNT: usize = 6000;

/// Jobs of one revision, in the order the metadata service returned them.
pub type RevisionJobSet = IndexMap<JobId, JobRecord>;

/// Collects the jobs recorded for `revision`.
///
/// Only the first result set is used. A revision without result sets yields
/// an empty job set.
pub async fn enumerate_jobs<M: MetadataService>(
    service: &M,
    repo: &str,
    revision: &str,
    fetch_count: usize,
) -> Result<RevisionJobSet> {
    info!("Fetching Treeherder jobs for {repo}/{revision}");

    let result_sets = service.result_sets(repo, revision).await?;
    let Some(result_set) = result_sets.first() else {
        warn!("No result set found for {repo}/{revision}");
        return Ok(RevisionJobSet::new());
    };

    let jobs = service.jobs(repo, result_set.id, fetch_count).await?;
    info!("Fetched {} jobs for result set {}", jobs.len(), result_set.id);

    Ok(jobs.into_iter().map(|job| (job.id, job)).collect())
}

/// Measures a log phase across the jobs of one revision.
pub struct Pipeline<'a, M, T, S> {
    fetcher: LogFetcher<'a, M, T, S>,
    markers: &'a PhaseMarkers,
}

impl<'a, M, T, S> Pipeline<'a, M, T, S>
where
    M: MetadataService,
    T: LogTransport,
    S: LogStore,
{
    pub fn new(fetcher: LogFetcher<'a, M, T, S>, markers: &'a PhaseMarkers) -> Self {
        Self { fetcher, markers }
    }

    /// Processes at most `max_jobs` jobs of `jobs`, in order.
    ///
    /// Jobs without a log are skipped. A job whose log cannot be measured stops
    /// the run: the timings gathered so far are returned with `aborted_at` set.
    ///
    /// # Errors
    ///
    /// Returns an error on unexpected log encodings, metadata service failures
    /// other than connectivity, and storage failures.
    pub async fn run(
        &self,
        jobs: &RevisionJobSet,
        max_jobs: usize,
        progress: &JobProgress,
    ) -> Result<PhaseTimings> {
        self.fetcher.prepare()?;

        let mut timings = PhaseTimings {
            total_jobs: jobs.len(),
            ..Default::default()
        };

        for (&job_id, job) in jobs.iter().take(max_jobs) {
            timings.attempted += 1;
            progress.job_started(&job.job_type_name);
            debug!("Processing {}({job_id}), result: {}", job.job_type_name, job.result);

            let Some(lines) = self.fetcher.fetch(job).await? else {
                timings.no_artifacts.push(job_id);
                progress.job_finished();
                continue;
            };

            let phase_seconds = match measure(&lines, self.markers) {
                Ok(measured) => measured,
                Err(e) => {
                    error!("Failing job {job_id}: {e}");
                    timings.aborted_at = Some(job_id);
                    break;
                }
            };

            match phase_seconds {
                None => {
                    info!("Nothing to measure for {job_id}:{}", job.job_type_name);
                    timings.unmatched.push(UnmatchedEntry {
                        job_id,
                        job_type_name: job.job_type_name.clone(),
                    });
                }
                // Automatically retried jobs don't have a meaningful total time
                Some(_) if job.result == JobOutcome::Retry => timings.retried.push(job_id),
                Some(phase_seconds) => {
                    let timing = TimingResult::new(
                        job_id,
                        &job.job_type_name,
                        phase_seconds,
                        job.total_seconds(),
                    );
                    info!("Timed {timing}");
                    timings.timed.push(timing);
                }
            }

            progress.job_finished();
        }

        Ok(timings)
    }
}
