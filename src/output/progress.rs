use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{completed, in_progress, section_heading, stopped};

/// Progress over the jobs of a run, drawn on stderr.
pub struct JobProgress {
    pb: ProgressBar,
}

impl JobProgress {
    pub fn start(job_count: usize) -> Self {
        eprintln!("⚙️  {}", section_heading("Jobs"));

        let pb = ProgressBar::new(job_count as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {msg} [{bar:30}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        pb.set_message(in_progress("Measuring").to_string());

        Self { pb }
    }

    /// A progress tracker that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn job_started(&self, job_type_name: &str) {
        self.pb
            .set_message(in_progress(format!("Measuring {job_type_name}")).to_string());
    }

    pub fn job_finished(&self) {
        self.pb.inc(1);
    }

    pub fn finish(&self, timed: usize) {
        self.pb
            .finish_with_message(completed(format!("Timed {timed} jobs ✓")).to_string());
        eprintln!();
    }

    pub fn abandon(&self, job_id: u64) {
        self.pb
            .abandon_with_message(stopped(format!("Stopped at job {job_id} ✗")).to_string());
        eprintln!();
    }
}
