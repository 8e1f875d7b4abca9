mod progress;
mod report;
mod styling;

pub use progress::JobProgress;
pub use report::print_report;
pub use styling::stopped;
use styling::{muted, title};

/// Prints the name and version on stderr, keeping stdout for the report.
pub fn print_banner() {
    eprintln!(
        "\n{} {}\n  {}\n",
        title("⏱️ PhaseLens"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Phase share of CI job time, measured from job logs")
    );
}
