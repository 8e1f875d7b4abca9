use std::fmt::Write;

use crate::timings::PhaseTimings;

/// Prints the per-job timings followed by the run totals to stdout.
///
/// The format is meant for humans, e.g.:
///
/// ```text
/// ('20.0 %', 20, 100, 'build-linux64/opt', 7)
/// Number of jobs - initially: 3
/// Number of jobs - attempted: 3
/// Number of jobs - timed: 1
/// Number of jobs - unmatched: 0
/// Number of jobs - no artifacts: 1
/// Number of jobs - retried: 1
/// ('20.0 %', 20, 100)
/// ```
pub fn print_report(timings: &PhaseTimings) {
    print!("{}", render_report(timings));
}

fn render_report(timings: &PhaseTimings) -> String {
    let mut output = String::new();

    for timing in &timings.timed {
        let _ = writeln!(output, "{timing}");
    }

    for entry in &timings.unmatched {
        let _ = writeln!(
            output,
            "Nothing to measure for {}:{}",
            entry.job_id, entry.job_type_name
        );
    }

    let counts = [
        ("initially", timings.total_jobs),
        ("attempted", timings.attempted),
        ("timed", timings.timed.len()),
        ("unmatched", timings.unmatched.len()),
        ("no artifacts", timings.no_artifacts.len()),
        ("retried", timings.retried.len()),
    ];
    for (label, count) in counts {
        let _ = writeln!(output, "Number of jobs - {label}: {count}");
    }

    if let Some(job_id) = timings.aborted_at {
        let _ = writeln!(output, "Stopped early: could not measure job {job_id}");
    }

    let _ = writeln!(
        output,
        "('{}', {}, {})",
        timings.overall_percentage(),
        timings.phase_seconds(),
        timings.total_seconds()
    );

    output
}
