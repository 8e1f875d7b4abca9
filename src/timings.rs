use std::fmt;

use crate::providers::JobId;

/// Phase timing of one successfully measured job.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingResult {
    /// Phase share of the job's total time, e.g. "20.0 %"
    pub percentage: String,
    pub phase_seconds: i64,
    pub total_seconds: i64,
    pub job_type_name: String,
    pub job_id: JobId,
}

impl TimingResult {
    pub fn new(job_id: JobId, job_type_name: &str, phase_seconds: i64, total_seconds: i64) -> Self {
        Self {
            percentage: format_percentage(ratio_percentage(phase_seconds, total_seconds)),
            phase_seconds,
            total_seconds,
            job_type_name: job_type_name.to_string(),
            job_id,
        }
    }
}

impl fmt::Display for TimingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "('{}', {}, {}, '{}', {})",
            self.percentage, self.phase_seconds, self.total_seconds, self.job_type_name, self.job_id
        )
    }
}

/// A job whose log did not contain both phase markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedEntry {
    pub job_id: JobId,
    pub job_type_name: String,
}

/// Everything accumulated while processing the jobs of one revision.
#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    /// Size of the revision's job set before bounding
    pub total_jobs: usize,
    /// Jobs picked up for processing, at most the configured maximum
    pub attempted: usize,
    pub timed: Vec<TimingResult>,
    pub unmatched: Vec<UnmatchedEntry>,
    /// Jobs skipped because no log could be resolved
    pub no_artifacts: Vec<JobId>,
    /// Measured jobs discarded because they were automatically retried
    pub retried: Vec<JobId>,
    /// Job whose measurement failed and stopped the run
    pub aborted_at: Option<JobId>,
}

impl PhaseTimings {
    pub fn phase_seconds(&self) -> i64 {
        self.timed.iter().map(|t| t.phase_seconds).sum()
    }

    pub fn total_seconds(&self) -> i64 {
        self.timed.iter().map(|t| t.total_seconds).sum()
    }

    /// Phase share across all timed jobs, formatted like the per-job percentages.
    pub fn overall_percentage(&self) -> String {
        format_percentage(ratio_percentage(self.phase_seconds(), self.total_seconds()))
    }
}

/// `part / whole` rounded to two decimals, then scaled to a percentage.
///
/// Rounding happens on the 0-1 fraction, so 0.29 becomes 28.999999999999996
/// before formatting. Returns `None` when `whole` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn ratio_percentage(part: i64, whole: i64) -> Option<f64> {
    if whole == 0 {
        return None;
    }

    let fraction = part as f64 / whole as f64;
    Some(round_two_decimals(fraction) * 100.0)
}

/// Rounds to the nearest hundredth, halves away from zero.
///
/// Halfway cases are judged on the exact binary value, so 0.125 rounds up to
/// 0.13 while 0.285 (stored as 0.28499999...) rounds down to 0.28.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn round_two_decimals(value: f64) -> f64 {
    let scaled = (value * 100.0).abs();
    if !scaled.is_finite() || scaled >= 2f64.powi(53) {
        return value;
    }

    // May be one below the true floor; the exact halfway test below absorbs that.
    let hundredths = scaled.trunc() as u128;
    let halfway = 2 * hundredths + 1;

    let bits = value.abs().to_bits();
    let biased_exponent = ((bits >> 52) & 0x7ff) as i32;
    let fraction_bits = u128::from(bits & ((1 << 52) - 1));
    let (mantissa, exponent) = if biased_exponent == 0 {
        (fraction_bits, -1074)
    } else {
        (fraction_bits | (1 << 52), biased_exponent - 1075)
    };

    // |value| * 200 >= 2 * hundredths + 1, with |value| = mantissa * 2^exponent
    let round_up = if exponent >= 0 {
        (mantissa * 200) << exponent >= halfway
    } else {
        let shift = exponent.unsigned_abs();
        shift < 64 && mantissa * 200 >= halfway << shift
    };

    let rounded = (hundredths + u128::from(round_up)) as f64 / 100.0;
    rounded.copysign(value)
}

/// Renders a percentage as "<value> %".
///
/// Values keep 12 significant digits and always show a fractional part or an
/// exponent, so 28.999999999999996 renders as "29.0 %".
pub fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(value) => format!("{} %", short_float(value)),
        None => "n/a".to_string(),
    }
}

fn short_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return format!("{value:.1}");
    }

    let scientific = format!("{value:.11e}");
    let Some((mantissa, exponent)) = scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)))
    else {
        return value.to_string();
    };

    if (-4..12).contains(&exponent) {
        let decimals = (11 - exponent).unsigned_abs() as usize;
        let fixed = format!("{value:.decimals$}");
        if fixed.contains('.') {
            let trimmed = fixed.trim_end_matches('0');
            if let Some(whole) = trimmed.strip_suffix('.') {
                return format!("{whole}.0");
            }
            return trimmed.to_string();
        }
        format!("{fixed}.0")
    } else {
        let mantissa = if mantissa.contains('.') {
            mantissa.trim_end_matches('0').trim_end_matches('.')
        } else {
            mantissa
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_rounds_fraction_before_scaling() {
        assert_eq!(ratio_percentage(20, 100), Some(20.0));
        assert_eq!(ratio_percentage(1, 3), Some(33.0));
        assert_eq!(ratio_percentage(5, 7), Some(71.0));
        assert_eq!(ratio_percentage(29, 100), Some(0.29 * 100.0));
    }

    #[test]
    fn test_ratio_halves_round_away_from_zero() {
        // 0.125 and 0.625 are exact; 0.025 is stored slightly above the half
        assert_eq!(ratio_percentage(1, 8), Some(13.0));
        assert_eq!(ratio_percentage(5, 8), Some(63.0));
        assert_eq!(ratio_percentage(1, 40), Some(3.0));
        assert_eq!(ratio_percentage(-1, 8), Some(-13.0));
    }

    #[test]
    fn test_ratio_below_half_rounds_down() {
        // 0.285 is stored as 0.28499999999999998
        assert_eq!(ratio_percentage(285, 1000), Some(0.28 * 100.0));
    }

    #[test]
    fn test_timing_percentages_for_common_ratios() {
        let percentages: Vec<String> = [(1, 40), (1, 8), (5, 8), (29, 100), (7, 100)]
            .iter()
            .map(|&(phase, total)| TimingResult::new(1, "job", phase, total).percentage)
            .collect();

        assert_eq!(percentages, ["3.0 %", "13.0 %", "63.0 %", "29.0 %", "7.0 %"]);
    }

    #[test]
    fn test_ratio_of_zero_total_is_undefined() {
        assert_eq!(ratio_percentage(10, 0), None);
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(20.0)), "20.0 %");
        assert_eq!(format_percentage(Some(0.0)), "0.0 %");
        assert_eq!(format_percentage(Some(28.999_999_999_999_996)), "29.0 %");
        assert_eq!(format_percentage(Some(7.000_000_000_000_001)), "7.0 %");
        assert_eq!(format_percentage(Some(12.5)), "12.5 %");
        assert_eq!(format_percentage(Some(-13.0)), "-13.0 %");
        assert_eq!(format_percentage(Some(123_456_789_012.0)), "123456789012.0 %");
        assert_eq!(format_percentage(Some(1e17)), "1e+17 %");
        assert_eq!(format_percentage(Some(0.000_012_5)), "1.25e-05 %");
        assert_eq!(format_percentage(None), "n/a");
    }

    #[test]
    fn test_timing_result_display() {
        let timing = TimingResult::new(7, "build-linux64/opt", 20, 100);

        assert_eq!(timing.percentage, "20.0 %");
        assert_eq!(timing.to_string(), "('20.0 %', 20, 100, 'build-linux64/opt', 7)");
    }

    #[test]
    fn test_aggregate_sums_timed_jobs() {
        let timings = PhaseTimings {
            timed: vec![
                TimingResult::new(1, "a", 10, 100),
                TimingResult::new(2, "b", 30, 100),
            ],
            ..Default::default()
        };

        assert_eq!(timings.phase_seconds(), 40);
        assert_eq!(timings.total_seconds(), 200);
        assert_eq!(timings.overall_percentage(), "20.0 %");
    }

    #[test]
    fn test_aggregate_without_timed_jobs() {
        assert_eq!(PhaseTimings::default().overall_percentage(), "n/a");
    }
}
