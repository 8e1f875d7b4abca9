use std::str::FromStr;

use chrono::TimeDelta;

use crate::error::{PhaseLensError, Result};

/// Offset of a log timestamp (`HH:MM:SS`) from a synthetic zero point.
///
/// Components are taken as literal magnitudes: hours may exceed 24 and there is
/// no wrap-around at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeSpan(TimeDelta);

impl TimeSpan {
    pub fn as_delta(&self) -> TimeDelta {
        self.0
    }
}

impl FromStr for TimeSpan {
    type Err = PhaseLensError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = |reason: &str| PhaseLensError::InvalidTimestamp {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = value.split(':').collect();
        let [hours, minutes, seconds] = parts.as_slice() else {
            return Err(invalid("expected exactly three ':'-separated parts"));
        };

        let component = |part: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|e| invalid(&format!("component '{part}' is not an integer: {e}")))
        };

        let delta = TimeDelta::try_hours(component(*hours)?)
            .zip(TimeDelta::try_minutes(component(*minutes)?))
            .zip(TimeDelta::try_seconds(component(*seconds)?))
            .and_then(|((h, m), s)| h.checked_add(&m)?.checked_add(&s))
            .ok_or_else(|| invalid("value out of range"))?;

        Ok(Self(delta))
    }
}

/// Whole seconds elapsed from `beginning` to `end`, both formatted as `HH:MM:SS`.
///
/// The result is negative when `end` precedes `beginning`.
pub fn time_difference(beginning: &str, end: &str) -> Result<i64> {
    let from: TimeSpan = beginning.parse()?;
    let to: TimeSpan = end.parse()?;
    to.as_delta()
        .checked_sub(&from.as_delta())
        .map(|delta| delta.num_seconds())
        .ok_or_else(|| PhaseLensError::InvalidTimestamp {
            value: format!("{beginning} -> {end}"),
            reason: "difference out of range".to_string(),
        })
}
