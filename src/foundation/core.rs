use chrono::{DateTime, NaiveDateTime};

use crate::foundation::error::{LapseError, LapseResult};

pub use kurbo::{Line, Point, Vec2};

/// Seconds since the Unix epoch.
///
/// Camera metadata carries no zone, so wall-clock readings are mapped to epoch seconds as if
/// they were UTC. [`unix_to_wall_clock`] inverts the mapping exactly.
pub type UnixSeconds = i64;

pub fn wall_clock_to_unix(dt: NaiveDateTime) -> UnixSeconds {
    dt.and_utc().timestamp()
}

/// Convert epoch seconds into a wall-clock reading, shifted by `utc_offset_secs`.
pub fn unix_to_wall_clock(ts: UnixSeconds, utc_offset_secs: i64) -> LapseResult<NaiveDateTime> {
    let shifted = ts.checked_add(utc_offset_secs).ok_or_else(|| {
        LapseError::validation(format!(
            "timestamp {ts} with offset {utc_offset_secs} overflows"
        ))
    })?;
    DateTime::from_timestamp(shifted, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| LapseError::validation(format!("timestamp {shifted} is out of range")))
}

/// Zero-padded decimal index, e.g. `format_index(42, 6) == "000042"`.
pub fn format_index(index: u64, digits: usize) -> String {
    format!("{index:0digits$}")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
