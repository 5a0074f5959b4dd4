use chrono::{NaiveTime, Timelike};

use crate::foundation::{
    core::{UnixSeconds, unix_to_wall_clock},
    error::{LapseError, LapseResult},
};

/// Wall-clock time of day shown on a clock face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8, second: u8) -> LapseResult<Self> {
        if hour > 23 {
            return Err(LapseError::validation("clock hour must be in 0..=23"));
        }
        if minute > 59 {
            return Err(LapseError::validation("clock minute must be in 0..=59"));
        }
        if second > 59 {
            return Err(LapseError::validation("clock second must be in 0..=59"));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Time of day of `ts`, read `utc_offset_secs` away from UTC.
    pub fn from_unix(ts: UnixSeconds, utc_offset_secs: i64) -> LapseResult<Self> {
        Ok(Self::from(unix_to_wall_clock(ts, utc_offset_secs)?.time()))
    }

    /// Parse `HH:MM` or `HH:MM:SS`.
    pub fn parse(s: &str) -> LapseResult<Self> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .map(Self::from)
            .map_err(|_| LapseError::validation(format!("invalid clock time '{s}' (HH:MM[:SS])")))
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn second(self) -> u8 {
        self.second
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(t: NaiveTime) -> Self {
        // chrono keeps leap seconds in the nanosecond field, so these are always in range
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
            second: t.second() as u8,
        }
    }
}

/// One dial mark.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tick {
    /// Degrees, counter-clockwise from due east.
    pub angle_deg: f64,
    /// Quarter-hour marks (12, 3, 6, 9) are major.
    pub major: bool,
}

/// Hand angles and dial marks for a time of day, independent of output size.
///
/// Angles follow the mathematical convention: 0° points at "3", 90° at "12". The hour hand uses
/// the hour as-is, so 03:00 puts it at 0°.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClockFace {
    pub hour_angle_deg: f64,
    pub minute_angle_deg: f64,
    pub ticks: Vec<Tick>,
}

impl ClockFace {
    pub const TICK_STEP_DEG: u32 = 30;

    pub fn at(time: ClockTime) -> Self {
        let h = f64::from(time.hour);
        let m = f64::from(time.minute);
        let s = f64::from(time.second);

        Self {
            hour_angle_deg: 90.0 - (30.0 * h + m / 2.0 + s / 120.0),
            minute_angle_deg: 90.0 - (6.0 * m + s / 10.0),
            ticks: dial_ticks(),
        }
    }
}

fn dial_ticks() -> Vec<Tick> {
    (0..360)
        .step_by(ClockFace::TICK_STEP_DEG as usize)
        .map(|a: u32| Tick {
            angle_deg: f64::from(a),
            major: a % 90 == 0,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/clock/face.rs"]
mod tests;
