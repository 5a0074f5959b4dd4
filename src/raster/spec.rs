use crate::foundation::{
    core::UnixSeconds,
    error::{LapseError, LapseResult},
};

/// Fixed-interval output timeline: slot `i` covers `[start + i*interval, start + (i+1)*interval)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RasterSpec {
    pub start: UnixSeconds,
    pub end: UnixSeconds, // inclusive; the slot containing `end` is the last one
    pub interval: i64,    // must be > 0
}

impl RasterSpec {
    pub fn new(start: UnixSeconds, end: UnixSeconds, interval: i64) -> LapseResult<Self> {
        let spec = Self {
            start,
            end,
            interval,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> LapseResult<()> {
        if self.interval <= 0 {
            return Err(LapseError::validation("raster interval must be > 0"));
        }
        if self.start > self.end {
            return Err(LapseError::validation("raster start must be <= end"));
        }
        if self.checked_slot_count().is_none() {
            return Err(LapseError::validation(format!(
                "raster [{}, {}] every {}s has more slots than can be addressed",
                self.start, self.end, self.interval
            )));
        }
        Ok(())
    }

    /// `floor((end - start) / interval) + 1`.
    ///
    /// Saturates at `u64::MAX` for specs that bypassed [`RasterSpec::validate`].
    pub fn slot_count(&self) -> u64 {
        self.checked_slot_count().unwrap_or(u64::MAX)
    }

    /// Slot count if it fits both `u64` and `usize`.
    fn checked_slot_count(&self) -> Option<u64> {
        let span = i128::from(self.end) - i128::from(self.start);
        let n = span.checked_div(i128::from(self.interval))? + 1;
        let n = u64::try_from(n).ok()?;
        usize::try_from(n).ok()?;
        Some(n)
    }

    /// Slot a timestamp falls into, floored; negative before `start`.
    pub fn slot_of(&self, ts: UnixSeconds) -> i64 {
        let rel = i128::from(ts) - i128::from(self.start);
        let slot = rel.div_euclid(i128::from(self.interval));
        slot.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }

    /// Start time of slot `index`.
    pub fn slot_time(&self, index: u64) -> UnixSeconds {
        let t = i128::from(self.start) + i128::from(index) * i128::from(self.interval);
        t.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/spec.rs"]
mod tests;
