use crate::{
    foundation::core::UnixSeconds,
    foundation::error::LapseResult,
    index::indexer::TimestampedFrame,
    raster::spec::RasterSpec,
};

/// What fills one output slot. Frames are referenced by position in the aligned input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "frame", rename_all = "snake_case")]
pub enum SlotAssignment {
    /// The frame whose timestamp falls into this slot.
    Original(usize),
    /// An earlier frame held over a short gap.
    Repeated(usize),
    /// The filler placeholder.
    Filler,
}

impl SlotAssignment {
    pub fn frame(self) -> Option<usize> {
        match self {
            Self::Original(i) | Self::Repeated(i) => Some(i),
            Self::Filler => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeSlot {
    pub index: u64,
    pub assignment: SlotAssignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Timestamp precedes the raster window.
    BeforeWindow,
    /// Slot was already filled or passed (duplicate or out-of-order timestamp).
    SlotPassed,
    /// Timestamp lies past the last slot.
    AfterWindow,
}

/// Non-fatal warning for a frame that was not placed on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DroppedFrame {
    /// Position of the frame in the aligned input.
    pub frame: usize,
    pub timestamp: UnixSeconds,
    /// Slot the timestamp maps to.
    pub slot: i64,
    /// Slot the aligner was waiting for at that point.
    pub expected: u64,
    pub reason: DropReason,
}

/// Counters over an [`Alignment`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AlignStats {
    pub slots: u64,
    pub original: u64,
    pub repeated: u64,
    pub filler: u64,
    pub dropped: u64,
}

/// Result of mapping frames onto a raster.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Alignment {
    /// One entry per slot, ordered by index.
    pub slots: Vec<TimeSlot>,
    pub dropped: Vec<DroppedFrame>,
}

impl Alignment {
    pub fn stats(&self) -> AlignStats {
        let mut stats = AlignStats {
            slots: self.slots.len() as u64,
            dropped: self.dropped.len() as u64,
            ..AlignStats::default()
        };
        for slot in &self.slots {
            match slot.assignment {
                SlotAssignment::Original(_) => stats.original += 1,
                SlotAssignment::Repeated(_) => stats.repeated += 1,
                SlotAssignment::Filler => stats.filler += 1,
            }
        }
        stats
    }

    /// Resolve every slot to the source it shows.
    ///
    /// `frames` must be the sequence this alignment was computed from.
    pub fn resolve<'a, S>(
        &'a self,
        frames: &'a [TimestampedFrame<S>],
        filler: &'a S,
    ) -> impl Iterator<Item = (&'a TimeSlot, &'a S)> + 'a {
        self.slots.iter().map(move |slot| {
            let source = slot
                .assignment
                .frame()
                .and_then(|i| frames.get(i))
                .map_or(filler, |f| &f.source);
            (slot, source)
        })
    }
}

/// Map `frames` (in traversal order) onto the slots of the raster `spec` describes.
///
/// Single forward pass. The first frame landing in a slot wins; later frames for a filled or
/// passed slot are dropped. Interior gaps shorter than `gap_threshold` slots repeat the last
/// placed frame, longer ones get filler. Slots after the last placed frame are always filler.
#[tracing::instrument(skip(frames), fields(frame_count = frames.len()))]
pub fn align<S>(
    frames: &[TimestampedFrame<S>],
    spec: &RasterSpec,
    gap_threshold: u64,
) -> LapseResult<Alignment> {
    spec.validate()?;
    let n = spec.slot_count();

    let mut slots = Vec::with_capacity(n.min(1 << 20) as usize);
    let mut dropped = Vec::new();
    let mut next: u64 = 0;
    let mut last_assigned: Option<usize> = None;

    for (pos, frame) in frames.iter().enumerate() {
        let slot = spec.slot_of(frame.timestamp);

        let reason = if slot < 0 {
            Some(DropReason::BeforeWindow)
        } else if (slot as u64) < next {
            Some(DropReason::SlotPassed)
        } else if (slot as u64) >= n {
            Some(DropReason::AfterWindow)
        } else {
            None
        };
        if let Some(reason) = reason {
            tracing::warn!(
                frame = pos,
                timestamp = frame.timestamp,
                slot,
                expected = next,
                ?reason,
                "dropping frame"
            );
            dropped.push(DroppedFrame {
                frame: pos,
                timestamp: frame.timestamp,
                slot,
                expected: next,
                reason,
            });
            continue;
        }

        let slot = slot as u64;
        if slot > next {
            let gap = slot - next;
            let held = match last_assigned {
                Some(prev) if gap < gap_threshold => SlotAssignment::Repeated(prev),
                _ => SlotAssignment::Filler,
            };
            tracing::debug!(from = next, to = slot - 1, ?held, "filling gap");
            fill(&mut slots, next, slot, held);
        }
        fill(&mut slots, slot, slot + 1, SlotAssignment::Original(pos));
        last_assigned = Some(pos);
        next = slot + 1;
    }

    if next < n {
        fill(&mut slots, next, n, SlotAssignment::Filler);
    }

    Ok(Alignment { slots, dropped })
}

fn fill(slots: &mut Vec<TimeSlot>, from: u64, to: u64, assignment: SlotAssignment) {
    slots.extend((from..to).map(|index| TimeSlot { index, assignment }));
}

#[cfg(test)]
#[path = "../../tests/unit/raster/align.rs"]
mod tests;
