//! lapse turns irregularly-timestamped photographs into a uniformly-spaced timelapse series and
//! renders analog-clock overlays for it.
//!
//! # Pipeline overview
//!
//! 1. **Index**: `roots + field -> [TimestampedFrame]` in traversal order ([`FrameIndexer`])
//! 2. **Align**: `[TimestampedFrame] + RasterSpec -> Alignment` (one assignment per slot, plus
//!    dropped-frame warnings) ([`align`])
//! 3. **Materialize**: `Alignment -> files` as symlinks, copies or a JSON manifest
//!    ([`materialize`])
//!
//! Independently, a wall-clock time becomes a vector [`ClockScene`] ([`render_clock`]) which a
//! [`SceneEmitter`] turns into SVG text or a PNG raster.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure core**: alignment and clock geometry do no I/O and hold no state.
//! - **Deterministic**: output depends only on inputs; directory traversal is name-sorted.
#![forbid(unsafe_code)]

mod clock;
mod foundation;
mod index;
mod pipeline;
mod raster;

pub use clock::batch::{ClockJob, RenderThreading, render_clock_batch};
pub use clock::emit::{ClockImage, PngEmitter, SceneEmitter, SvgEmitter};
pub use clock::face::{ClockFace, ClockTime, Tick};
pub use clock::scene::{
    ClockScene, MAX_CLOCK_SIZE, Stroke, layout as layout_clock, render as render_clock,
};
pub use foundation::core::{
    Line, Point, UnixSeconds, Vec2, format_index, unix_to_wall_clock, wall_clock_to_unix,
};
pub use foundation::error::{LapseError, LapseResult};
pub use index::extract::{
    MetadataExtractor, TimestampExtractor, TimestampField, parse_exif_datetime,
};
pub use index::indexer::{
    FrameIndexer, IndexOptions, IndexSpan, TimestampedFrame, enumerate_sources, span_of,
};
pub use index::number::{Rename, apply_numbering, plan_numbering};
pub use pipeline::{
    clock_series_jobs, clocks_from_photos, clocks_series, normalize, photo_clock_jobs,
    plan_series,
};
pub use raster::align::{
    AlignStats, Alignment, DropReason, DroppedFrame, SlotAssignment, TimeSlot, align,
};
pub use raster::materialize::{
    DroppedRecord, MANIFEST_FILE_NAME, Manifest, MaterializeMode, MaterializeReport,
    NormalizeOptions, SeriesEntry, SlotKind, build_series, dropped_records, materialize,
    output_file_name, read_manifest, write_manifest,
};
pub use raster::spec::RasterSpec;
