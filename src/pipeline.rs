use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    clock::batch::{ClockJob, RenderThreading, render_clock_batch},
    clock::face::ClockTime,
    foundation::core::format_index,
    foundation::error::{LapseError, LapseResult},
    index::extract::TimestampExtractor,
    index::indexer::{FrameIndexer, TimestampedFrame},
    raster::align::align,
    raster::materialize::{
        Manifest, MaterializeReport, NormalizeOptions, build_series, dropped_records, materialize,
    },
    raster::spec::RasterSpec,
};

/// Align already-indexed frames and describe the resulting series.
///
/// Pure: nothing is written.
pub fn plan_series(
    frames: &[TimestampedFrame<PathBuf>],
    options: &NormalizeOptions,
) -> LapseResult<Manifest> {
    options.validate()?;
    let alignment = align(frames, &options.raster, options.gap_threshold)?;
    let stats = alignment.stats();
    tracing::info!(
        slots = stats.slots,
        original = stats.original,
        repeated = stats.repeated,
        filler = stats.filler,
        dropped = stats.dropped,
        "aligned"
    );
    Ok(Manifest {
        entries: build_series(frames, &alignment, &options.filler, options.digits),
        dropped: dropped_records(frames, &alignment),
        options: options.clone(),
    })
}

/// Index `roots`, align onto `options.raster` and materialize into `out_dir`.
pub fn normalize<E: TimestampExtractor, P: AsRef<Path>>(
    indexer: &FrameIndexer<E>,
    roots: &[P],
    options: &NormalizeOptions,
    out_dir: &Path,
) -> LapseResult<MaterializeReport> {
    options.validate()?;
    if !options.filler.is_file() {
        return Err(LapseError::validation(format!(
            "filler image '{}' does not exist",
            options.filler.display()
        )));
    }
    let frames = indexer.index(roots)?;
    let manifest = plan_series(&frames, options)?;
    materialize(out_dir, &manifest)
}

/// One clock per slot of `raster`, named `000000.png`, `000001.png`, ...
pub fn clock_series_jobs(
    raster: &RasterSpec,
    utc_offset_secs: i64,
    out_dir: &Path,
    digits: usize,
) -> LapseResult<Vec<ClockJob>> {
    raster.validate()?;
    (0..raster.slot_count())
        .map(|i| {
            Ok(ClockJob {
                time: ClockTime::from_unix(raster.slot_time(i), utc_offset_secs)?,
                out: out_dir.join(format!("{}.png", format_index(i, digits))),
            })
        })
        .collect()
}

/// One clock per photo, named after the photo's base name with `.png`.
///
/// Two photos sharing a base name (`a.jpg`, `a.jpeg`) would render to the same file, so that is
/// rejected up front.
pub fn photo_clock_jobs(
    frames: &[TimestampedFrame<PathBuf>],
    out_dir: &Path,
) -> LapseResult<Vec<ClockJob>> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(frames.len());
    let mut jobs = Vec::with_capacity(frames.len());
    for f in frames {
        let stem = f.source.file_stem().ok_or_else(|| {
            LapseError::validation(format!("photo '{}' has no file name", f.source.display()))
        })?;
        let mut name = stem.to_os_string();
        name.push(".png");
        let out = out_dir.join(name);
        if let Some(first) = claimed.insert(out.clone(), &f.source) {
            return Err(LapseError::validation(format!(
                "photos '{}' and '{}' would both render to '{}'",
                first.display(),
                f.source.display(),
                out.display()
            )));
        }
        jobs.push(ClockJob {
            time: ClockTime::from_unix(f.timestamp, 0)?,
            out,
        });
    }
    Ok(jobs)
}

/// Render a clock for every slot of `raster` into `out_dir`.
#[tracing::instrument(skip(threading))]
pub fn clocks_series(
    raster: &RasterSpec,
    utc_offset_secs: i64,
    out_dir: &Path,
    size: u32,
    threading: &RenderThreading,
) -> LapseResult<u64> {
    let jobs = clock_series_jobs(
        raster,
        utc_offset_secs,
        out_dir,
        NormalizeOptions::DEFAULT_DIGITS,
    )?;
    create_out_dir(out_dir)?;
    render_clock_batch(&jobs, size, threading)
}

/// Render a clock showing each photo's capture time into `out_dir`.
pub fn clocks_from_photos<E: TimestampExtractor, P: AsRef<Path>>(
    indexer: &FrameIndexer<E>,
    roots: &[P],
    out_dir: &Path,
    size: u32,
    threading: &RenderThreading,
) -> LapseResult<u64> {
    let frames = indexer.index(roots)?;
    let jobs = photo_clock_jobs(&frames, out_dir)?;
    create_out_dir(out_dir)?;
    render_clock_batch(&jobs, size, threading)
}

fn create_out_dir(dir: &Path) -> LapseResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
