use std::path::PathBuf;

use rayon::prelude::*;

use crate::{
    clock::emit::{PngEmitter, SceneEmitter},
    clock::face::ClockTime,
    clock::scene::{render, validate_size},
    foundation::error::{LapseError, LapseResult},
};

/// One clock image to produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockJob {
    pub time: ClockTime,
    pub out: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Threading controls for batch rendering.
pub struct RenderThreading {
    /// Render on a dedicated rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

/// Render and write every job as a `size`×`size` PNG. Returns the number of images written.
///
/// Jobs are independent; in parallel mode they fan out over a pool built for this call.
#[tracing::instrument(skip(jobs), fields(job_count = jobs.len()))]
pub fn render_clock_batch(
    jobs: &[ClockJob],
    size: u32,
    threading: &RenderThreading,
) -> LapseResult<u64> {
    validate_size(size)?;

    if !threading.parallel {
        for job in jobs {
            render_job(job, size)?;
        }
    } else {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| jobs.par_iter().try_for_each(|job| render_job(job, size)))?;
    }

    tracing::info!(written = jobs.len(), size, "clock images rendered");
    Ok(jobs.len() as u64)
}

fn render_job(job: &ClockJob, size: u32) -> LapseResult<()> {
    let scene = render(job.time, size)?;
    PngEmitter.emit(&scene)?.save_png(&job.out)?;
    tracing::debug!(out = %job.out.display(), time = ?job.time, "clock written");
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> LapseResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LapseError::validation(
            "clock rendering 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LapseError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/clock/batch.rs"]
mod tests;
