use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::core::format_index,
    foundation::error::{LapseError, LapseResult},
    index::indexer::TimestampedFrame,
};

/// A single planned rename.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Plan renaming `frames` to consecutive numbers in timestamp order.
///
/// The sort is stable, so photos sharing a timestamp keep their traversal order. Each target
/// lives next to its source: `<dir>/<start_index + i, zero-padded><.ext lower-cased>`.
pub fn plan_numbering(
    frames: &[TimestampedFrame<PathBuf>],
    start_index: u64,
    digits: usize,
) -> LapseResult<Vec<Rename>> {
    if digits == 0 {
        return Err(LapseError::validation("index digits must be > 0"));
    }

    let mut order: Vec<&TimestampedFrame<PathBuf>> = frames.iter().collect();
    order.sort_by_key(|f| f.timestamp);

    let mut plan = Vec::with_capacity(order.len());
    for (i, frame) in order.into_iter().enumerate() {
        let index = start_index.checked_add(i as u64).ok_or_else(|| {
            LapseError::validation("numbering start index overflows")
        })?;
        let mut name = format_index(index, digits);
        if let Some(ext) = frame.source.extension().and_then(|e| e.to_str()) {
            name.push('.');
            name.push_str(&ext.to_ascii_lowercase());
        }
        plan.push(Rename {
            from: frame.source.clone(),
            to: frame.source.with_file_name(name),
        });
    }

    let sources: HashSet<&Path> = plan.iter().map(|r| r.from.as_path()).collect();
    let mut targets = HashSet::new();
    for r in &plan {
        if !targets.insert(r.to.as_path()) {
            return Err(LapseError::validation(format!(
                "two photos would be renamed to '{}'",
                r.to.display()
            )));
        }
        if !sources.contains(r.to.as_path()) && r.to.exists() {
            return Err(LapseError::validation(format!(
                "rename target '{}' already exists and is not one of the photos",
                r.to.display()
            )));
        }
    }

    Ok(plan)
}

/// Execute a numbering plan.
///
/// Sources are first moved to temporary names so that a photo already carrying another photo's
/// target name cannot be clobbered mid-way. If any rename fails, the renames already done are
/// undone in reverse order before the error is returned.
#[tracing::instrument(skip(plan), fields(renames = plan.len()))]
pub fn apply_numbering(plan: &[Rename]) -> LapseResult<()> {
    let staging: Vec<PathBuf> = plan
        .iter()
        .enumerate()
        .map(|(i, r)| r.from.with_file_name(format!(".lapse-number-{i}.tmp")))
        .collect();
    if let Some(taken) = staging.iter().find(|tmp| tmp.symlink_metadata().is_ok()) {
        return Err(LapseError::validation(format!(
            "staging name '{}' is already taken",
            taken.display()
        )));
    }

    let mut done = Vec::with_capacity(plan.len() * 2);
    let result = run_renames(plan, &staging, &mut done);

    if let Err(err) = result {
        for (from, to) in done.into_iter().rev() {
            if let Err(undo) = std::fs::rename(to, from) {
                tracing::error!(
                    path = %to.display(),
                    restore = %from.display(),
                    error = %undo,
                    "could not undo rename"
                );
            }
        }
        return Err(err.into());
    }
    Ok(())
}

/// Stage every source, then move each into place, recording completed `(from, to)` moves.
fn run_renames<'a>(
    plan: &'a [Rename],
    staging: &'a [PathBuf],
    done: &mut Vec<(&'a Path, &'a Path)>,
) -> anyhow::Result<()> {
    for (r, tmp) in plan.iter().zip(staging) {
        std::fs::rename(&r.from, tmp).with_context(|| format!("stage '{}'", r.from.display()))?;
        done.push((r.from.as_path(), tmp.as_path()));
    }
    for (r, tmp) in plan.iter().zip(staging) {
        std::fs::rename(tmp, &r.to).with_context(|| format!("rename into '{}'", r.to.display()))?;
        done.push((tmp.as_path(), r.to.as_path()));
        tracing::debug!(to = %r.to.display(), "renamed");
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/index/number.rs"]
mod tests;
