use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::core::UnixSeconds,
    foundation::error::{LapseError, LapseResult},
    index::extract::{TimestampExtractor, TimestampField},
};

/// A source image paired with its timestamp.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimestampedFrame<S> {
    /// Seconds since the Unix epoch, offset already applied.
    pub timestamp: UnixSeconds,
    /// Opaque handle to the source (a path for indexed photos).
    pub source: S,
}

impl<S> TimestampedFrame<S> {
    pub fn new(timestamp: UnixSeconds, source: S) -> Self {
        Self { timestamp, source }
    }
}

/// Knobs for an indexing run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IndexOptions {
    /// Timestamp field to read.
    pub field: TimestampField,
    /// Seconds added to every extracted timestamp (may be negative).
    pub offset_secs: i64,
    /// Accepted file extensions for directory roots, compared case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            field: TimestampField::default(),
            offset_secs: 0,
            extensions: vec!["jpg".to_string(), "jpeg".to_string()],
        }
    }
}

/// First/last timestamps of an indexed set, used to pick a raster window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct IndexSpan {
    pub frames: usize,
    pub first: UnixSeconds,
    pub last: UnixSeconds,
}

/// Enumerates source images and attaches timestamps to them.
///
/// Output order is traversal order; frames are never sorted or deduplicated here. Ordering
/// problems show up later as dropped frames during alignment.
pub struct FrameIndexer<E> {
    extractor: E,
    options: IndexOptions,
}

impl<E: TimestampExtractor> FrameIndexer<E> {
    pub fn new(extractor: E, options: IndexOptions) -> Self {
        Self { extractor, options }
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Index every image under `roots`.
    ///
    /// Aborts on the first image whose timestamp field is missing.
    #[tracing::instrument(skip(self, roots), fields(field = %self.options.field))]
    pub fn index<P: AsRef<Path>>(
        &self,
        roots: &[P],
    ) -> LapseResult<Vec<TimestampedFrame<PathBuf>>> {
        let sources = enumerate_sources(roots, &self.options.extensions)?;
        let mut out = Vec::with_capacity(sources.len());
        for source in sources {
            let ts = self.extractor.extract(&source, self.options.field)?;
            let timestamp = ts.checked_add(self.options.offset_secs).ok_or_else(|| {
                LapseError::validation(format!(
                    "timestamp of '{}' overflows with offset {}",
                    source.display(),
                    self.options.offset_secs
                ))
            })?;
            tracing::trace!(source = %source.display(), timestamp, "indexed");
            out.push(TimestampedFrame::new(timestamp, source));
        }
        tracing::debug!(frames = out.len(), "index complete");
        Ok(out)
    }

    /// Index `roots` and report the covered time span.
    pub fn probe<P: AsRef<Path>>(&self, roots: &[P]) -> LapseResult<IndexSpan> {
        let frames = self.index(roots)?;
        span_of(&frames)
            .ok_or_else(|| LapseError::validation("no source images found under the given inputs"))
    }
}

/// First and last timestamps in traversal order (not min/max).
pub fn span_of<S>(frames: &[TimestampedFrame<S>]) -> Option<IndexSpan> {
    let first = frames.first()?;
    let last = frames.last()?;
    Some(IndexSpan {
        frames: frames.len(),
        first: first.timestamp,
        last: last.timestamp,
    })
}

/// List source files under `roots` in traversal order.
///
/// File roots are taken as given. Directory roots contribute their regular files with an accepted
/// extension, sorted by file name.
pub fn enumerate_sources<P: AsRef<Path>>(
    roots: &[P],
    extensions: &[String],
) -> LapseResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for root in roots {
        let root = root.as_ref();
        let meta = std::fs::metadata(root)
            .with_context(|| format!("stat input '{}'", root.display()))?;
        if meta.is_file() {
            out.push(root.to_path_buf());
            continue;
        }

        let mut files = Vec::new();
        let entries = std::fs::read_dir(root)
            .with_context(|| format!("read directory '{}'", root.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("read entry in '{}'", root.display()))?;
            let path = entry.path();
            if !entry
                .file_type()
                .with_context(|| format!("stat '{}'", path.display()))?
                .is_file()
            {
                continue;
            }
            if has_accepted_extension(&path, extensions) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        out.extend(files);
    }
    Ok(out)
}

fn has_accepted_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

#[cfg(test)]
#[path = "../../tests/unit/index/indexer.rs"]
mod tests;
