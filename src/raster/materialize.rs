use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context as _;

use crate::{
    foundation::core::format_index,
    foundation::error::{LapseError, LapseResult},
    index::indexer::TimestampedFrame,
    raster::align::{AlignStats, Alignment, DropReason, SlotAssignment},
    raster::spec::RasterSpec,
};

/// File name of the manifest written in [`MaterializeMode::Manifest`] mode, in place of the series.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// How the output series lands on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializeMode {
    /// One symbolic link per slot pointing at the source image.
    Symlink,
    /// One full copy per slot.
    Copy,
    /// No image files; only `manifest.json`.
    Manifest,
}

impl Default for MaterializeMode {
    fn default() -> Self {
        if cfg!(any(unix, windows)) {
            Self::Symlink
        } else {
            Self::Copy
        }
    }
}

impl MaterializeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symlink => "symlink",
            Self::Copy => "copy",
            Self::Manifest => "manifest",
        }
    }
}

impl fmt::Display for MaterializeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterializeMode {
    type Err = LapseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symlink" | "link" => Ok(Self::Symlink),
            "copy" => Ok(Self::Copy),
            "manifest" => Ok(Self::Manifest),
            other => Err(LapseError::validation(format!(
                "unknown materialize mode '{other}' (expected symlink, copy or manifest)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Original,
    Repeated,
    Filler,
}

impl From<SlotAssignment> for SlotKind {
    fn from(a: SlotAssignment) -> Self {
        match a {
            SlotAssignment::Original(_) => Self::Original,
            SlotAssignment::Repeated(_) => Self::Repeated,
            SlotAssignment::Filler => Self::Filler,
        }
    }
}

/// One record of the output time series.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SeriesEntry {
    pub index: u64,
    pub kind: SlotKind,
    pub source: PathBuf,
    /// Output name: zero-padded index plus the source's lower-cased extension.
    pub file_name: String,
}

/// A dropped frame with its source path, as recorded in the manifest.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DroppedRecord {
    pub source: PathBuf,
    pub timestamp: i64,
    pub slot: i64,
    pub expected: u64,
    pub reason: DropReason,
}

/// Parameters of a normalize run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NormalizeOptions {
    pub raster: RasterSpec,
    /// Interior gaps shorter than this many slots repeat the previous frame.
    pub gap_threshold: u64,
    /// Placeholder image for uncovered slots.
    pub filler: PathBuf,
    pub mode: MaterializeMode,
    /// Width of the zero-padded output index.
    pub digits: usize,
}

impl NormalizeOptions {
    pub const DEFAULT_GAP_THRESHOLD: u64 = 8;
    pub const DEFAULT_DIGITS: usize = 6;

    pub fn new(raster: RasterSpec, filler: impl Into<PathBuf>) -> Self {
        Self {
            raster,
            gap_threshold: Self::DEFAULT_GAP_THRESHOLD,
            filler: filler.into(),
            mode: MaterializeMode::default(),
            digits: Self::DEFAULT_DIGITS,
        }
    }

    pub fn validate(&self) -> LapseResult<()> {
        self.raster.validate()?;
        if self.digits == 0 {
            return Err(LapseError::validation("index digits must be > 0"));
        }
        if self.filler.as_os_str().is_empty() {
            return Err(LapseError::validation("filler path must be non-empty"));
        }
        Ok(())
    }
}

/// Everything a normalize run decided, serialized as `manifest.json`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    pub options: NormalizeOptions,
    pub entries: Vec<SeriesEntry>,
    pub dropped: Vec<DroppedRecord>,
}

impl Manifest {
    pub fn stats(&self) -> AlignStats {
        let mut stats = AlignStats {
            slots: self.entries.len() as u64,
            dropped: self.dropped.len() as u64,
            ..AlignStats::default()
        };
        for entry in &self.entries {
            match entry.kind {
                SlotKind::Original => stats.original += 1,
                SlotKind::Repeated => stats.repeated += 1,
                SlotKind::Filler => stats.filler += 1,
            }
        }
        stats
    }
}

/// `000042.jpg` for index 42 and a `.JPG` source.
pub fn output_file_name(index: u64, source: &Path, digits: usize) -> String {
    let stem = format_index(index, digits);
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{stem}.{}", ext.to_ascii_lowercase()),
        _ => stem,
    }
}

/// Turn an alignment into explicit `{index, source}` records.
pub fn build_series(
    frames: &[TimestampedFrame<PathBuf>],
    alignment: &Alignment,
    filler: &Path,
    digits: usize,
) -> Vec<SeriesEntry> {
    let filler = filler.to_path_buf();
    alignment
        .resolve(frames, &filler)
        .map(|(slot, source)| SeriesEntry {
            index: slot.index,
            kind: slot.assignment.into(),
            source: source.clone(),
            file_name: output_file_name(slot.index, source, digits),
        })
        .collect()
}

pub fn dropped_records(
    frames: &[TimestampedFrame<PathBuf>],
    alignment: &Alignment,
) -> Vec<DroppedRecord> {
    alignment
        .dropped
        .iter()
        .filter_map(|d| {
            frames.get(d.frame).map(|f| DroppedRecord {
                source: f.source.clone(),
                timestamp: d.timestamp,
                slot: d.slot,
                expected: d.expected,
                reason: d.reason,
            })
        })
        .collect()
}

/// Outcome of writing a series.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MaterializeReport {
    pub files_written: u64,
    pub manifest: Option<PathBuf>,
    pub stats: AlignStats,
}

/// Write one file per entry into `out_dir`, or only `manifest.json` in manifest mode.
///
/// Symlink and copy modes leave the directory holding nothing but the numbered frames.
/// Every file is first created under a temporary name and then renamed over its final name, so
/// rerunning over a previous output replaces it slot by slot.
#[tracing::instrument(skip(manifest), fields(mode = %manifest.options.mode, entries = manifest.entries.len()))]
pub fn materialize(out_dir: &Path, manifest: &Manifest) -> LapseResult<MaterializeReport> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir '{}'", out_dir.display()))?;

    let mode = manifest.options.mode;
    let mut files_written = 0u64;
    if mode != MaterializeMode::Manifest {
        for entry in &manifest.entries {
            let target = std::path::absolute(&entry.source)
                .with_context(|| format!("resolve '{}'", entry.source.display()))?;
            let dest = out_dir.join(&entry.file_name);
            place(mode, &target, &dest)?;
            files_written += 1;
        }
    }

    let manifest_path = match mode {
        MaterializeMode::Manifest => Some(write_manifest(out_dir, manifest)?),
        MaterializeMode::Symlink | MaterializeMode::Copy => None,
    };

    tracing::info!(files_written, "series materialized");
    Ok(MaterializeReport {
        files_written,
        manifest: manifest_path,
        stats: manifest.stats(),
    })
}

pub fn write_manifest(out_dir: &Path, manifest: &Manifest) -> LapseResult<PathBuf> {
    let path = out_dir.join(MANIFEST_FILE_NAME);
    let json = serde_json::to_vec_pretty(manifest)
        .map_err(|e| LapseError::serde(format!("encode manifest: {e}")))?;
    replace_atomically(&path, |tmp| {
        std::fs::write(tmp, &json).with_context(|| format!("write '{}'", tmp.display()))
    })?;
    Ok(path)
}

pub fn read_manifest(path: &Path) -> LapseResult<Manifest> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read manifest '{}'", path.display()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| LapseError::serde(format!("decode manifest '{}': {e}", path.display())))
}

fn place(mode: MaterializeMode, target: &Path, dest: &Path) -> LapseResult<()> {
    replace_atomically(dest, |tmp| match mode {
        MaterializeMode::Symlink => make_symlink(target, tmp),
        MaterializeMode::Copy => std::fs::copy(target, tmp)
            .map(|_| ())
            .with_context(|| format!("copy '{}'", target.display())),
        MaterializeMode::Manifest => Ok(()),
    })
}

fn replace_atomically(
    dest: &Path,
    create: impl FnOnce(&Path) -> anyhow::Result<()>,
) -> LapseResult<()> {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LapseError::validation(format!("invalid output path '{}'", dest.display())))?;
    let tmp = dest.with_file_name(format!(".{name}.lapse-tmp"));
    if std::fs::symlink_metadata(&tmp).is_ok() {
        std::fs::remove_file(&tmp)
            .with_context(|| format!("remove stale '{}'", tmp.display()))?;
    }
    create(&tmp)?;
    std::fs::rename(&tmp, dest).with_context(|| format!("rename into '{}'", dest.display()))?;
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> anyhow::Result<()> {
    std::os::unix::fs::symlink(target, link)
        .with_context(|| format!("symlink '{}' -> '{}'", link.display(), target.display()))
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> anyhow::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
        .with_context(|| format!("symlink '{}' -> '{}'", link.display(), target.display()))
}

#[cfg(not(any(unix, windows)))]
fn make_symlink(_target: &Path, _link: &Path) -> anyhow::Result<()> {
    anyhow::bail!("symlinks are not supported on this platform; use copy or manifest mode")
}

#[cfg(test)]
#[path = "../../tests/unit/raster/materialize.rs"]
mod tests;
