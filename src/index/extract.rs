use std::{
    fmt,
    fs::File,
    io::BufReader,
    path::Path,
    str::FromStr,
};

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};

use crate::foundation::{
    core::{UnixSeconds, wall_clock_to_unix},
    error::{LapseError, LapseResult},
};

/// Which timestamp of an image to index by.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TimestampField {
    /// EXIF `DateTimeOriginal` (capture time).
    #[default]
    DatetimeOriginal,
    /// EXIF `DateTime` (last modification as recorded by the camera/software).
    Datetime,
    /// EXIF `DateTimeDigitized`.
    DatetimeDigitized,
    /// Filesystem modification time.
    FileModified,
}

impl TimestampField {
    pub const ALL: [TimestampField; 4] = [
        Self::DatetimeOriginal,
        Self::Datetime,
        Self::DatetimeDigitized,
        Self::FileModified,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DatetimeOriginal => "datetime_original",
            Self::Datetime => "datetime",
            Self::DatetimeDigitized => "datetime_digitized",
            Self::FileModified => "file_modified",
        }
    }

    fn exif_tag(self) -> Option<exif::Tag> {
        match self {
            Self::DatetimeOriginal => Some(exif::Tag::DateTimeOriginal),
            Self::Datetime => Some(exif::Tag::DateTime),
            Self::DatetimeDigitized => Some(exif::Tag::DateTimeDigitized),
            Self::FileModified => None,
        }
    }
}

impl fmt::Display for TimestampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampField {
    type Err = LapseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|f| f.as_str()).collect();
                LapseError::validation(format!(
                    "unknown timestamp field '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Reads a timestamp from an image handle.
///
/// Implementations must fail with [`LapseError::MissingMetadata`] when the field is absent so
/// that indexing can abort the run.
pub trait TimestampExtractor: Send + Sync {
    fn extract(&self, source: &Path, field: TimestampField) -> LapseResult<UnixSeconds>;
}

/// Extractor backed by EXIF metadata (`kamadak-exif`) and filesystem metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    fn exif_timestamp(
        path: &Path,
        field: TimestampField,
        tag: exif::Tag,
    ) -> LapseResult<UnixSeconds> {
        let file = File::open(path).with_context(|| format!("open image '{}'", path.display()))?;
        let mut reader = BufReader::new(file);
        let meta = match exif::Reader::new().read_from_container(&mut reader) {
            Ok(meta) => meta,
            Err(exif::Error::NotFound(_) | exif::Error::InvalidFormat(_)) => {
                return Err(LapseError::missing_metadata(path, field));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read exif from '{}'", path.display()))
                    .into());
            }
        };

        let Some(entry) = meta.get_field(tag, exif::In::PRIMARY) else {
            return Err(LapseError::missing_metadata(path, field));
        };
        let exif::Value::Ascii(ref parts) = entry.value else {
            return Err(LapseError::validation(format!(
                "exif field '{field}' on '{}' is not an ASCII date",
                path.display()
            )));
        };
        let Some(raw) = parts.first() else {
            return Err(LapseError::missing_metadata(path, field));
        };

        parse_exif_datetime(raw).ok_or_else(|| {
            LapseError::validation(format!(
                "exif field '{field}' on '{}' holds an invalid date '{}'",
                path.display(),
                String::from_utf8_lossy(raw)
            ))
        })
    }

    fn modified_timestamp(path: &Path) -> LapseResult<UnixSeconds> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("read modification time of '{}'", path.display()))?;
        Ok(DateTime::<Utc>::from(modified).timestamp())
    }
}

impl TimestampExtractor for MetadataExtractor {
    fn extract(&self, source: &Path, field: TimestampField) -> LapseResult<UnixSeconds> {
        match field.exif_tag() {
            Some(tag) => Self::exif_timestamp(source, field, tag),
            None => Self::modified_timestamp(source),
        }
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` value into epoch seconds.
///
/// Returns `None` for blank or zeroed dates, which cameras write when the clock was never set.
pub fn parse_exif_datetime(raw: &[u8]) -> Option<UnixSeconds> {
    let dt = exif::DateTime::from_ascii(raw).ok()?;
    let naive = NaiveDate::from_ymd_opt(i32::from(dt.year), u32::from(dt.month), u32::from(dt.day))?
        .and_hms_opt(
            u32::from(dt.hour),
            u32::from(dt.minute),
            u32::from(dt.second),
        )?;
    Some(wall_clock_to_unix(naive))
}

#[cfg(test)]
#[path = "../../tests/unit/index/extract.rs"]
mod tests;
