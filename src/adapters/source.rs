//! Segment sources: where raw segments for a video come from.
//!
//! The file-based source looks next to the video for, in order:
//! 1. `<base>-chapters.xml` / `<base>_chapters.xml` (chapter XML)
//! 2. `<base>.edl` (edit decision list)

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Provenance, Segment, SegmentError};

use super::chapters::parse_chapters;
use super::edl::{parse_edl, EdlOptions};

/// Errors loading a segment file that exists
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Malformed segment file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An unvalidated segment as produced by a parser
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    pub label: String,
    pub action_code: Option<i32>,
    pub provenance: Provenance,
}

impl RawSegment {
    /// Validate into a [`Segment`]
    pub fn into_segment(self) -> Result<Segment, SegmentError> {
        Segment::new(self.start, self.end, &self.label, self.provenance)
    }
}

/// Provider of raw segments for a playing video
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Load segments for `video`.
    ///
    /// `Ok(None)` means no segment file exists. `Ok(Some(vec![]))` means a
    /// file was found but contained no usable segments.
    async fn load(&self, video: &Path) -> Result<Option<Vec<RawSegment>>, SourceError>;
}

/// Reads chapter XML or EDL files stored next to the video
#[derive(Debug, Clone, Default)]
pub struct FileSegmentSource {
    edl: EdlOptions,
}

impl FileSegmentSource {
    pub fn new(edl: EdlOptions) -> Self {
        Self { edl }
    }

    /// Chapter XML candidates for a video
    pub fn chapter_paths(video: &Path) -> Vec<PathBuf> {
        ["-chapters.xml", "_chapters.xml"]
            .iter()
            .map(|suffix| with_suffix(video, suffix))
            .collect()
    }

    /// EDL candidate for a video
    pub fn edl_path(video: &Path) -> PathBuf {
        with_suffix(video, ".edl")
    }

    async fn load_chapters(&self, video: &Path) -> Result<Option<Vec<RawSegment>>, SourceError> {
        let Some((path, content)) = read_first(&Self::chapter_paths(video)).await? else {
            return Ok(None);
        };

        let segments = parse_chapters(&content)
            .map_err(|reason| SourceError::Malformed { path: path.clone(), reason })?;
        info!(path = %path.display(), count = segments.len(), "Loaded chapter XML");
        Ok(Some(segments))
    }

    async fn load_edl(&self, video: &Path) -> Result<Option<Vec<RawSegment>>, SourceError> {
        let Some((path, content)) = read_first(&[Self::edl_path(video)]).await? else {
            return Ok(None);
        };

        let segments = parse_edl(&content, &self.edl)
            .map_err(|reason| SourceError::Malformed { path: path.clone(), reason })?;
        info!(path = %path.display(), count = segments.len(), "Loaded EDL");
        Ok(Some(segments))
    }
}

#[async_trait]
impl SegmentSource for FileSegmentSource {
    async fn load(&self, video: &Path) -> Result<Option<Vec<RawSegment>>, SourceError> {
        // Chapters win when they yield segments; otherwise fall back to EDL
        let chapters = self.load_chapters(video).await;
        if matches!(&chapters, Ok(Some(segments)) if !segments.is_empty()) {
            return chapters;
        }
        if let Err(ref e) = chapters {
            warn!("{}", e);
        }

        match self.load_edl(video).await? {
            Some(segments) => Ok(Some(segments)),
            None => match chapters {
                // A chapter file existed but was unusable and there is no EDL
                Err(e) => Err(e),
                Ok(found) => Ok(found),
            },
        }
    }
}

fn with_suffix(video: &Path, suffix: &str) -> PathBuf {
    let mut base: OsString = video.with_extension("").into_os_string();
    base.push(suffix);
    PathBuf::from(base)
}

/// Read the first candidate that exists and is non-empty
async fn read_first(paths: &[PathBuf]) -> Result<Option<(PathBuf, String)>, SourceError> {
    for path in paths {
        debug!(path = %path.display(), "Trying segment file");
        match tokio::fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => {
                debug!(path = %path.display(), "Segment file is empty");
            }
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes).into_owned();
                return Ok(Some((path.clone(), content)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(SourceError::Io {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
    Ok(None)
}
