//! Job data model and the converter trait workers execute

use crate::core::error::{JobError, PoolError, Result};
use crate::core::priority::Priority;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Caller-assigned job identity, unique within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Target encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG, honours the quality setting
    Jpeg,
    /// Lossless PNG
    #[default]
    Png,
    /// Lossless WebP
    Webp,
}

impl ImageFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "webp" => Ok(ImageFormat::Webp),
            other => Err(PoolError::invalid_config(
                "format",
                format!("unknown image format '{}'", other),
            )),
        }
    }
}

/// Encoder quality in `1..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Quality used when the caller does not pick one
    pub const DEFAULT: Quality = Quality(85);

    /// Validate and wrap a quality value
    pub fn new(value: u8) -> Result<Self> {
        if (1..=100).contains(&value) {
            Ok(Quality(value))
        } else {
            Err(PoolError::invalid_config(
                "quality",
                format!("{} is outside 1..=100", value),
            ))
        }
    }

    /// Raw value
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Quality {
    type Error = PoolError;

    fn try_from(value: u8) -> Result<Self> {
        Quality::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> u8 {
        quality.0
    }
}

/// One image conversion.
///
/// The pool never mutates a job after `submit`; ownership moves to the worker
/// that executes it and the job is dropped once its outcome is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Caller-assigned identity
    pub id: JobId,
    /// Dispatch priority
    pub priority: Priority,
    /// Image to read
    pub source: PathBuf,
    /// Image to write
    pub destination: PathBuf,
    /// Target encoding
    pub format: ImageFormat,
    /// Encoder quality
    pub quality: Quality,
    /// Source modification time
    pub source_modified: DateTime<Utc>,
    /// Source size in bytes
    pub source_size: u64,
}

impl Job {
    /// Create a job with default format, quality and empty source metadata
    pub fn new(
        id: JobId,
        priority: Priority,
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id,
            priority,
            source: source.into(),
            destination: destination.into(),
            format: ImageFormat::default(),
            quality: Quality::default(),
            source_modified: DateTime::<Utc>::default(),
            source_size: 0,
        }
    }

    /// Set the target format
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the encoder quality
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    /// Attach source file metadata
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_source_metadata(mut self, modified: DateTime<Utc>, size: u64) -> Self {
        self.source_modified = modified;
        self.source_size = size;
        self
    }
}

/// The external work function executed by workers.
///
/// Implementations must report ordinary failures as [`JobError`] rather than
/// panicking; a panic is still caught by the worker and reported as
/// [`JobError::Panicked`].
pub trait Converter: Send + Sync {
    /// Execute the job, returning how long the conversion itself took
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails
    fn convert(&self, job: &Job) -> std::result::Result<Duration, JobError>;

    /// Name for logs
    fn name(&self) -> &str {
        "Converter"
    }
}

impl<F> Converter for F
where
    F: Fn(&Job) -> std::result::Result<Duration, JobError> + Send + Sync,
{
    fn convert(&self, job: &Job) -> std::result::Result<Duration, JobError> {
        self(job)
    }

    fn name(&self) -> &str {
        "ClosureConverter"
    }
}

impl fmt::Debug for dyn Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Converter({})", self.name())
    }
}
