// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo booth

use std::fmt;

/// Capture-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// No frame could be obtained at shot time (camera not streaming yet)
    CaptureUnavailable,
    /// The snapshot could not be decoded into pixels
    DecodeFailed(String),
    /// Encoding the processed photo failed
    EncodingFailed(String),
    /// A capture sequence is already running
    SequenceInProgress,
    /// The running sequence was aborted
    Aborted,
    /// Saving a photo to disk failed
    SaveFailed(String),
}

/// Filter catalog errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// No filter with this id in the catalog
    UnknownFilter(String),
    /// Two catalog entries share an id
    DuplicateId(String),
    /// Catalog entry without an id
    EmptyId,
    /// The compositing expression could not be parsed
    InvalidExpression { expression: String, reason: String },
    /// The catalog holds no filters
    EmptyCatalog,
    /// A catalog file could not be read or parsed
    InvalidCatalog(String),
}

/// Photo strip export errors
///
/// All of these are recoverable: the session is left untouched so the
/// export can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The session holds no photos to export
    NothingToExport,
    /// Rasterizing the strip failed
    RenderFailed(String),
    /// JPEG encoding of the strip failed
    EncodingFailed(String),
    /// Writing the strip to disk failed
    SaveFailed(String),
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file exists but could not be read
    Read(String),
    /// Config file is not valid JSON for [`crate::config::Config`]
    Parse(String),
    /// Config file could not be written
    Write(String),
    /// A value is outside its valid range
    Invalid(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::CaptureUnavailable => write!(f, "No frame available for capture"),
            CaptureError::DecodeFailed(msg) => write!(f, "Failed to decode snapshot: {}", msg),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SequenceInProgress => write!(f, "A capture sequence is already running"),
            CaptureError::Aborted => write!(f, "Capture sequence aborted"),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnknownFilter(id) => write!(f, "Unknown filter: {}", id),
            FilterError::DuplicateId(id) => write!(f, "Duplicate filter id: {}", id),
            FilterError::EmptyId => write!(f, "Filter id must not be empty"),
            FilterError::InvalidExpression { expression, reason } => {
                write!(f, "Invalid filter expression '{}': {}", expression, reason)
            }
            FilterError::EmptyCatalog => write!(f, "Filter catalog is empty"),
            FilterError::InvalidCatalog(msg) => write!(f, "Invalid filter catalog: {}", msg),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::NothingToExport => write!(f, "No photos to export"),
            ExportError::RenderFailed(msg) => write!(f, "Failed to render strip: {}", msg),
            ExportError::EncodingFailed(msg) => write!(f, "Failed to encode strip: {}", msg),
            ExportError::SaveFailed(msg) => write!(f, "Failed to save strip: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::Write(msg) => write!(f, "Failed to write config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for CaptureError {}
impl std::error::Error for FilterError {}
impl std::error::Error for ExportError {}
impl std::error::Error for ConfigError {}

// Conversions for I/O errors
impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::SaveFailed(err.to_string())
    }
}
