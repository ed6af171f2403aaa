//! Error types for the print service

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a print backend for a single device call
#[derive(Debug, Error)]
#[error("{operation} failed: {detail}")]
pub struct DeviceError {
    operation: &'static str,
    detail: String,
}

impl DeviceError {
    pub fn new(operation: &'static str, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }

    /// Name of the device call that failed (e.g. "StartDoc")
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Lifecycle step at which a started job was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    StartPage,
    Draw,
    EndPage,
    EndDocument,
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStage::StartPage => "start page",
            JobStage::Draw => "draw",
            JobStage::EndPage => "end page",
            JobStage::EndDocument => "end document",
        };
        f.write_str(s)
    }
}

/// Print error types
///
/// The `Display` text is the message meant for a human operator.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The source file could not be opened or read
    #[error("Error: Unable to access print file.")]
    FileInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS has no default printer configured
    #[error("Error: There is no default printer.")]
    NoDefaultDevice,

    /// Querying the default printer name failed
    #[error("Error: Unable to find default printer name.")]
    DeviceLookupFailed(#[source] DeviceError),

    /// A device context could not be created for the printer
    #[error("Error: Unable to find printer.")]
    DeviceUnavailable {
        device: String,
        #[source]
        source: DeviceError,
    },

    /// Begin-document was rejected
    #[error("Error: Could not create print job.")]
    JobCreationFailed(#[source] DeviceError),

    /// The document was started but could not be completed
    #[error("Error: Could not complete print job.")]
    JobIncomplete {
        stage: JobStage,
        #[source]
        source: DeviceError,
    },
}

/// Stable, machine-readable classification of a [`PrintError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintErrorKind {
    FileInaccessible,
    NoDefaultDevice,
    DeviceLookupFailed,
    DeviceUnavailable,
    JobCreationFailed,
    JobIncomplete,
}

impl PrintErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintErrorKind::FileInaccessible => "FILE_INACCESSIBLE",
            PrintErrorKind::NoDefaultDevice => "NO_DEFAULT_DEVICE",
            PrintErrorKind::DeviceLookupFailed => "DEVICE_LOOKUP_FAILED",
            PrintErrorKind::DeviceUnavailable => "DEVICE_UNAVAILABLE",
            PrintErrorKind::JobCreationFailed => "JOB_CREATION_FAILED",
            PrintErrorKind::JobIncomplete => "JOB_INCOMPLETE",
        }
    }
}

impl std::fmt::Display for PrintErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PrintError {
    pub fn kind(&self) -> PrintErrorKind {
        match self {
            PrintError::FileInaccessible { .. } => PrintErrorKind::FileInaccessible,
            PrintError::NoDefaultDevice => PrintErrorKind::NoDefaultDevice,
            PrintError::DeviceLookupFailed(_) => PrintErrorKind::DeviceLookupFailed,
            PrintError::DeviceUnavailable { .. } => PrintErrorKind::DeviceUnavailable,
            PrintError::JobCreationFailed(_) => PrintErrorKind::JobCreationFailed,
            PrintError::JobIncomplete { .. } => PrintErrorKind::JobIncomplete,
        }
    }

    pub(crate) fn incomplete(stage: JobStage, source: DeviceError) -> Self {
        PrintError::JobIncomplete { stage, source }
    }
}

/// Result type for print operations
pub type PrintResult<T> = Result<T, PrintError>;

/// Invalid configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// Lines are split on the `\n` byte, which these encodings do not keep intact
    #[error("Text encoding is not ASCII-compatible: {0}")]
    IncompatibleEncoding(String),
}
