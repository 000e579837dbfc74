use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the project core.
///
/// `UnsupportedFormat` and `ExtractionFailed` are advisory: the editor logs
/// them and carries on with whatever the user already typed.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// File extension is not one of mp3 / flac / wav
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Tag backend could not read the file
    #[error("Metadata extraction failed for {}: {reason}", .path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// Project XML is not well-formed
    #[error("Malformed project document: {0}")]
    MalformedDocument(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TuneInCrew path is not an existing file: {}", .0.display())]
    InvalidExternalToolPath(PathBuf),

    #[error("Failed to launch {}: {source}", .path.display())]
    ToolLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Project has not been saved to a file yet")]
    NoCurrentFile,
}

impl ProjectError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the errors the editor swallows instead of surfacing.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::ExtractionFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProjectError>;
