//! Error types and path context for ingestion and composition

use std::fmt;
use std::path::{Path, PathBuf};

use crate::io::selection::VariantSelector;
use crate::sheet::identity::CharacterId;

/// Main error type for all pipeline operations
#[derive(Debug)]
pub enum PipelineError {
    /// Failed to decode an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to encode or save an image
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image encoding error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A required root directory does not exist
    MissingDirectory {
        /// The directory that was expected
        path: PathBuf,
    },

    /// A file name carries no leading run of digits
    InvalidCharacterId {
        /// The offending name
        name: String,
    },

    /// Sheet dimensions are not a whole number of tiles
    MalformedSheet {
        /// Sheet file path
        path: PathBuf,
        /// Actual sheet width
        width: u32,
        /// Actual sheet height
        height: u32,
        /// Expected tile width
        tile_width: u32,
        /// Expected tile height
        tile_height: u32,
    },

    /// Several stored variants match and none was chosen
    AmbiguousSelection {
        /// Requested character
        id: CharacterId,
        /// Files that matched the request
        candidates: Vec<PathBuf>,
    },

    /// No stored asset matches a requested character
    UnresolvableSelection {
        /// Requested character
        id: CharacterId,
        /// Which kind of tile was requested
        selector: VariantSelector,
    },

    /// A dispatched job failed or panicked
    WorkerFailure {
        /// Submission index of the job
        index: usize,
        /// Human readable job label
        job: String,
        /// Failure description
        reason: String,
    },

    /// Configuration or argument validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Input data cannot be used for the requested operation
    InvalidSourceData {
        /// Description of what's wrong with the data
        reason: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::MissingDirectory { path } => {
                write!(f, "Required directory '{}' does not exist", path.display())
            }
            Self::InvalidCharacterId { name } => {
                write!(f, "No character number found in '{name}'")
            }
            Self::MalformedSheet {
                path,
                width,
                height,
                tile_width,
                tile_height,
            } => {
                write!(
                    f,
                    "'{}' is not a proper sheet ({width}x{height}); expected height {tile_height} \
                     and a width that is a multiple of {tile_width}",
                    path.display()
                )
            }
            Self::AmbiguousSelection { id, candidates } => {
                write!(
                    f,
                    "Character {id} has {} stored variants and none was chosen",
                    candidates.len()
                )
            }
            Self::UnresolvableSelection { id, selector } => {
                write!(f, "Character {id} has no stored {selector} tile")
            }
            Self::WorkerFailure { index, job, reason } => {
                write!(f, "Job {index} ({job}) failed: {reason}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InvalidSourceData { reason } => {
                write!(f, "Invalid source data: {reason}")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl PipelineError {
    /// Whether the failure is isolated to one sheet, job or selection slot
    ///
    /// Systemic failures (missing roots, bad configuration, unresolvable
    /// selections) end the run instead.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedSheet { .. }
                | Self::WorkerFailure { .. }
                | Self::AmbiguousSelection { .. }
        )
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, PipelineError>;

const UNKNOWN_PATH: &str = "<unknown>";

/// Attaches the path an operation was working on to its error
pub trait WithPath<T> {
    /// Replace placeholder paths in the error with `path`
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path filled in
    fn with_path(self, path: &Path) -> Result<T>;

    /// Like [`WithPath::with_path`] but also names the file system operation
    ///
    /// # Errors
    ///
    /// Propagates the original error with path and operation filled in
    fn with_operation(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T, E> WithPath<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            match &mut error {
                PipelineError::ImageLoad { path: p, .. }
                | PipelineError::ImageExport { path: p, .. }
                | PipelineError::FileSystem { path: p, .. }
                    if p.as_os_str() == UNKNOWN_PATH =>
                {
                    *p = path.to_path_buf();
                }
                _ => {}
            }
            error
        })
    }

    fn with_operation(self, path: &Path, operation: &'static str) -> Result<T> {
        self.with_path(path).map_err(|mut error| {
            if let PipelineError::FileSystem { operation: op, .. } = &mut error {
                *op = operation;
            }
            error
        })
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> PipelineError {
    PipelineError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a file system error for a known path and operation
pub fn fs_error(path: &Path, operation: &'static str, source: std::io::Error) -> PipelineError {
    PipelineError::FileSystem {
        path: path.to_path_buf(),
        operation,
        source,
    }
}
