//! Input/output, configuration and error handling
//!
//! This module contains the boundary of the pipeline:
//! - Image encoding and decoding
//! - Constants and runtime configuration
//! - The error type shared by every component
//! - Selection resolution, logging, progress and the command line

/// Command-line arguments and the top-level processor
pub mod cli;
/// Encoder capability and image file access
pub mod codec;
/// Constants and the runtime configuration struct
pub mod configuration;
/// Error types with path context
pub mod error;
/// Logger installation
pub mod logging;
/// Progress bars for dispatch batches
pub mod progress;
/// Turning selections into stored tile files
pub mod selection;
