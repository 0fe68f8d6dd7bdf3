//! Character sheet ingestion and collage composition
//!
//! Raw sheets are horizontal strips of fixed-size tiles. Ingestion cuts each
//! new sheet into a canonical base tile and alternate variant tiles and files
//! them in a per-character asset store; composition lays selected tiles out in
//! a wrapping grid and writes the collage.

#![forbid(unsafe_code)]

/// Grid layout, collage naming and the variant lineup
pub mod composition;
/// Codec, configuration, errors, selection and the command line
pub mod io;
/// Ingestion planning, dispatch and orchestration
pub mod pipeline;
/// Pixel buffers
pub mod raster;
/// Sheet validation, classification and entry tags
pub mod sheet;
/// Directory-backed asset storage
pub mod store;

pub use io::error::{PipelineError, Result};
