//! Collage composition
//!
//! This module contains everything that turns stored tiles into output images:
//! - Row-wrapping grid geometry
//! - The per-request composer with oversized-name fallback
//! - The row-per-character variant lineup

/// Per-request grid composition and artifact naming
pub mod engine;
/// Grid geometry
pub mod layout;
/// Row-per-character lineup of all stored variants
pub mod lineup;

pub use engine::{CompositionEngine, CompositionMode, StoredArtifact};
pub use layout::GridLayout;
pub use lineup::RowPerCharacterComposer;
