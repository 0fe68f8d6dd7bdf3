//! Persistent character asset storage

/// Directory-backed base and variant tile store
pub mod assets;

pub use assets::{AssetStore, CharacterVariants, StoreInventory};
