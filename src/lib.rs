//! Steamshelf: Unified Game Catalog
//!
//! Reconciles a Steam account's remote library and its locally registered
//! non-Steam shortcuts into one normalized, taggable catalog: a binary
//! decoder for the shortcuts container, a remote-library normalizer with
//! two-tier artwork resolution and NFO metadata overlay, a versioned JSON
//! catalog store, and a tag indexer for the unified view.

pub mod artwork;
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod nfo;
pub mod remote;
pub mod shortcuts;
pub mod sync;
pub mod views;
