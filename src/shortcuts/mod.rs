//! Non-Steam Shortcut Catalog
//!
//! Decodes the binary `shortcuts.vdf` container Steam uses to register
//! externally-launched titles, and extracts it into normalized catalog
//! entries enriched with grid artwork and `.url`-derived app ids.

pub mod codec;
pub mod extract;

pub use codec::{decode, BinaryNode, Dictionary};
pub use extract::{extract, ExtractOptions};
