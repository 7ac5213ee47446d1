//! Foundational pure text utilities shared across mpbot crates.
//!
//! Provides the canonical normalization pipeline and the Simplified/Traditional
//! Chinese folding helpers used by the trigger registries.

pub mod text_normalize;

pub use text_normalize::{normalize_text, to_simplified, to_traditional};
