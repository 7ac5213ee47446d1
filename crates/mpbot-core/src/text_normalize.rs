//! Text canonicalization for fuzzy trigger matching.
//!
//! Normalization collapses visually equivalent Unicode sequences (NFKC),
//! trims surrounding whitespace, lowercases, and folds Traditional Chinese
//! into Simplified so a trigger registered in one written form also matches
//! text typed in the other.

use unicode_normalization::UnicodeNormalization;
use zhconv::{zhconv, Variant};

/// Canonicalize `text` for fuzzy comparisons.
///
/// Applies, in order: NFKC fold, trim, lowercase, Traditional-to-Simplified
/// folding. Pure and total; never fails.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text.nfkc().collect();
    let lowered = folded.trim().to_lowercase();
    to_simplified(&lowered)
}

/// Fold a string into Simplified Chinese. Non-Chinese text passes through.
pub fn to_simplified(text: &str) -> String {
    zhconv(text, Variant::ZhHans)
}

/// Fold a string into Traditional Chinese. Non-Chinese text passes through.
pub fn to_traditional(text: &str) -> String {
    zhconv(text, Variant::ZhHant)
}
