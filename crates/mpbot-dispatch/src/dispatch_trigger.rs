//! Trigger registries and the fixed-order trigger chain.
//!
//! Each registry owns one pattern-to-handler mapping and one matching
//! strategy. Registries are populated during the build phase and are
//! read-only while serving; duplicate registrations keep the first handler
//! and log the conflict instead of overwriting or failing.
//!
//! The etype registry serves event messages; the other four serve text
//! messages. The chain order `[prefix, suffix, keyword, regex, etype]` is a
//! precedence policy: structural edge matches outrank fuzzy containment and
//! regex matches, with etype as the catch-all for scenario-tagged text.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use mpbot_core::{normalize_text, to_traditional};

use crate::dispatch_contract::{HandlerRef, MatchParams};

pub const WILDCARD_ETYPE: &str = "*";

fn reverse_chars(text: &str) -> String {
    text.chars().rev().collect()
}

/// Character trie backing the longest-prefix and longest-suffix registries.
#[derive(Default)]
struct CharTrie {
    children: HashMap<char, CharTrie>,
    value: Option<HandlerRef>,
}

impl CharTrie {
    fn get(&self, key: &str) -> Option<&HandlerRef> {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.get(&ch)?;
        }
        node.value.as_ref()
    }

    fn insert(&mut self, key: &str, handler: HandlerRef) {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.value = Some(handler);
    }

    /// Longest registered key that is a literal prefix of `text`, with its
    /// handler. Uniqueness of the longest match comes from the trie walk.
    fn longest_prefix(&self, text: &str) -> Option<(String, HandlerRef)> {
        let mut node = self;
        let mut walked = String::new();
        let mut best: Option<(String, HandlerRef)> = None;
        if let Some(handler) = &node.value {
            best = Some((walked.clone(), handler.clone()));
        }
        for ch in text.chars() {
            match node.children.get(&ch) {
                Some(child) => {
                    node = child;
                    walked.push(ch);
                    if let Some(handler) = &node.value {
                        best = Some((walked.clone(), handler.clone()));
                    }
                }
                None => break,
            }
        }
        best
    }
}

/// Exact-key registry over etype discriminators, with a `*` wildcard
/// fallback.
#[derive(Default)]
pub struct EtypeRegistry {
    handlers: HashMap<String, HandlerRef>,
}

impl EtypeRegistry {
    pub fn add(&mut self, etype: &str, handler: HandlerRef) {
        if let Some(existing) = self.handlers.get(etype) {
            warn!(
                etype,
                existing = existing.name(),
                rejected = handler.name(),
                "etype trigger conflict, keeping first registration"
            );
            return;
        }
        debug!(etype, handler = handler.name(), "registered etype trigger");
        self.handlers.insert(etype.to_string(), handler);
    }

    pub fn find_handler(&self, etype: Option<&str>) -> Option<HandlerRef> {
        if let Some(etype) = etype {
            if etype != WILDCARD_ETYPE {
                if let Some(handler) = self.handlers.get(etype) {
                    return Some(handler.clone());
                }
            }
        }
        self.handlers.get(WILDCARD_ETYPE).cloned()
    }
}

/// Longest-prefix registry backed by a character trie.
///
/// Each prefix is stored in both written forms (as registered and folded to
/// Traditional) pointing at the same handler, so either spelling triggers.
#[derive(Default)]
pub struct PrefixRegistry {
    trie: CharTrie,
}

impl PrefixRegistry {
    pub fn add(&mut self, prefix: &str, handler: HandlerRef) {
        if prefix.is_empty() {
            warn!(rejected = handler.name(), "empty prefix trigger ignored");
            return;
        }
        let variant = to_traditional(prefix);
        let existing = self.trie.get(prefix).or_else(|| self.trie.get(&variant));
        if let Some(existing) = existing {
            warn!(
                prefix,
                existing = existing.name(),
                rejected = handler.name(),
                "prefix trigger conflict, keeping first registration"
            );
            return;
        }
        debug!(prefix, handler = handler.name(), "registered prefix trigger");
        self.trie.insert(prefix, handler.clone());
        if variant != prefix {
            self.trie.insert(&variant, handler);
        }
    }

    /// Longest-prefix match against the raw (non-normalized) message text.
    pub fn find_handler(&self, raw_text: &str) -> Option<(HandlerRef, MatchParams)> {
        let (prefix, handler) = self.trie.longest_prefix(raw_text)?;
        if prefix.is_empty() {
            return None;
        }
        let params = MatchParams::prefix(raw_text, &prefix);
        Some((handler, params))
    }
}

/// Longest-suffix registry: the prefix trie run over reversed strings.
#[derive(Default)]
pub struct SuffixRegistry {
    trie: CharTrie,
}

impl SuffixRegistry {
    pub fn add(&mut self, suffix: &str, handler: HandlerRef) {
        if suffix.is_empty() {
            warn!(rejected = handler.name(), "empty suffix trigger ignored");
            return;
        }
        let variant = to_traditional(suffix);
        let key = reverse_chars(suffix);
        let variant_key = reverse_chars(&variant);
        let existing = self.trie.get(&key).or_else(|| self.trie.get(&variant_key));
        if let Some(existing) = existing {
            warn!(
                suffix,
                existing = existing.name(),
                rejected = handler.name(),
                "suffix trigger conflict, keeping first registration"
            );
            return;
        }
        debug!(suffix, handler = handler.name(), "registered suffix trigger");
        self.trie.insert(&key, handler.clone());
        if variant_key != key {
            self.trie.insert(&variant_key, handler);
        }
    }

    /// Longest-suffix match against the raw message text.
    pub fn find_handler(&self, raw_text: &str) -> Option<(HandlerRef, MatchParams)> {
        let reversed = reverse_chars(raw_text);
        let (reversed_suffix, handler) = self.trie.longest_prefix(&reversed)?;
        if reversed_suffix.is_empty() {
            return None;
        }
        let suffix = reverse_chars(&reversed_suffix);
        let params = MatchParams::suffix(raw_text, &suffix);
        Some((handler, params))
    }
}

/// Substring registry keyed by normalized keywords, scanned in registration
/// order.
///
/// Insertion order is load-bearing: when several keywords occur in one
/// message, the first registered keyword wins. Registries therefore keep a
/// `Vec`, not a map.
#[derive(Default)]
pub struct KeywordRegistry {
    entries: Vec<(String, HandlerRef)>,
}

impl KeywordRegistry {
    fn lookup(&self, keyword: &str) -> Option<&HandlerRef> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == keyword)
            .map(|(_, handler)| handler)
    }

    pub fn add(&mut self, keyword: &str, handler: HandlerRef) {
        let keyword = normalize_text(keyword);
        if keyword.is_empty() {
            warn!(rejected = handler.name(), "empty keyword trigger ignored");
            return;
        }
        let variant = to_traditional(&keyword);
        let existing = self.lookup(&keyword).or_else(|| self.lookup(&variant));
        if let Some(existing) = existing {
            warn!(
                keyword = %keyword,
                existing = existing.name(),
                rejected = handler.name(),
                "keyword trigger conflict, keeping first registration"
            );
            return;
        }
        debug!(
            keyword = %keyword,
            handler = handler.name(),
            "registered keyword trigger"
        );
        if variant != keyword {
            self.entries.push((keyword, handler.clone()));
            self.entries.push((variant, handler));
        } else {
            self.entries.push((keyword, handler));
        }
    }

    /// First registered keyword contained anywhere in the raw message text.
    pub fn find_handler(&self, raw_text: &str) -> Option<(HandlerRef, MatchParams)> {
        for (keyword, handler) in &self.entries {
            if raw_text.contains(keyword.as_str()) {
                let params = MatchParams::keyword(raw_text, keyword);
                return Some((handler.clone(), params));
            }
        }
        None
    }
}

/// Regex registry, evaluated in registration order with unanchored search.
#[derive(Default)]
pub struct RegexRegistry {
    entries: Vec<(Regex, HandlerRef)>,
}

impl RegexRegistry {
    pub fn add(&mut self, pattern: Regex, handler: HandlerRef) {
        if let Some((_, existing)) = self
            .entries
            .iter()
            .find(|(existing, _)| existing.as_str() == pattern.as_str())
        {
            warn!(
                pattern = pattern.as_str(),
                existing = existing.name(),
                rejected = handler.name(),
                "regex trigger conflict, keeping first registration"
            );
            return;
        }
        debug!(
            pattern = pattern.as_str(),
            handler = handler.name(),
            "registered regex trigger"
        );
        self.entries.push((pattern, handler));
    }

    pub fn find_handler(&self, raw_text: &str) -> Option<(HandlerRef, MatchParams)> {
        for (pattern, handler) in &self.entries {
            if let Some(found) = pattern.find(raw_text) {
                let params = MatchParams::regex(raw_text, pattern.as_str(), &found);
                return Some((handler.clone(), params));
            }
        }
        None
    }
}

/// The fixed-order trigger chain consulted for text messages.
///
/// Changing this order changes observable routing behavior.
#[derive(Default)]
pub struct TextTriggers {
    pub prefix: PrefixRegistry,
    pub suffix: SuffixRegistry,
    pub keyword: KeywordRegistry,
    pub regex: RegexRegistry,
    pub etype: EtypeRegistry,
}

impl TextTriggers {
    /// First non-none result along `[prefix, suffix, keyword, regex, etype]`.
    pub fn find_handler(
        &self,
        raw_text: &str,
        etype: Option<&str>,
    ) -> Option<(HandlerRef, Option<MatchParams>)> {
        if let Some((handler, params)) = self.prefix.find_handler(raw_text) {
            return Some((handler, Some(params)));
        }
        if let Some((handler, params)) = self.suffix.find_handler(raw_text) {
            return Some((handler, Some(params)));
        }
        if let Some((handler, params)) = self.keyword.find_handler(raw_text) {
            return Some((handler, Some(params)));
        }
        if let Some((handler, params)) = self.regex.find_handler(raw_text) {
            return Some((handler, Some(params)));
        }
        self.etype
            .find_handler(etype)
            .map(|handler| (handler, None))
    }
}
