//! Message contract and handler seams for the dispatch engine.
//!
//! Defines the inbound message shape produced by the platform SDK boundary,
//! the enriched message handed to handlers, the per-match parameter union,
//! and the trait seams (`MessageHandler`, `PlatformClient`) that keep all
//! collaborator I/O outside the core.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mpbot_core::normalize_text;

pub const MESSAGE_KIND_TEXT: &str = "text";
pub const MESSAGE_KIND_EVENT: &str = "event";

/// Inbound message as parsed by the external platform SDK.
///
/// `scenario` is the provider-defined opaque string (the original payload's
/// scene field) which may embed a JSON object carrying an `etype`
/// discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub source: String,
}

impl InboundMessage {
    /// Ordered classification key path used to walk the dispatch tree.
    pub fn classification_path(&self) -> Vec<String> {
        let mut path = vec![self.kind.clone()];
        if let Some(event) = &self.event {
            path.push(event.clone());
        }
        path
    }

    pub fn raw_text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Extract the `etype` discriminator from the message's scenario string.
///
/// Returns `Ok(None)` when no scenario is present or the decoded object has
/// no string `etype` field. Returns an error only when the scenario exists
/// but is not valid JSON, which callers classify as a bad request.
pub fn scenario_etype(message: &InboundMessage) -> Result<Option<String>> {
    let Some(scenario) = message.scenario.as_deref() else {
        return Ok(None);
    };
    let body: Value = serde_json::from_str(scenario)
        .with_context(|| format!("undecodable scenario payload for message {}", message.id))?;
    Ok(body
        .get("etype")
        .and_then(|value| value.as_str())
        .map(|value| value.to_string()))
}

/// Parameters computed by the registry that matched a text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchParams {
    pub raw_text: String,
    pub norm_text: String,
    pub kind: MatchKind,
}

/// Per-matcher variant data attached to a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    Prefix {
        prefix: String,
        remain: String,
        args: Vec<String>,
    },
    Suffix {
        suffix: String,
        remain: String,
    },
    Keyword {
        keyword: String,
    },
    Regex {
        pattern: String,
        matched: String,
        start: usize,
        end: usize,
    },
}

impl MatchParams {
    pub fn prefix(raw_text: &str, prefix: &str) -> Self {
        let remain = raw_text[prefix.len()..].trim().to_string();
        let args = remain
            .split_whitespace()
            .map(|arg| arg.to_string())
            .collect();
        Self {
            raw_text: raw_text.to_string(),
            norm_text: normalize_text(raw_text),
            kind: MatchKind::Prefix {
                prefix: prefix.to_string(),
                remain,
                args,
            },
        }
    }

    pub fn suffix(raw_text: &str, suffix: &str) -> Self {
        let remain = raw_text[..raw_text.len() - suffix.len()].trim().to_string();
        Self {
            raw_text: raw_text.to_string(),
            norm_text: normalize_text(raw_text),
            kind: MatchKind::Suffix {
                suffix: suffix.to_string(),
                remain,
            },
        }
    }

    pub fn keyword(raw_text: &str, keyword: &str) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            norm_text: normalize_text(raw_text),
            kind: MatchKind::Keyword {
                keyword: keyword.to_string(),
            },
        }
    }

    pub fn regex(raw_text: &str, pattern: &str, found: &regex::Match<'_>) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            norm_text: normalize_text(raw_text),
            kind: MatchKind::Regex {
                pattern: pattern.to_string(),
                matched: found.as_str().to_string(),
                start: found.start(),
                end: found.end(),
            },
        }
    }

    /// Remainder after the matched prefix, when this match came from the
    /// prefix registry. Used by the fullmatch guard.
    pub fn prefix_remain(&self) -> Option<&str> {
        match &self.kind {
            MatchKind::Prefix { remain, .. } => Some(remain.as_str()),
            _ => None,
        }
    }
}

/// Message enriched by the resolver before handler invocation.
///
/// Carries the computed etype and match parameters explicitly instead of
/// mutating the inbound message.
#[derive(Debug, Clone)]
pub struct EnrichedMessage {
    pub message: InboundMessage,
    pub etype: Option<String>,
    pub params: Option<MatchParams>,
}

/// Externally-owned chat platform client handed to handlers.
///
/// The dispatch core never performs I/O itself; handlers reach the platform
/// only through this seam.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    async fn send_text(&self, user_id: &str, content: &str) -> Result<()>;
}

/// A registered trigger handler.
///
/// The returned string, if any, is the literal reply payload for the inbound
/// message. `name` identifies the handler in registration diagnostics.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn handle(
        &self,
        client: &dyn PlatformClient,
        message: &EnrichedMessage,
    ) -> Result<Option<String>>;
}

pub type HandlerRef = Arc<dyn MessageHandler>;

/// Fault classification surfaced to the transport layer alongside an empty
/// reply. The transport decides the protocol-level response; nothing here is
/// fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchFault {
    BadRequest,
    Internal,
}

impl fmt::Display for DispatchFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad request"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}
