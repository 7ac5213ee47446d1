//! Built-in feature handlers and the default dispatch tree.
//!
//! Mirrors the startup registration phase: the classification schema is a
//! fixed code-level declaration, handlers are registered once, and the tree
//! is frozen before any traffic is served.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use mpbot_dispatch::{
    DispatchTree, DispatchTreeBuilder, EnrichedMessage, MessageHandler, NodeSpec, PlatformClient,
};

pub const HELP_TEXT: &str = "微信公众号帮助\n[帮助]: 帮助信息\n[发送其他任意文本]: 复读机\n";

pub const SUBSCRIPTION_WELCOME_TEXT: &str = "hello world";

/// Etype value embedded in provisioning QR codes for module subscriptions.
pub const ETYPE_SUBSCRIPTION: &str = "subscription";

/// Replies with the fixed help text on an exact `帮助` / `help` message.
pub struct HelpHandler;

#[async_trait]
impl MessageHandler for HelpHandler {
    fn name(&self) -> &str {
        "help"
    }

    async fn handle(
        &self,
        _client: &dyn PlatformClient,
        _message: &EnrichedMessage,
    ) -> Result<Option<String>> {
        Ok(Some(HELP_TEXT.to_string()))
    }
}

/// Catch-all for text messages: echoes the message content back.
pub struct EchoHandler;

#[async_trait]
impl MessageHandler for EchoHandler {
    fn name(&self) -> &str {
        "echo"
    }

    async fn handle(
        &self,
        _client: &dyn PlatformClient,
        message: &EnrichedMessage,
    ) -> Result<Option<String>> {
        Ok(Some(message.message.raw_text().to_string()))
    }
}

/// Greets users arriving through subscription events or subscription QR
/// scans.
pub struct SubscriptionWelcomeHandler;

#[async_trait]
impl MessageHandler for SubscriptionWelcomeHandler {
    fn name(&self) -> &str {
        "subscription_welcome"
    }

    async fn handle(
        &self,
        _client: &dyn PlatformClient,
        _message: &EnrichedMessage,
    ) -> Result<Option<String>> {
        Ok(Some(SUBSCRIPTION_WELCOME_TEXT.to_string()))
    }
}

/// Fixed classification schema for official-account traffic.
pub fn official_account_schema() -> NodeSpec {
    NodeSpec::namespace([
        (
            "event",
            NodeSpec::namespace([
                ("scan", NodeSpec::Event),
                ("subscribe", NodeSpec::Event),
                ("subscribe_scan", NodeSpec::Event),
                ("unsubscribe", NodeSpec::Event),
            ]),
        ),
        ("text", NodeSpec::Text),
    ])
}

/// Build and freeze the default dispatch tree with the built-in handlers.
pub fn default_dispatch_tree() -> Result<DispatchTree> {
    let mut builder = DispatchTreeBuilder::from_schema(&official_account_schema());

    builder.on_fullmatch(&["text"], &["帮助", "help"], Arc::new(HelpHandler))?;
    builder.on_etype(&["text"], "*", Arc::new(EchoHandler))?;

    let welcome = Arc::new(SubscriptionWelcomeHandler);
    builder.on_etype(&["event", "subscribe"], "*", welcome.clone())?;
    builder.on_etype(&["event", "subscribe_scan"], "*", welcome.clone())?;
    builder.on_etype(&["event", "scan"], ETYPE_SUBSCRIPTION, welcome)?;

    Ok(builder.build())
}
