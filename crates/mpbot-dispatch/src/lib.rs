//! Layered webhook-message dispatch engine for mpbot.
//!
//! Routes each inbound chat-platform message to at most one registered
//! handler through a static classification tree (message kind, then event
//! kind) whose terminal nodes own pattern-matching registries: longest
//! prefix, longest suffix, keyword containment, regex search, and exact
//! etype with a wildcard fallback. The tree is built once at startup and is
//! read-only while serving.
//!
//! ```rust
//! use std::sync::Arc;
//! use mpbot_dispatch::{
//!     resolve_message, DispatchTreeBuilder, EnrichedMessage, InboundMessage,
//!     MessageHandler, NodeSpec, PlatformClient,
//! };
//!
//! struct Ping;
//!
//! #[async_trait::async_trait]
//! impl MessageHandler for Ping {
//!     fn name(&self) -> &str {
//!         "ping"
//!     }
//!
//!     async fn handle(
//!         &self,
//!         _client: &dyn PlatformClient,
//!         _message: &EnrichedMessage,
//!     ) -> anyhow::Result<Option<String>> {
//!         Ok(Some("pong".to_string()))
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let schema = NodeSpec::namespace([("text", NodeSpec::Text)]);
//! let mut builder = DispatchTreeBuilder::from_schema(&schema);
//! builder.on_prefix(&["text"], &["ping"], Arc::new(Ping))?;
//! let tree = builder.build();
//!
//! let message = InboundMessage {
//!     id: "1".to_string(),
//!     kind: "text".to_string(),
//!     event: None,
//!     scenario: None,
//!     text: Some("ping now".to_string()),
//!     source: "user-1".to_string(),
//! };
//! let resolution = resolve_message(&tree, message);
//! assert_eq!(resolution.handler.expect("route").name(), "ping");
//! # Ok(())
//! # }
//! ```

pub mod dispatch_contract;
pub mod dispatch_resolver;
pub mod dispatch_tree;
pub mod dispatch_trigger;

pub use dispatch_contract::*;
pub use dispatch_resolver::*;
pub use dispatch_tree::*;
pub use dispatch_trigger::*;
