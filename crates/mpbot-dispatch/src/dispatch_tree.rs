//! Static classification tree and its build-then-freeze lifecycle.
//!
//! The tree maps classification key paths (message kind, then event kind) to
//! terminal nodes that own the matching strategy for that class of message:
//! event nodes carry one etype registry, text nodes carry the full trigger
//! chain. Registration happens on `DispatchTreeBuilder` during startup;
//! `build` freezes the tree into an immutable `DispatchTree` that is safe
//! for concurrent lookups with no locking.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use crate::dispatch_contract::{EnrichedMessage, HandlerRef, MatchParams, PlatformClient};
use crate::dispatch_trigger::{EtypeRegistry, TextTriggers};

/// Declarative shape of the tree, fixed in code at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    /// Pure container of child nodes.
    Namespace(BTreeMap<String, NodeSpec>),
    /// Terminal node for event messages, matched by etype.
    Event,
    /// Terminal node for text messages, matched by the trigger chain.
    Text,
}

impl NodeSpec {
    pub fn namespace<const N: usize>(children: [(&str, NodeSpec); N]) -> Self {
        Self::Namespace(
            children
                .into_iter()
                .map(|(key, spec)| (key.to_string(), spec))
                .collect(),
        )
    }
}

enum NodeBody {
    Namespace,
    Event(EtypeRegistry),
    Text(Box<TextTriggers>),
}

/// One node of the classification tree.
pub struct TreeNode {
    name: String,
    body: NodeBody,
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn from_spec(name: String, spec: &NodeSpec) -> Self {
        match spec {
            NodeSpec::Namespace(children) => Self {
                children: children
                    .iter()
                    .map(|(key, child)| {
                        let child_name = format!("{name}.{key}");
                        (key.clone(), Self::from_spec(child_name, child))
                    })
                    .collect(),
                name,
                body: NodeBody::Namespace,
            },
            NodeSpec::Event => Self {
                name,
                body: NodeBody::Event(EtypeRegistry::default()),
                children: BTreeMap::new(),
            },
            NodeSpec::Text => Self {
                name,
                body: NodeBody::Text(Box::default()),
                children: BTreeMap::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run this terminal node's matching strategy. Namespace nodes match
    /// nothing themselves.
    pub fn find_handler(
        &self,
        raw_text: &str,
        etype: Option<&str>,
    ) -> Option<(HandlerRef, Option<MatchParams>)> {
        match &self.body {
            NodeBody::Namespace => None,
            NodeBody::Event(etypes) => etypes.find_handler(etype).map(|handler| (handler, None)),
            NodeBody::Text(triggers) => triggers.find_handler(raw_text, etype),
        }
    }
}

/// Mutable tree under construction. All trigger registration goes through
/// this builder; once `build` runs, no further mutation is possible.
pub struct DispatchTreeBuilder {
    root: TreeNode,
}

impl DispatchTreeBuilder {
    pub fn from_schema(schema: &NodeSpec) -> Self {
        Self {
            root: TreeNode::from_spec("dispatcher".to_string(), schema),
        }
    }

    pub fn build(self) -> DispatchTree {
        DispatchTree { root: self.root }
    }

    fn node_mut(&mut self, path: &[&str]) -> Result<&mut TreeNode> {
        let mut node = &mut self.root;
        for key in path {
            let name = node.name.clone();
            match node.children.get_mut(*key) {
                Some(child) => node = child,
                None => bail!("no dispatch node '{key}' under '{name}'"),
            }
        }
        Ok(node)
    }

    fn text_triggers_mut(&mut self, path: &[&str]) -> Result<&mut TextTriggers> {
        let node = self.node_mut(path)?;
        match &mut node.body {
            NodeBody::Text(triggers) => Ok(triggers),
            _ => bail!("dispatch node '{}' is not a text node", node.name),
        }
    }

    /// Register an exact-etype handler on an event or text node. `*` acts as
    /// the wildcard fallback.
    pub fn on_etype(&mut self, path: &[&str], etype: &str, handler: HandlerRef) -> Result<()> {
        let node = self.node_mut(path)?;
        match &mut node.body {
            NodeBody::Event(etypes) => etypes.add(etype, handler),
            NodeBody::Text(triggers) => triggers.etype.add(etype, handler),
            NodeBody::Namespace => {
                bail!("dispatch node '{}' accepts no etype triggers", node.name)
            }
        }
        Ok(())
    }

    pub fn on_prefix(&mut self, path: &[&str], prefixes: &[&str], handler: HandlerRef) -> Result<()> {
        let triggers = self.text_triggers_mut(path)?;
        for prefix in prefixes {
            triggers.prefix.add(prefix, handler.clone());
        }
        Ok(())
    }

    /// Sugar over prefix registration: the handler only fires when the whole
    /// message equals the registered literal, so it can conflict with plain
    /// prefix triggers on the same literal.
    pub fn on_fullmatch(
        &mut self,
        path: &[&str],
        literals: &[&str],
        handler: HandlerRef,
    ) -> Result<()> {
        let guarded: HandlerRef = std::sync::Arc::new(FullmatchHandler { inner: handler });
        self.on_prefix(path, literals, guarded)
    }

    pub fn on_suffix(&mut self, path: &[&str], suffixes: &[&str], handler: HandlerRef) -> Result<()> {
        let triggers = self.text_triggers_mut(path)?;
        for suffix in suffixes {
            triggers.suffix.add(suffix, handler.clone());
        }
        Ok(())
    }

    pub fn on_keyword(&mut self, path: &[&str], keywords: &[&str], handler: HandlerRef) -> Result<()> {
        let triggers = self.text_triggers_mut(path)?;
        for keyword in keywords {
            triggers.keyword.add(keyword, handler.clone());
        }
        Ok(())
    }

    pub fn on_regex(&mut self, path: &[&str], patterns: &[&str], handler: HandlerRef) -> Result<()> {
        let triggers = self.text_triggers_mut(path)?;
        for pattern in patterns {
            let compiled = Regex::new(pattern)?;
            triggers.regex.add(compiled, handler.clone());
        }
        Ok(())
    }
}

/// Frozen classification tree. Read-only for the process lifetime; lookups
/// are pure reads and safe to run concurrently.
pub struct DispatchTree {
    root: TreeNode,
}

impl DispatchTree {
    /// Walk the tree child-by-child along `path`. A missing child at any
    /// depth means the message is unroutable.
    pub fn lookup(&self, path: &[String]) -> Option<&TreeNode> {
        let mut node = &self.root;
        for key in path {
            node = node.children.get(key)?;
        }
        Some(node)
    }
}

/// Guard wrapper applied by `on_fullmatch`: skips the inner handler unless
/// the prefix match consumed the whole message.
struct FullmatchHandler {
    inner: HandlerRef,
}

#[async_trait]
impl crate::dispatch_contract::MessageHandler for FullmatchHandler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn handle(
        &self,
        client: &dyn PlatformClient,
        message: &EnrichedMessage,
    ) -> Result<Option<String>> {
        let remain = message
            .params
            .as_ref()
            .and_then(|params| params.prefix_remain());
        match remain {
            Some("") => self.inner.handle(client, message).await,
            _ => {
                info!(
                    message_id = %message.message.id,
                    handler = self.inner.name(),
                    "message ignored by fullmatch condition"
                );
                Ok(None)
            }
        }
    }
}
