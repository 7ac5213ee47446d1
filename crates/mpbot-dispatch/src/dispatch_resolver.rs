//! Message-to-handler resolution.
//!
//! The resolver computes the classification key path and etype for an
//! inbound message, walks the frozen tree, runs the terminal node's matching
//! strategy, and assembles the enriched message for the invoker. Absence of
//! a route is a normal outcome, never an error.

use tracing::{info, warn};

use crate::dispatch_contract::{
    scenario_etype, DispatchFault, EnrichedMessage, HandlerRef, InboundMessage,
};
use crate::dispatch_tree::DispatchTree;

/// Outcome of resolving one inbound message against the tree.
pub struct Resolution {
    pub handler: Option<HandlerRef>,
    pub message: EnrichedMessage,
    pub fault: Option<DispatchFault>,
}

/// Resolve `message` to at most one handler.
///
/// A malformed scenario payload degrades to `etype = None` (wildcard-only
/// routing) and marks the resolution as a bad request; routing still runs.
pub fn resolve_message(tree: &DispatchTree, message: InboundMessage) -> Resolution {
    let mut fault = None;
    let etype = match scenario_etype(&message) {
        Ok(etype) => etype,
        Err(error) => {
            warn!(message_id = %message.id, %error, "bad request: malformed scenario payload");
            fault = Some(DispatchFault::BadRequest);
            None
        }
    };

    let path = message.classification_path();
    let matched = tree
        .lookup(&path)
        .and_then(|node| node.find_handler(message.raw_text(), etype.as_deref()));

    let (handler, params) = match matched {
        Some((handler, params)) => (Some(handler), params),
        None => {
            info!(
                message_id = %message.id,
                path = %path.join("."),
                "message triggered nothing"
            );
            (None, None)
        }
    };

    Resolution {
        handler,
        message: EnrichedMessage {
            message,
            etype,
            params,
        },
        fault,
    }
}
