//! Handler invocation boundary and the per-message dispatch entry point.
//!
//! This is the only suspension point in the dispatch path: resolution is
//! pure synchronous computation, then the resolved handler (if any) runs
//! asynchronously with the externally-owned platform client. Handler
//! failures are caught here; they never propagate past the outcome.

use tracing::{error, info};

use mpbot_dispatch::{
    resolve_message, DispatchFault, DispatchTree, InboundMessage, PlatformClient,
};

/// Result of dispatching one inbound message.
///
/// `reply` is the literal reply payload for the transport layer to render;
/// `None` means no reply is sent. `fault` classifies degraded outcomes so
/// the transport can pick a protocol-level response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub reply: Option<String>,
    pub handler: Option<String>,
    pub fault: Option<DispatchFault>,
}

impl DispatchOutcome {
    fn unrouted(fault: Option<DispatchFault>) -> Self {
        Self {
            reply: None,
            handler: None,
            fault,
        }
    }
}

/// Resolve and invoke the handler for one inbound message.
///
/// Never fails: an unroutable message, a malformed scenario payload, or a
/// handler error all degrade to an outcome with no reply.
pub async fn dispatch_message(
    tree: &DispatchTree,
    client: &dyn PlatformClient,
    message: InboundMessage,
) -> DispatchOutcome {
    let message_id = message.id.clone();
    let resolution = resolve_message(tree, message);
    let Some(handler) = resolution.handler else {
        return DispatchOutcome::unrouted(resolution.fault);
    };

    info!(
        message_id = %message_id,
        handler = handler.name(),
        "message triggered handler"
    );
    match handler.handle(client, &resolution.message).await {
        Ok(reply) => DispatchOutcome {
            reply,
            handler: Some(handler.name().to_string()),
            fault: resolution.fault,
        },
        Err(err) => {
            error!(
                message_id = %message_id,
                handler = handler.name(),
                error = %err,
                "handler execution failed"
            );
            DispatchOutcome {
                reply: None,
                handler: Some(handler.name().to_string()),
                fault: Some(DispatchFault::Internal),
            }
        }
    }
}
