//! End-to-end dispatch scenarios over the default tree: message in, optional
//! reply out, with the platform client stubbed at the trait seam.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use mpbot_dispatch::{DispatchFault, DispatchTreeBuilder, InboundMessage, NodeSpec, PlatformClient};
use mpbot_dispatch::{EnrichedMessage, MessageHandler};
use mpbot_runtime::{
    default_dispatch_tree, dispatch_message, HELP_TEXT, SUBSCRIPTION_WELCOME_TEXT,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct StubClient {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl PlatformClient for StubClient {
    async fn send_text(&self, user_id: &str, content: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((user_id.to_string(), content.to_string()));
        Ok(())
    }
}

fn text_message(id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: id.to_string(),
        kind: "text".to_string(),
        event: None,
        scenario: None,
        text: Some(text.to_string()),
        source: "user-e2e".to_string(),
    }
}

fn scan_event(id: &str, scenario: &str) -> InboundMessage {
    InboundMessage {
        id: id.to_string(),
        kind: "event".to_string(),
        event: Some("scan".to_string()),
        scenario: Some(scenario.to_string()),
        text: None,
        source: "user-e2e".to_string(),
    }
}

#[tokio::test]
async fn help_text_round_trip() {
    init_logging();
    let tree = default_dispatch_tree().unwrap();
    let client = StubClient::default();

    let outcome = dispatch_message(&tree, &client, text_message("e2e-1", "帮助")).await;
    assert_eq!(outcome.reply.as_deref(), Some(HELP_TEXT));
    assert!(outcome.fault.is_none());
}

#[tokio::test]
async fn subscription_scan_round_trip() {
    init_logging();
    let tree = default_dispatch_tree().unwrap();
    let client = StubClient::default();

    let outcome =
        dispatch_message(&tree, &client, scan_event("e2e-2", r#"{"etype":"subscription"}"#)).await;
    assert_eq!(outcome.reply.as_deref(), Some(SUBSCRIPTION_WELCOME_TEXT));
    assert_eq!(outcome.handler.as_deref(), Some("subscription_welcome"));
}

#[tokio::test]
async fn undecodable_scenario_without_wildcard_yields_bad_request_and_no_reply() {
    init_logging();
    // The default tree registers only the exact "subscription" etype under
    // event/scan, so a broken scenario has nowhere to route.
    let tree = default_dispatch_tree().unwrap();
    let client = StubClient::default();

    let outcome = dispatch_message(&tree, &client, scan_event("e2e-3", "###not-json###")).await;
    assert!(outcome.reply.is_none());
    assert!(outcome.handler.is_none());
    assert_eq!(outcome.fault, Some(DispatchFault::BadRequest));
}

#[tokio::test]
async fn concurrent_dispatches_share_the_frozen_tree() {
    init_logging();
    let tree = Arc::new(default_dispatch_tree().unwrap());
    let client = Arc::new(StubClient::default());

    let mut handles = Vec::new();
    for index in 0..16 {
        let tree = tree.clone();
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let text = if index % 2 == 0 { "帮助" } else { "复读这句" };
            let message = text_message(&format!("e2e-c{index}"), text);
            dispatch_message(tree.as_ref(), client.as_ref(), message).await
        }));
    }

    for (index, handle) in handles.into_iter().enumerate() {
        let outcome = handle.await.unwrap();
        if index % 2 == 0 {
            assert_eq!(outcome.reply.as_deref(), Some(HELP_TEXT));
        } else {
            assert_eq!(outcome.reply.as_deref(), Some("复读这句"));
        }
    }
}

#[tokio::test]
async fn trigger_chain_precedence_holds_end_to_end() {
    init_logging();
    struct Canned(&'static str, &'static str);

    #[async_trait]
    impl MessageHandler for Canned {
        fn name(&self) -> &str {
            self.0
        }

        async fn handle(
            &self,
            _client: &dyn PlatformClient,
            _message: &EnrichedMessage,
        ) -> Result<Option<String>> {
            Ok(Some(self.1.to_string()))
        }
    }

    let schema = NodeSpec::namespace([("text", NodeSpec::Text)]);
    let mut builder = DispatchTreeBuilder::from_schema(&schema);
    builder
        .on_prefix(&["text"], &["天气"], Arc::new(Canned("weather", "prefix wins")))
        .unwrap();
    builder
        .on_keyword(&["text"], &["天气"], Arc::new(Canned("weather_kw", "keyword wins")))
        .unwrap();
    let tree = builder.build();
    let client = StubClient::default();

    let outcome = dispatch_message(&tree, &client, text_message("e2e-4", "天气 北京")).await;
    assert_eq!(outcome.reply.as_deref(), Some("prefix wins"));
    assert_eq!(outcome.handler.as_deref(), Some("weather"));
}
