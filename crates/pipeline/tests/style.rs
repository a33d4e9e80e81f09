//! Inline style generation through the orchestrator.

mod common;

use assert_matches::assert_matches;
use dramagen_core::error::CoreError;
use dramagen_core::providers::ResponseFormat;

use common::{HarnessBuilder, ScriptedText};

#[tokio::test]
async fn returns_the_parsed_style_object() {
    let reply = "Here you go:\n```json\n{\"name\": \"Noir\", \"lighting\": \"low key\"}\n```";
    let h = HarnessBuilder::new()
        .text(ScriptedText::replying([Ok(reply.to_string())]))
        .build()
        .await;

    let style = h.orchestrator.generate_style("moody noir").await.unwrap();
    assert_eq!(style["name"], "Noir");

    let prompts = h.text.prompts();
    let (prompt, system, options) = &prompts[0];
    assert!(prompt.contains("moody noir"));
    assert!(system.is_some());
    assert_eq!(options.temperature, Some(0.7));
    assert_eq!(options.response_format, Some(ResponseFormat::JsonObject));
    assert!(h.ledger.is_empty().await);
}

#[tokio::test]
async fn blank_description_skips_the_model() {
    let h = HarnessBuilder::new().build().await;
    assert_matches!(
        h.orchestrator.generate_style("  ").await,
        Err(CoreError::Validation(_))
    );
    assert!(h.text.prompts().is_empty());
}

#[tokio::test]
async fn non_object_output_is_a_parse_error() {
    let h = HarnessBuilder::new()
        .text(ScriptedText::replying([Ok("[\"noir\"]".to_string())]))
        .build()
        .await;
    assert_matches!(
        h.orchestrator.generate_style("noir").await,
        Err(CoreError::Parse { .. })
    );
}

#[tokio::test]
async fn upstream_errors_pass_through() {
    let h = HarnessBuilder::new()
        .text(ScriptedText::replying([Err(CoreError::Upstream("timeout".into()))]))
        .build()
        .await;
    assert_matches!(
        h.orchestrator.generate_style("noir").await,
        Err(CoreError::Upstream(_))
    );
}
