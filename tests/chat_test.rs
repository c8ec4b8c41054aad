mod common;

use std::sync::Arc;

use common::{assistant, FakeProviders, ScriptedModel};
use concierge::{
    assistant::ApprovalGate,
    chat::{ChatAction, ChatResponse, ChatService},
    config::ChatConfig,
};
use concierge_mcp::SessionId;

const EVENT_JSON: &str = r#"{"title": "Lunch", "date": "2025-12-16", "start_time": "12:00", "end_time": "13:00"}"#;

async fn service(
    model: Arc<ScriptedModel>,
    providers: &FakeProviders,
    allowed: &[&str],
) -> ChatService {
    let assistant = assistant(model, providers, ApprovalGate::Asynchronous).await;
    let config = ChatConfig {
        allowed_users: allowed.iter().map(|u| u.to_string()).collect(),
        ..Default::default()
    };
    ChatService::new(Arc::new(assistant), config)
}

#[tokio::test]
async fn test_empty_allowlist_denies_everyone() {
    let model = ScriptedModel::new(["general", "hi"]);
    let providers = FakeProviders::standard();
    let chat = service(model.clone(), &providers, &[]).await;

    assert!(!chat.is_authorized("42"));
    let response = chat.handle_message("42", "hello").await;
    assert_eq!(response, ChatResponse::Text("⛔ Access denied.".to_string()));
    assert_eq!(
        chat.handle_decision("42", ChatAction::Approve).await,
        "⛔ Access denied."
    );
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_user_is_denied() {
    let model = ScriptedModel::new(["general", "hi"]);
    let providers = FakeProviders::standard();
    let chat = service(model, &providers, &["42"]).await;

    assert_eq!(chat.handle_message("7", "hello").await.text(), "⛔ Access denied.");
    assert_eq!(chat.handle_message("42", "hello").await.text(), "hi");
}

#[tokio::test]
async fn test_commands() {
    let model = ScriptedModel::new(Vec::<String>::new());
    let providers = FakeProviders::standard();
    let chat = service(model.clone(), &providers, &["42"]).await;

    assert!(chat.handle_message("42", "/start").await.text().starts_with("👋 Hello!"));
    assert!(chat.handle_message("42", "/help").await.text().contains("/clear - Clear conversation"));
    assert_eq!(
        chat.handle_message("42", "/clear").await.text(),
        "🗑️ Conversation history has been cleared."
    );
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn test_quick_action_expands_to_request() {
    let model = ScriptedModel::new(["check_schedule", "today"]);
    let providers = FakeProviders::standard().respond("get_events", "No scheduled events.");
    let assistant = Arc::new(assistant(model, &providers, ApprovalGate::Asynchronous).await);
    let config = ChatConfig {
        allowed_users: vec!["42".to_string()],
        ..Default::default()
    };
    let chat = ChatService::new(assistant.clone(), config);

    assert_eq!(chat.keyboard()[0], "📅 Today's schedule");
    chat.handle_message("42", "📅 Today's schedule").await;

    let state = assistant.conversation(&SessionId::from("42")).await.unwrap();
    assert_eq!(state.turns[0].content, "Tell me about my today's schedule");
}

#[tokio::test]
async fn test_approval_buttons_complete_the_call() {
    let model = ScriptedModel::new(["create_event", EVENT_JSON]);
    let providers = FakeProviders::standard().respond("create_event", "✅ Event created: Lunch");
    let chat = service(model, &providers, &["42"]).await;

    let response = chat.handle_message("42", "Add lunch tomorrow").await;
    let ChatResponse::Approval { text, request } = response else {
        panic!("expected an approval prompt");
    };
    assert!(text.contains("📅 Create event"));
    assert!(text.contains("  • title: Lunch"));
    assert_eq!(request.tool_name, "create_event");
    assert!(providers.calls().lock().is_empty());

    let done = chat.handle_decision("42", ChatAction::Approve).await;
    assert!(done.starts_with("✅ Completed!\n\n"));
    assert!(done.contains("Event created: Lunch"));
    assert_eq!(providers.calls().lock().len(), 1);

    assert_eq!(
        chat.handle_decision("42", ChatAction::Approve).await,
        "⏰ Approval request has expired."
    );
}

#[tokio::test]
async fn test_cancel_button() {
    let model = ScriptedModel::new(["create_event", EVENT_JSON]);
    let providers = FakeProviders::standard();
    let chat = service(model, &providers, &["42"]).await;

    chat.handle_message("42", "Add lunch").await;
    assert_eq!(
        chat.handle_decision("42", ChatAction::Cancel).await,
        "❌ Operation cancelled."
    );
    assert!(providers.calls().lock().is_empty());
}

#[tokio::test]
async fn test_clear_drops_pending_approval() {
    let model = ScriptedModel::new(["create_event", EVENT_JSON]);
    let providers = FakeProviders::standard();
    let chat = service(model, &providers, &["42"]).await;

    let response = chat.handle_message("42", "Add lunch").await;
    assert!(matches!(response, ChatResponse::Approval { .. }));

    chat.handle_message("42", "/clear").await;
    assert_eq!(
        chat.handle_decision("42", ChatAction::Approve).await,
        "⏰ Approval request has expired."
    );
    assert!(providers.calls().lock().is_empty());
}
