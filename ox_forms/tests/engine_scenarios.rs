use async_trait::async_trait;
use ox_forms::{
    FieldDefinition, FormActionOutcome, FormDefinition, FormEngine, FormError, NavigationOutcome,
    SkipReason, SubmitHandler, SubmitOutcome, SubmitPayload, ValidationRule,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct RecordingHandler {
    calls: AtomicUsize,
    last: Mutex<Option<SubmitPayload>>,
}

#[async_trait]
impl SubmitHandler for RecordingHandler {
    async fn on_submit(&self, payload: SubmitPayload) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(payload);
        Ok(())
    }
}

#[derive(Default)]
struct RejectingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl SubmitHandler for RejectingHandler {
    async fn on_submit(&self, _payload: SubmitPayload) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("store unavailable")
    }
}

/// Never finishes within the short timeouts used below.
struct StalledHandler;

#[async_trait]
impl SubmitHandler for StalledHandler {
    async fn on_submit(&self, _payload: SubmitPayload) -> anyhow::Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }
}

fn name_bio_form() -> FormDefinition {
    FormDefinition::new(
        "profile",
        vec![
            FieldDefinition::new("name", "text")
                .with_label("Name")
                .with_rule(ValidationRule::required()),
            FieldDefinition::new("bio", "textarea")
                .on_page(2)
                .visible_when(|v| !v.text("name").is_empty()),
        ],
    )
}

#[tokio::test]
async fn test_two_page_walkthrough() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut engine = FormEngine::builder(name_bio_form()).build().unwrap();

    let outcome = engine.go_to_next_page();
    assert!(matches!(outcome, NavigationOutcome::Blocked { .. }));
    assert_eq!(engine.current_page(), 1);
    assert_eq!(engine.field_errors("name"), vec!["Name is required".to_string()]);

    engine.set_field_value("name", "Ada").unwrap();
    assert!(matches!(engine.go_to_next_page(), NavigationOutcome::Moved { page: 2, .. }));
    let visible: Vec<&str> = engine.visible_fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(visible, vec!["bio"]);
    assert_eq!(engine.progress(), 100.0);

    let handler = RecordingHandler::default();
    let outcome = engine.handle_form_action(&handler).await.unwrap();
    assert_eq!(outcome, FormActionOutcome::Submission(SubmitOutcome::Submitted));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    let payload = handler.last.lock().unwrap().clone().unwrap();
    assert_eq!(payload.values.text("name"), "Ada");
    assert!(!engine.is_submitting());
}

#[tokio::test]
async fn test_form_action_advances_before_last_page() {
    let mut engine = FormEngine::builder(name_bio_form()).build().unwrap();
    engine.set_field_value("name", "Ada").unwrap();
    let handler = RecordingHandler::default();

    let outcome = engine.handle_form_action(&handler).await.unwrap();
    assert!(matches!(
        outcome,
        FormActionOutcome::Navigation(NavigationOutcome::Moved { page: 2, .. })
    ));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_submission_keeps_values_and_allows_retry() {
    let mut engine = FormEngine::builder(name_bio_form()).build().unwrap();
    engine.set_field_value("name", "Ada").unwrap();
    engine.go_to_next_page();
    engine.set_field_value("bio", "Mathematician").unwrap();
    let before = engine.values().clone();

    let rejecting = RejectingHandler::default();
    let err = engine.submit(&rejecting).await.unwrap_err();
    assert!(matches!(err, FormError::SubmitRejected(_)));
    assert!(err.to_string().contains("store unavailable"));
    assert!(!engine.is_submitting());
    assert_eq!(engine.values(), &before);
    assert_eq!(engine.current_page(), 2);

    let handler = RecordingHandler::default();
    assert_eq!(engine.submit(&handler).await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(rejecting.calls.load(Ordering::SeqCst), 1);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_is_a_noop_while_in_flight() {
    let mut engine = FormEngine::builder(name_bio_form()).build().unwrap();
    engine.set_field_value("name", "Ada").unwrap();
    engine.go_to_next_page();

    let payload = engine.begin_submit().unwrap();
    assert_eq!(payload.values.text("name"), "Ada");
    assert!(engine.is_submitting());

    let handler = RecordingHandler::default();
    let outcome = engine.submit(&handler).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Skipped(SkipReason::AlreadySubmitting));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);

    engine.finish_submit();
    assert_eq!(engine.submit(&handler).await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_submit_requires_last_page_and_valid_form() {
    let mut engine = FormEngine::builder(name_bio_form()).build().unwrap();
    let handler = RecordingHandler::default();

    assert_eq!(
        engine.submit(&handler).await.unwrap(),
        SubmitOutcome::Skipped(SkipReason::NotOnLastPage)
    );

    engine.set_current_page(2).unwrap();
    assert!(!engine.can_submit());
    assert_eq!(
        engine.submit(&handler).await.unwrap(),
        SubmitOutcome::Skipped(SkipReason::Invalid)
    );
    assert!(engine.field_meta("name").unwrap().touched);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_page_form_submits_directly() {
    let form = FormDefinition::new("one", vec![FieldDefinition::new("q", "text")]);
    let mut engine = FormEngine::builder(form).build().unwrap();
    let handler = RecordingHandler::default();
    let outcome = engine.handle_form_action(&handler).await.unwrap();
    assert_eq!(outcome, FormActionOutcome::Submission(SubmitOutcome::Submitted));
}

#[tokio::test]
async fn test_abandoned_submission_clears_in_flight_flag() {
    let mut engine = FormEngine::builder(name_bio_form()).build().unwrap();
    engine.set_field_value("name", "Ada").unwrap();
    engine.go_to_next_page();

    let timed_out = tokio::time::timeout(Duration::from_millis(20), engine.submit(&StalledHandler)).await;
    assert!(timed_out.is_err());
    assert!(!engine.is_submitting());

    let handler = RecordingHandler::default();
    assert_eq!(engine.submit(&handler).await.unwrap(), SubmitOutcome::Submitted);
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}
