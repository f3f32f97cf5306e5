use anyhow::Error;
use ox_forms::{
    ElementRenderer, FieldDefinition, FieldRenderContext, FieldWrapper, FormDefinition, FormEngine,
    PageDefinition, PageRenderContext, PageRenderer, ProgressConfig, TypeRegistry, ValidationRule,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn survey_form() -> FormDefinition {
    FormDefinition {
        title: "Survey".to_string(),
        pages: vec![PageDefinition {
            page: 1,
            title: Some("Basics".to_string()),
            description: Some("Tell us about you".to_string()),
            component: None,
        }],
        progress: Some(ProgressConfig::default()),
        ..FormDefinition::new(
            "survey",
            vec![
                FieldDefinition::new("full_name", "text")
                    .with_label("Full Name")
                    .with_rule(ValidationRule::required()),
                FieldDefinition::new("code_percentage", "slider")
                    .with_label("AI-written code")
                    .with_props(json!({ "min": 0, "max": 100, "suffix": "%" })),
                FieldDefinition::new("tools", "select")
                    .on_page(2)
                    .with_label("Editor")
                    .with_props(json!({ "options": ["Cursor", "VSCode"] })),
            ],
        )
    }
}

#[test]
fn test_render_first_page() {
    let mut engine = FormEngine::builder(survey_form()).build().unwrap();
    let html = engine.render().unwrap();

    assert!(html.starts_with(r#"<form id="survey""#));
    assert!(html.contains("Full Name"), "HTML should contain field label");
    assert!(html.contains("AI-written code (0%)"), "slider shows min when unset");
    assert!(html.contains("<h3>Basics</h3>"));
    assert!(html.contains("Step 1 of 2"));
    assert!(html.contains("<span>0%</span>"));
    assert!(html.contains(">Next</button>"));
    assert!(!html.contains("Editor"), "page 2 fields are not rendered");
}

#[test]
fn test_render_last_page_submit_button() {
    let mut engine = FormEngine::builder(survey_form()).build().unwrap();
    engine.set_field_value("full_name", "Ada").unwrap();
    engine.go_to_next_page();

    let html = engine.render().unwrap();
    assert!(html.contains(r#"<option value="Cursor">Cursor</option>"#));
    assert!(html.contains("Step 2 of 2"));
    assert!(html.contains(r#"<button type="submit">Submit</button>"#));

    engine.begin_submit().unwrap();
    let html = engine.render().unwrap();
    assert!(html.contains("Submitting..."));
    assert!(html.contains(r#"<select id="tools" name="tools" class="form-control" disabled>"#));
}

#[test]
fn test_errors_render_once_touched() {
    let mut engine = FormEngine::builder(survey_form()).build().unwrap();
    engine.go_to_next_page();
    let html = engine.render().unwrap();
    assert!(html.contains(r#"<p class="form-error">Full Name is required</p>"#));
}

#[test]
fn test_single_page_form_has_no_progress() {
    let form = FormDefinition {
        progress: Some(ProgressConfig::default()),
        ..FormDefinition::new("single", vec![FieldDefinition::new("q", "text")])
    };
    let mut engine = FormEngine::builder(form).build().unwrap();
    let html = engine.render().unwrap();
    assert!(!html.contains("form-progress"));
    assert!(!html.contains("Previous"));
}

#[test]
fn test_values_are_escaped() {
    let mut engine = FormEngine::builder(survey_form()).build().unwrap();
    engine.set_field_value("full_name", r#"<b>"x"</b>"#).unwrap();
    let html = engine.render().unwrap();
    assert!(html.contains("&lt;b&gt;&quot;x&quot;&lt;/b&gt;"));
}

/// Immediate-mode renderer that reports an edit while it is being drawn.
struct TypingRenderer;

impl ElementRenderer for TypingRenderer {
    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        if ctx.value.is_none() {
            (ctx.on_change)(Value::String("typed".to_string()));
            (ctx.on_blur)();
        }
        Ok(format!("<i>{}</i>", field.name))
    }
}

#[test]
fn test_render_applies_renderer_events() {
    let mut registry = TypeRegistry::with_builtins();
    registry
        .register_element_renderer("typing", Arc::new(TypingRenderer))
        .unwrap();
    let form = FormDefinition::new("events", vec![FieldDefinition::new("nick", "typing")]);
    let mut engine = FormEngine::new(form, Arc::new(registry)).unwrap();

    engine.render().unwrap();
    assert_eq!(engine.values().text("nick"), "typed");
    assert!(engine.field_meta("nick").unwrap().touched);
}

struct TwoColumnPage;

impl PageRenderer for TwoColumnPage {
    fn render(&self, page: &PageRenderContext, fields: &[String]) -> Result<String, Error> {
        let (left, right) = fields.split_at(fields.len() / 2);
        Ok(format!(
            "<div data-page=\"{}\"><div>{}</div><div>{}</div></div>",
            page.page,
            left.concat(),
            right.concat()
        ))
    }
}

#[test]
fn test_custom_page_renderer() {
    let mut registry = TypeRegistry::with_builtins();
    registry.register_page_renderer("two-column", Arc::new(TwoColumnPage));
    let mut form = survey_form();
    form.pages[0].component = Some("two-column".to_string());

    let mut engine = FormEngine::new(form, Arc::new(registry)).unwrap();
    let html = engine.render_current_page().unwrap();
    assert!(html.starts_with(r#"<div data-page="1"><div>"#));
    assert!(!html.contains("form-page-header"));
}

struct Tagged(&'static str);

impl FieldWrapper for Tagged {
    fn wrap(&self, field: &FieldDefinition, inner: &str) -> Result<String, Error> {
        Ok(format!(r#"<div class="{}" data-field="{}">{}</div>"#, self.0, field.name, inner))
    }
}

#[test]
fn test_field_and_form_wrappers() {
    let mut registry = TypeRegistry::with_builtins();
    registry.register_wrapper("card", Arc::new(Tagged("card")));
    registry.register_wrapper("cell", Arc::new(Tagged("cell")));

    let mut form = survey_form();
    form.wrapper = Some("cell".to_string());
    form.field_mut("full_name").unwrap().wrapper = Some("card".to_string());

    let mut engine = FormEngine::new(form, Arc::new(registry)).unwrap();
    let html = engine.render_current_page().unwrap();
    assert!(html.contains(r#"<div class="card" data-field="full_name">"#));
    assert!(html.contains(r#"<div class="cell" data-field="code_percentage">"#));
    assert!(!html.contains(r#"<div class="cell" data-field="full_name">"#));
}

#[test]
fn test_unregistered_wrapper_leaves_field_unwrapped() {
    let mut form = survey_form();
    form.field_mut("full_name").unwrap().wrapper = Some("missing".to_string());
    let mut engine = FormEngine::builder(form).build().unwrap();
    let html = engine.render_current_page().unwrap();
    assert!(html.contains("Full Name"));
    assert!(!html.contains("data-field"));
}
