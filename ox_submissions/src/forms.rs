use ox_forms::{FieldValidator, FormDefinition, FormError, FormSchema, FormValues, ModuleSchema, ValidationError};
use serde_json::Value;
use std::sync::Arc;

pub const PROJECT_SUBMISSION_FORM: &str = "project_submission";
pub const JUDGE_REVIEW_FORM: &str = "judge_review";

const MODULE_YAML: &str = include_str!("../forms/hackathon.yaml");

pub fn module() -> Result<ModuleSchema, FormError> {
    ModuleSchema::from_yaml_str(MODULE_YAML)
}

fn github_host(value: Option<&Value>) -> Result<(), String> {
    let Some(raw) = value.and_then(Value::as_str).map(str::trim) else {
        return Ok(());
    };
    if raw.is_empty() {
        return Ok(());
    }
    match url::Url::parse(raw) {
        Ok(parsed) if parsed.host_str() == Some("github.com") => Ok(()),
        _ => Err("Must be a github.com repository".to_string()),
    }
}

/// The three-page participant form, with code-attached checks.
pub fn project_submission_form() -> Result<FormDefinition, FormError> {
    let mut form = module()?.form(PROJECT_SUBMISSION_FORM)?.clone();
    form.field_mut("github_url")
        .ok_or_else(|| FormError::UnknownField("github_url".to_string()))?
        .validator = Some(FieldValidator::new(github_host));
    form.set_visible_when("testing_instructions", |values| !values.is_blank("hosted_site_url"))?;
    Ok(form)
}

/// Whole-form rules: a final submission needs a description.
pub fn project_submission_schema() -> Arc<dyn FormSchema> {
    Arc::new(|values: &FormValues| {
        let mut errors = Vec::new();
        if values.text("status") == "submitted" && values.is_blank("description") {
            errors.push(ValidationError::new(
                "description",
                "A description is required before submitting",
            ));
        }
        errors
    })
}

pub fn judge_review_form() -> Result<FormDefinition, FormError> {
    Ok(module()?.form(JUDGE_REVIEW_FORM)?.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ox_forms::FieldKind;

    #[test]
    fn test_project_form_has_three_pages() {
        let form = project_submission_form().unwrap();
        assert_eq!(form.pages.len(), 3);
        assert_eq!(form.field("members").unwrap().kind, FieldKind::TextArea);
        assert_eq!(form.field("github_url").unwrap().page_number(), 2);
        assert!(form.field("github_url").unwrap().validator.is_some());

        let testing = form.field("testing_instructions").unwrap();
        assert!(!testing.is_visible(&FormValues::new()));
        assert!(testing.is_visible(&FormValues::new().with("hosted_site_url", "https://orbit.dev")));
    }

    #[test]
    fn test_github_host_check() {
        assert!(github_host(None).is_ok());
        assert!(github_host(Some(&Value::from("https://github.com/a/b"))).is_ok());
        assert!(github_host(Some(&Value::from("https://gitlab.com/a/b"))).is_err());
    }

    #[test]
    fn test_schema_requires_description_when_submitted() {
        let schema = project_submission_schema();
        let values = FormValues::new().with("status", "submitted");
        let errors = schema.validate(&values);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "description");
        assert!(schema.validate(&values.with("description", "A thing")).is_empty());
    }

    #[test]
    fn test_judge_form_notes_follow_reviewed() {
        let form = judge_review_form().unwrap();
        let notes = form.field("judge_notes").unwrap();
        assert!(!notes.is_visible(&FormValues::new()));
        assert!(notes.is_visible(&FormValues::new().with("reviewed", true)));
        assert_eq!(form.field("score").unwrap().prop_f64("max"), Some(10.0));
    }
}
