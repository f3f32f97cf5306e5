use crate::schema::FieldDefinition;
use crate::values::{is_blank_value, FormValues};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
    static ref PATTERNS: RwLock<HashMap<String, Regex>> = RwLock::new(HashMap::new());
}

/// Compiles `pattern` once and hands out the cached `Regex` afterwards.
fn compiled_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = PATTERNS.read().ok().and_then(|cache| cache.get(pattern).cloned()) {
        return Ok(re);
    }
    let re = Regex::new(pattern)?;
    if let Ok(mut cache) = PATTERNS.write() {
        cache.insert(pattern.to_string(), re.clone());
    }
    Ok(re)
}

/// Represents a validation error for a specific field.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLength { value: usize },
    MaxLength { value: usize },
    Min { value: f64 },
    Max { value: f64 },
    Pattern { pattern: String },
    Email,
    Url,
    OneOf { values: Vec<Value> },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ValidationRule {
    #[serde(flatten)]
    pub kind: RuleKind,
    #[serde(default)]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: RuleKind) -> Self {
        Self { kind, message: None }
    }

    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    pub fn min_length(value: usize) -> Self {
        Self::new(RuleKind::MinLength { value })
    }

    pub fn max_length(value: usize) -> Self {
        Self::new(RuleKind::MaxLength { value })
    }

    pub fn min(value: f64) -> Self {
        Self::new(RuleKind::Min { value })
    }

    pub fn max(value: f64) -> Self {
        Self::new(RuleKind::Max { value })
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::Pattern {
            pattern: pattern.into(),
        })
    }

    pub fn email() -> Self {
        Self::new(RuleKind::Email)
    }

    pub fn url() -> Self {
        Self::new(RuleKind::Url)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Verifies the rule itself is well formed (currently: patterns compile).
    pub fn compile(&self) -> Result<(), regex::Error> {
        if let RuleKind::Pattern { pattern } = &self.kind {
            compiled_pattern(pattern)?;
        }
        Ok(())
    }

    /// Checks one value. Every rule except `required` skips blank values.
    pub fn check(&self, value: Option<&Value>, label: &str) -> Result<(), String> {
        let fail = |default: String| Err(self.message.clone().unwrap_or(default));

        if let RuleKind::Required = self.kind {
            if is_blank_value(value) {
                return fail(format!("{} is required", label));
            }
            return Ok(());
        }

        let value = match value {
            Some(v) if !is_blank_value(Some(v)) => v,
            _ => return Ok(()),
        };

        match &self.kind {
            RuleKind::Required => Ok(()),
            RuleKind::MinLength { value: min } => {
                if length_of(value) < *min {
                    return fail(format!("{} must be at least {} characters", label, min));
                }
                Ok(())
            }
            RuleKind::MaxLength { value: max } => {
                if length_of(value) > *max {
                    return fail(format!("{} must be at most {} characters", label, max));
                }
                Ok(())
            }
            RuleKind::Min { value: min } => match as_number(value) {
                Some(n) if n < *min => fail(format!("{} must be at least {}", label, min)),
                Some(_) => Ok(()),
                None => fail(format!("{} must be a number", label)),
            },
            RuleKind::Max { value: max } => match as_number(value) {
                Some(n) if n > *max => fail(format!("{} must be at most {}", label, max)),
                Some(_) => Ok(()),
                None => fail(format!("{} must be a number", label)),
            },
            RuleKind::Pattern { pattern } => {
                let re = match compiled_pattern(pattern) {
                    Ok(re) => re,
                    Err(e) => {
                        log::error!("Pattern rule for {} does not compile: {}", label, e);
                        return Ok(());
                    }
                };
                if !re.is_match(&as_text(value)) {
                    return fail(format!("{} has invalid format", label));
                }
                Ok(())
            }
            RuleKind::Email => {
                if !EMAIL_RE.is_match(&as_text(value)) {
                    return fail("Invalid email".to_string());
                }
                Ok(())
            }
            RuleKind::Url => match url::Url::parse(&as_text(value)) {
                Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
                _ => fail("Must be a valid URL".to_string()),
            },
            RuleKind::OneOf { values } => {
                if !values.contains(value) {
                    return fail(format!("{} is not an allowed choice", label));
                }
                Ok(())
            }
        }
    }
}

fn length_of(value: &Value) -> usize {
    match value {
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        other => other.to_string().chars().count(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Caller-supplied validation for a single field value.
#[derive(Clone)]
pub struct FieldValidator(Arc<dyn Fn(Option<&Value>) -> Result<(), String> + Send + Sync>);

impl FieldValidator {
    pub fn new<F>(validator: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(validator))
    }

    pub fn check(&self, value: Option<&Value>) -> Result<(), String> {
        (self.0)(value)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldValidator(..)")
    }
}

/// Whole-form validation, re-run against the full values on every change.
pub trait FormSchema: Send + Sync {
    fn validate(&self, values: &FormValues) -> Vec<ValidationError>;
}

impl<F> FormSchema for F
where
    F: Fn(&FormValues) -> Vec<ValidationError> + Send + Sync,
{
    fn validate(&self, values: &FormValues) -> Vec<ValidationError> {
        self(values)
    }
}

/// Field name to rules, declared alongside the form in configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct RuleSchema {
    pub fields: BTreeMap<String, Vec<ValidationRule>>,
    /// Display labels used in messages; the field name when absent.
    #[serde(skip)]
    labels: BTreeMap<String, String>,
}

impl RuleSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, field: impl Into<String>, rule: ValidationRule) -> Self {
        self.fields.entry(field.into()).or_default().push(rule);
        self
    }

    pub fn with_label(mut self, field: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(field.into(), label.into());
        self
    }

    /// Takes message labels from the matching field definitions.
    pub fn labelled_from(mut self, fields: &[FieldDefinition]) -> Self {
        for field in fields {
            if self.fields.contains_key(&field.name) {
                self.labels
                    .insert(field.name.clone(), field.display_label().to_string());
            }
        }
        self
    }

    pub fn compile(&self) -> Result<(), (String, regex::Error)> {
        for (field, rules) in &self.fields {
            for rule in rules {
                rule.compile().map_err(|e| (field.clone(), e))?;
            }
        }
        Ok(())
    }
}

impl FormSchema for RuleSchema {
    fn validate(&self, values: &FormValues) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (field, rules) in &self.fields {
            for rule in rules {
                let label = self.labels.get(field).map_or(field.as_str(), String::as_str);
                if let Err(message) = rule.check(values.get(field), label) {
                    errors.push(ValidationError::new(field.clone(), message));
                }
            }
        }
        errors
    }
}

/// Service for validating field values against their definitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Validator;

impl Validator {
    /// All messages for one field; empty means valid.
    pub fn validate_field(&self, field: &FieldDefinition, values: &FormValues) -> Vec<String> {
        let value = values.get(&field.name);
        let label = field.display_label();
        let mut errors = Vec::new();

        for rule in &field.validation {
            if let Err(msg) = rule.check(value, label) {
                errors.push(msg);
            }
        }
        if let Some(validator) = &field.validator {
            if let Err(msg) = validator.check(value) {
                errors.push(msg);
            }
        }
        errors
    }

    /// Validates every field that is currently visible.
    pub fn validate_visible(&self, fields: &[FieldDefinition], values: &FormValues) -> Vec<ValidationError> {
        fields
            .iter()
            .filter(|f| f.is_visible(values))
            .flat_map(|f| {
                self.validate_field(f, values)
                    .into_iter()
                    .map(move |m| ValidationError::new(f.name.clone(), m))
            })
            .collect()
    }
}
