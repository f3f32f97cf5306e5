use crate::error::{ConfigError, FormError};
use crate::validation::{FieldValidator, RuleSchema, ValidationRule};
use crate::values::{is_blank_value, FormValues};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A collection of forms loaded from one configuration file.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ModuleSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub forms: Vec<FormDefinition>,
}

impl ModuleSchema {
    /// Loads a module from a `.yaml`, `.yml` or `.json` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FormError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()).into());
        }
        let raw = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        let module = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            Some("json") => serde_json::from_str::<Self>(&raw)
                .map_err(ConfigError::from)?
                .checked()?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf()).into()),
        };
        log::debug!("Loaded form module '{}' ({} forms) from {:?}", module.name, module.forms.len(), path);
        Ok(module)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, FormError> {
        let module: Self = serde_yaml::from_str(raw).map_err(ConfigError::from)?;
        module.checked()
    }

    fn checked(self) -> Result<Self, FormError> {
        for form in &self.forms {
            form.check_rules()?;
        }
        Ok(self)
    }

    pub fn form(&self, id: &str) -> Result<&FormDefinition, FormError> {
        self.forms
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| ConfigError::FormNotFound(id.to_string(), self.name.clone()).into())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub pages: Vec<PageDefinition>,
    #[serde(default)]
    pub progress: Option<ProgressConfig>,
    /// Whole-form rules, evaluated on every change.
    #[serde(default)]
    pub schema: Option<RuleSchema>,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
    #[serde(default = "default_next_label")]
    pub next_label: String,
    #[serde(default = "default_previous_label")]
    pub previous_label: String,
    #[serde(default)]
    pub classes: Option<String>,
    #[serde(default)]
    pub field_classes: Option<String>,
    /// Registered wrapper applied to every field without its own.
    #[serde(default)]
    pub wrapper: Option<String>,
}

fn default_submit_label() -> String {
    "Submit".to_string()
}

fn default_next_label() -> String {
    "Next".to_string()
}

fn default_previous_label() -> String {
    "Previous".to_string()
}

impl Default for FormDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            fields: Vec::new(),
            pages: Vec::new(),
            progress: None,
            schema: None,
            submit_label: default_submit_label(),
            next_label: default_next_label(),
            previous_label: default_previous_label(),
            classes: None,
            field_classes: None,
            wrapper: None,
        }
    }
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            id: id.into(),
            fields,
            ..Default::default()
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldDefinition> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Rejects rules that can never run, such as patterns that do not compile.
    pub fn check_rules(&self) -> Result<(), FormError> {
        for field in &self.fields {
            for rule in &field.validation {
                rule.compile().map_err(|e| {
                    ConfigError::Parse(format!("form '{}', field '{}': {}", self.id, field.name, e))
                })?;
            }
        }
        if let Some(schema) = &self.schema {
            schema.compile().map_err(|(field, e)| {
                ConfigError::Parse(format!("form '{}', schema rule for '{}': {}", self.id, field, e))
            })?;
        }
        Ok(())
    }

    pub fn page(&self, page: u32) -> Option<&PageDefinition> {
        self.pages.iter().find(|p| p.page == page)
    }

    /// Attaches a visibility predicate to an already declared field.
    pub fn set_visible_when<F>(&mut self, name: &str, predicate: F) -> Result<(), FormError>
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        let field = self
            .field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        field.visible_when = Some(VisibilityPredicate::new(predicate));
        Ok(())
    }
}

/// Selects which renderer a field uses.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Password,
    Url,
    TextArea,
    Number,
    Checkbox,
    Switch,
    Select,
    Date,
    Slider,
    File,
    Custom(String),
}

impl FieldKind {
    pub const BUILTIN: [FieldKind; 12] = [
        FieldKind::Text,
        FieldKind::Email,
        FieldKind::Password,
        FieldKind::Url,
        FieldKind::TextArea,
        FieldKind::Number,
        FieldKind::Checkbox,
        FieldKind::Switch,
        FieldKind::Select,
        FieldKind::Date,
        FieldKind::Slider,
        FieldKind::File,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Url => "url",
            FieldKind::TextArea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Switch => "switch",
            FieldKind::Select => "select",
            FieldKind::Date => "date",
            FieldKind::Slider => "slider",
            FieldKind::File => "file",
            FieldKind::Custom(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, FieldKind::Custom(_))
    }
}

impl From<&str> for FieldKind {
    fn from(name: &str) -> Self {
        match name {
            "text" => FieldKind::Text,
            "email" => FieldKind::Email,
            "password" => FieldKind::Password,
            "url" => FieldKind::Url,
            "textarea" => FieldKind::TextArea,
            "number" => FieldKind::Number,
            "checkbox" => FieldKind::Checkbox,
            "switch" => FieldKind::Switch,
            "select" => FieldKind::Select,
            "date" => FieldKind::Date,
            "slider" => FieldKind::Slider,
            "file" => FieldKind::File,
            other => FieldKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for FieldKind {
    fn from(name: String) -> Self {
        FieldKind::from(name.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure predicate over the full values snapshot deciding whether a field is shown.
#[derive(Clone)]
pub struct VisibilityPredicate(Arc<dyn Fn(&FormValues) -> bool + Send + Sync>);

impl VisibilityPredicate {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    pub fn evaluate(&self, values: &FormValues) -> bool {
        (self.0)(values)
    }
}

impl fmt::Debug for VisibilityPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VisibilityPredicate(..)")
    }
}

/// Declarative visibility condition, usable from configuration files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    NotEmpty { field: String },
    Empty { field: String },
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    IsTrue { field: String },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
}

impl Condition {
    pub fn evaluate(&self, values: &FormValues) -> bool {
        match self {
            Condition::NotEmpty { field } => !is_blank_value(values.get(field)),
            Condition::Empty { field } => is_blank_value(values.get(field)),
            Condition::Equals { field, value } => values.get(field) == Some(value),
            Condition::NotEquals { field, value } => values.get(field) != Some(value),
            Condition::IsTrue { field } => values.flag(field),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(values)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(values)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default, alias = "type")]
    pub kind: FieldKind,
    /// Navigation page; unset (or 0) means the first page.
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Registered kind name whose renderer overrides the one for `kind`.
    #[serde(default)]
    pub component: Option<String>,
    /// Registered wrapper placed around the rendered field.
    #[serde(default)]
    pub wrapper: Option<String>,
    #[serde(default)]
    pub validation: Vec<ValidationRule>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(skip)]
    pub visible_when: Option<VisibilityPredicate>,
    #[serde(skip)]
    pub validator: Option<FieldValidator>,
    /// Kind-specific options (choices, bounds, accept, ...).
    #[serde(default)]
    pub props: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub classes: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.wrapper = Some(wrapper.into());
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation.push(rule);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn visible_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FormValues) -> bool + Send + Sync + 'static,
    {
        self.visible_when = Some(VisibilityPredicate::new(predicate));
        self
    }

    pub fn validate_with<F>(mut self, validator: F) -> Self
    where
        F: Fn(Option<&Value>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(FieldValidator::new(validator));
        self
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn page_number(&self) -> u32 {
        match self.page {
            Some(p) if p > 0 => p,
            _ => 1,
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Both the declarative condition and the closure predicate must pass.
    /// A panicking predicate is not caught.
    pub fn is_visible(&self, values: &FormValues) -> bool {
        self.condition.as_ref().map_or(true, |c| c.evaluate(values))
            && self.visible_when.as_ref().map_or(true, |p| p.evaluate(values))
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn prop_f64(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_f64)
    }

    pub fn options(&self) -> Vec<String> {
        self.props
            .get("options")
            .and_then(Value::as_array)
            .map(|opts| {
                opts.iter()
                    .map(|o| match o {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PageDefinition {
    pub page: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Name of a registered page renderer.
    #[serde(default)]
    pub component: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProgressConfig {
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default = "default_true")]
    pub show_steps: bool,
    #[serde(default = "default_true")]
    pub show_percentage: bool,
    #[serde(default)]
    pub classes: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            component: None,
            show_steps: true,
            show_percentage: true,
            classes: None,
        }
    }
}
