use crate::validation::ValidationError;
use crate::values::FormValues;
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMeta {
    pub touched: bool,
    pub errors: Vec<String>,
}

impl FieldMeta {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Mutable state owned by exactly one engine instance.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub(crate) values: FormValues,
    pub(crate) field_meta: HashMap<String, FieldMeta>,
    pub(crate) current_page_index: usize,
    pub(crate) is_submitting: bool,
    pub(crate) schema_errors: Vec<ValidationError>,
}

impl FormState {
    pub(crate) fn new(values: FormValues) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn field_meta(&self, name: &str) -> Option<&FieldMeta> {
        self.field_meta.get(name)
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn schema_errors(&self) -> &[ValidationError] {
        &self.schema_errors
    }

    pub(crate) fn meta_mut(&mut self, name: &str) -> &mut FieldMeta {
        self.field_meta.entry(name.to_string()).or_default()
    }

    /// Field errors plus any whole-form errors that name the field.
    pub fn errors_for(&self, name: &str) -> Vec<String> {
        let mut errors = self
            .field_meta
            .get(name)
            .map(|m| m.errors.clone())
            .unwrap_or_default();
        for e in self.schema_errors.iter().filter(|e| e.field == name) {
            if !errors.contains(&e.message) {
                errors.push(e.message.clone());
            }
        }
        errors
    }
}
