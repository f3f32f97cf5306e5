use crate::error::FormError;
use crate::pages::{PageDirection, PageSequence};
use crate::registry::TypeRegistry;
use crate::schema::{FieldDefinition, FormDefinition};
use crate::state::{FieldMeta, FormState};
use crate::submit::{SkipReason, SubmitHandler, SubmitOutcome, SubmitPayload};
use crate::validation::{FormSchema, Validator};
use crate::values::FormValues;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub type PageChangeHook = Box<dyn FnMut(u32, PageDirection) + Send>;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldEvent {
    Change { name: String, value: Value },
    Blur { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved { page: u32, direction: PageDirection },
    /// Visible fields on the current page failed validation.
    Blocked { invalid_fields: Vec<String> },
    /// Already on the first (previous) or last (next) page.
    AtBoundary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormActionOutcome {
    Navigation(NavigationOutcome),
    Submission(SubmitOutcome),
}

pub struct FormEngineBuilder {
    definition: FormDefinition,
    registry: Option<Arc<TypeRegistry>>,
    schema: Option<Arc<dyn FormSchema>>,
    default_values: FormValues,
    on_page_change: Option<PageChangeHook>,
}

impl FormEngineBuilder {
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Overrides the rule schema declared in the definition, if any.
    pub fn schema(mut self, schema: Arc<dyn FormSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn default_values(mut self, values: FormValues) -> Self {
        self.default_values = values;
        self
    }

    pub fn on_page_change<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u32, PageDirection) + Send + 'static,
    {
        self.on_page_change = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Result<FormEngine, FormError> {
        {
            let mut seen = HashSet::new();
            for field in &self.definition.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(FormError::DuplicateField(field.name.clone()));
                }
            }
        }
        self.definition.check_rules()?;

        let mut values = FormValues::new();
        for field in &self.definition.fields {
            if let Some(default) = &field.default_value {
                values.set(field.name.clone(), default.clone());
            }
        }
        values.merge(self.default_values);

        let schema = self.schema.or_else(|| {
            self.definition
                .schema
                .clone()
                .map(|s| Arc::new(s.labelled_from(&self.definition.fields)) as Arc<dyn FormSchema>)
        });
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(TypeRegistry::with_builtins()));
        let pages = PageSequence::from_fields(&self.definition.fields);

        let mut engine = FormEngine {
            id: Uuid::new_v4(),
            definition: self.definition,
            registry,
            schema,
            pages,
            state: FormState::new(values),
            validator: Validator,
            on_page_change: self.on_page_change,
        };
        engine.run_schema();
        log::debug!(
            "[form {} {}] created with {} fields over {} pages",
            engine.definition.id,
            engine.id,
            engine.definition.fields.len(),
            engine.pages.len()
        );
        Ok(engine)
    }
}

/// Clears `is_submitting` when the handler finishes or its future is dropped.
struct SubmittingGuard<'a>(&'a mut FormState);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.is_submitting = false;
    }
}

/// Owns one form's state and drives its lifecycle: field edits,
/// visibility, page navigation and submission.
pub struct FormEngine {
    id: Uuid,
    pub(crate) definition: FormDefinition,
    pub(crate) registry: Arc<TypeRegistry>,
    schema: Option<Arc<dyn FormSchema>>,
    pub(crate) pages: PageSequence,
    pub(crate) state: FormState,
    validator: Validator,
    on_page_change: Option<PageChangeHook>,
}

impl FormEngine {
    pub fn builder(definition: FormDefinition) -> FormEngineBuilder {
        FormEngineBuilder {
            definition,
            registry: None,
            schema: None,
            default_values: FormValues::new(),
            on_page_change: None,
        }
    }

    pub fn new(definition: FormDefinition, registry: Arc<TypeRegistry>) -> Result<Self, FormError> {
        Self::builder(definition).registry(registry).build()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn field_meta(&self, name: &str) -> Option<&FieldMeta> {
        self.state.field_meta(name)
    }

    pub fn field_errors(&self, name: &str) -> Vec<String> {
        self.state.errors_for(name)
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn page_sequence(&self) -> &PageSequence {
        &self.pages
    }

    pub fn current_page(&self) -> u32 {
        self.pages.number_at(self.state.current_page_index).unwrap_or(1)
    }

    pub fn current_page_index(&self) -> usize {
        self.state.current_page_index
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn is_first_page(&self) -> bool {
        self.state.current_page_index == 0
    }

    pub fn is_last_page(&self) -> bool {
        self.state.current_page_index >= self.pages.last_index()
    }

    pub fn progress(&self) -> f64 {
        self.pages.progress(self.state.current_page_index)
    }

    fn field(&self, name: &str) -> Result<&FieldDefinition, FormError> {
        self.definition
            .field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn fields_on_page(&self, page: u32) -> impl Iterator<Item = &FieldDefinition> {
        self.definition
            .fields
            .iter()
            .filter(move |f| f.page_number() == page)
    }

    /// Fields of the active page that pass their visibility checks against
    /// the current values.
    pub fn visible_fields(&self) -> Vec<&FieldDefinition> {
        let values = &self.state.values;
        self.fields_on_page(self.current_page())
            .filter(|f| f.is_visible(values))
            .collect()
    }

    pub fn is_field_visible(&self, name: &str) -> Result<bool, FormError> {
        Ok(self.field(name)?.is_visible(&self.state.values))
    }

    /// Stores a new raw value, then re-runs the field's own rules and the
    /// whole-form schema. Hidden fields keep whatever they hold.
    pub fn set_field_value(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FormError> {
        self.field(name)?;
        self.state.values.set(name, value);
        self.revalidate_field(name)?;
        self.run_schema();
        Ok(())
    }

    /// Marks a field as touched and validates it.
    pub fn set_field_touched(&mut self, name: &str) -> Result<(), FormError> {
        self.field(name)?;
        self.state.meta_mut(name).touched = true;
        self.revalidate_field(name)
    }

    pub fn handle_event(&mut self, event: FieldEvent) -> Result<(), FormError> {
        match event {
            FieldEvent::Change { name, value } => self.set_field_value(&name, value),
            FieldEvent::Blur { name } => self.set_field_touched(&name),
        }
    }

    pub(crate) fn apply_events(&mut self, events: Vec<FieldEvent>) -> Result<(), FormError> {
        for event in events {
            self.handle_event(event)?;
        }
        Ok(())
    }

    fn revalidate_field(&mut self, name: &str) -> Result<(), FormError> {
        let errors = self.validator.validate_field(self.field(name)?, &self.state.values);
        self.state.meta_mut(name).errors = errors;
        Ok(())
    }

    fn run_schema(&mut self) {
        self.state.schema_errors = match &self.schema {
            Some(schema) => schema.validate(&self.state.values),
            None => Vec::new(),
        };
    }

    /// Whole-form schema passes and every visible field's own rules pass.
    pub fn can_submit(&self) -> bool {
        self.state.schema_errors.is_empty()
            && self
                .validator
                .validate_visible(&self.definition.fields, &self.state.values)
                .is_empty()
    }

    /// Validates exactly the visible fields of `page`, marking them touched.
    /// Returns the names of the fields that failed.
    fn validate_page(&mut self, page: u32) -> Vec<String> {
        let values = &self.state.values;
        let results: Vec<(String, Vec<String>)> = self
            .fields_on_page(page)
            .filter(|f| f.is_visible(values))
            .map(|f| (f.name.clone(), self.validator.validate_field(f, values)))
            .collect();

        let mut invalid = Vec::new();
        for (name, errors) in results {
            let schema_failed = self.state.schema_errors.iter().any(|e| e.field == name);
            if !errors.is_empty() || schema_failed {
                invalid.push(name.clone());
            }
            let meta = self.state.meta_mut(&name);
            meta.touched = true;
            meta.errors = errors;
        }
        invalid
    }

    fn notify_page_change(&mut self, direction: PageDirection) -> NavigationOutcome {
        let page = self.current_page();
        log::debug!("[form {}] moved {} to page {}", self.definition.id, direction, page);
        if let Some(hook) = self.on_page_change.as_mut() {
            hook(page, direction);
        }
        NavigationOutcome::Moved { page, direction }
    }

    pub fn go_to_next_page(&mut self) -> NavigationOutcome {
        if self.is_last_page() {
            return NavigationOutcome::AtBoundary;
        }
        let invalid_fields = self.validate_page(self.current_page());
        if !invalid_fields.is_empty() {
            log::debug!(
                "[form {}] page {} blocked by {:?}",
                self.definition.id,
                self.current_page(),
                invalid_fields
            );
            return NavigationOutcome::Blocked { invalid_fields };
        }
        self.state.current_page_index += 1;
        self.notify_page_change(PageDirection::Next)
    }

    /// Going back never validates.
    pub fn go_to_previous_page(&mut self) -> NavigationOutcome {
        if self.is_first_page() {
            return NavigationOutcome::AtBoundary;
        }
        self.state.current_page_index -= 1;
        self.notify_page_change(PageDirection::Previous)
    }

    /// Jumps straight to `page` without validation or notification.
    pub fn set_current_page(&mut self, page: u32) -> Result<(), FormError> {
        let index = self.pages.index_of(page).ok_or(FormError::UnknownPage(page))?;
        self.state.current_page_index = index;
        Ok(())
    }

    /// Starts a submission: checks the gates, flips `is_submitting` and
    /// hands out the values snapshot. Pair with `finish_submit`.
    pub fn begin_submit(&mut self) -> Result<SubmitPayload, SkipReason> {
        if self.state.is_submitting {
            return Err(SkipReason::AlreadySubmitting);
        }
        if !self.is_last_page() {
            return Err(SkipReason::NotOnLastPage);
        }
        if !self.can_submit() {
            for page in self.pages.numbers().to_vec() {
                self.validate_page(page);
            }
            return Err(SkipReason::Invalid);
        }
        self.state.is_submitting = true;
        log::info!("[form {} {}] submitting", self.definition.id, self.id);
        Ok(SubmitPayload {
            values: self.state.values.clone(),
        })
    }

    pub fn finish_submit(&mut self) {
        self.state.is_submitting = false;
    }

    /// Runs `handler` with the current values. A rejection resets
    /// `is_submitting`, keeps the values and is returned to the caller.
    /// Dropping the returned future mid-flight also resets `is_submitting`.
    pub async fn submit<H>(&mut self, handler: &H) -> Result<SubmitOutcome, FormError>
    where
        H: SubmitHandler + ?Sized,
    {
        let payload = match self.begin_submit() {
            Ok(payload) => payload,
            Err(reason) => {
                log::debug!("[form {}] submission skipped: {:?}", self.definition.id, reason);
                return Ok(SubmitOutcome::Skipped(reason));
            }
        };
        let result = {
            let _guard = SubmittingGuard(&mut self.state);
            handler.on_submit(payload).await
        };
        match result {
            Ok(()) => {
                log::info!("[form {} {}] submitted", self.definition.id, self.id);
                Ok(SubmitOutcome::Submitted)
            }
            Err(e) => {
                log::warn!("[form {} {}] submit handler failed: {:#}", self.definition.id, self.id, e);
                Err(FormError::SubmitRejected(e))
            }
        }
    }

    /// The primary form action: advance, or submit when on the last page.
    pub async fn handle_form_action<H>(&mut self, handler: &H) -> Result<FormActionOutcome, FormError>
    where
        H: SubmitHandler + ?Sized,
    {
        if self.is_last_page() {
            Ok(FormActionOutcome::Submission(self.submit(handler).await?))
        } else {
            Ok(FormActionOutcome::Navigation(self.go_to_next_page()))
        }
    }
}
