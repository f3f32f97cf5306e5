use crate::error::FormError;
use crate::schema::{FieldDefinition, FieldKind};
use crate::std_renderers;
use crate::traits::{ElementRenderer, FieldWrapper, PageRenderer, ProgressRenderer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Kind aliases, e.g. `phone: text`, loaded from configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TypeMappingConfig {
    pub mappings: HashMap<String, String>,
}

pub struct TypeRegistry {
    /// Maps kinds (e.g. "phone") to the kind whose renderer they borrow (e.g. "text")
    mapping: HashMap<FieldKind, FieldKind>,
    /// Maps kinds to actual renderers
    element_renderers: HashMap<FieldKind, Arc<dyn ElementRenderer>>,
    /// Maps page renderer names to implementations
    page_renderers: HashMap<String, Arc<dyn PageRenderer>>,
    progress_renderers: HashMap<String, Arc<dyn ProgressRenderer>>,
    wrappers: HashMap<String, Arc<dyn FieldWrapper>>,
    fallback: Arc<dyn ElementRenderer>,
    default_page: Arc<dyn PageRenderer>,
    default_progress: Arc<dyn ProgressRenderer>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Empty registry; every kind resolves to the plain-text renderer.
    pub fn new() -> Self {
        Self {
            mapping: HashMap::new(),
            element_renderers: HashMap::new(),
            page_renderers: HashMap::new(),
            progress_renderers: HashMap::new(),
            wrappers: HashMap::new(),
            fallback: Arc::new(std_renderers::TextInputRenderer),
            default_page: Arc::new(std_renderers::DefaultPageRenderer),
            default_progress: Arc::new(std_renderers::DefaultProgressRenderer),
        }
    }

    /// Registry with a default renderer for every built-in kind.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        std_renderers::register_standard_renderers(&mut registry);
        registry
    }

    pub fn load_from_config(&mut self, config: TypeMappingConfig) {
        for (alias, target) in config.mappings {
            self.mapping.insert(FieldKind::from(alias), FieldKind::from(target));
        }
    }

    /// Registers `renderer` for `kind`. The last registration for a kind wins.
    pub fn register_element_renderer(
        &mut self,
        kind: impl Into<FieldKind>,
        renderer: Arc<dyn ElementRenderer>,
    ) -> Result<(), FormError> {
        let kind = kind.into();
        if let FieldKind::Custom(name) = &kind {
            if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
                return Err(FormError::InvalidKind(name.clone()));
            }
        }
        if self.element_renderers.insert(kind.clone(), renderer).is_some() {
            log::debug!("Renderer for kind '{}' replaced", kind);
        }
        Ok(())
    }

    /// Registers `renderer` for every kind it reports through `ElementRenderer::kinds`.
    pub fn register(&mut self, renderer: Arc<dyn ElementRenderer>) -> Result<(), FormError> {
        for kind in renderer.kinds() {
            self.register_element_renderer(kind, renderer.clone())?;
        }
        Ok(())
    }

    pub fn is_registered(&self, kind: &FieldKind) -> bool {
        self.element_renderers.contains_key(kind)
    }

    /// Registered renderer for `kind`, else the renderer of its alias,
    /// else the plain-text renderer.
    pub fn resolve_renderer(&self, kind: &FieldKind) -> Arc<dyn ElementRenderer> {
        if let Some(renderer) = self.element_renderers.get(kind) {
            return renderer.clone();
        }
        if let Some(renderer) = self.mapping.get(kind).and_then(|target| self.element_renderers.get(target)) {
            return renderer.clone();
        }
        log::debug!("No renderer for kind '{}', falling back to text input", kind);
        self.fallback.clone()
    }

    /// A field's explicit `component` takes precedence over its kind.
    pub fn resolve_field_renderer(&self, field: &FieldDefinition) -> Arc<dyn ElementRenderer> {
        if let Some(component) = &field.component {
            let kind = FieldKind::from(component.as_str());
            if let Some(renderer) = self.element_renderers.get(&kind) {
                return renderer.clone();
            }
            log::warn!("Component '{}' for field '{}' is not registered", component, field.name);
        }
        self.resolve_renderer(&field.kind)
    }

    pub fn register_page_renderer(&mut self, name: &str, renderer: Arc<dyn PageRenderer>) {
        self.page_renderers.insert(name.to_string(), renderer);
    }

    pub fn resolve_page_renderer(&self, name: Option<&str>) -> Arc<dyn PageRenderer> {
        match name {
            Some(name) => self.page_renderers.get(name).cloned().unwrap_or_else(|| {
                log::warn!("Page renderer '{}' is not registered, using default layout", name);
                self.default_page.clone()
            }),
            None => self.default_page.clone(),
        }
    }

    pub fn register_wrapper(&mut self, name: &str, wrapper: Arc<dyn FieldWrapper>) {
        self.wrappers.insert(name.to_string(), wrapper);
    }

    /// The field's own wrapper, else the form-wide one. Unregistered names
    /// leave the field unwrapped.
    pub fn resolve_wrapper(
        &self,
        field: &FieldDefinition,
        form_wrapper: Option<&str>,
    ) -> Option<Arc<dyn FieldWrapper>> {
        let name = field.wrapper.as_deref().or(form_wrapper)?;
        let wrapper = self.wrappers.get(name).cloned();
        if wrapper.is_none() {
            log::warn!("Wrapper '{}' for field '{}' is not registered", name, field.name);
        }
        wrapper
    }

    pub fn register_progress_renderer(&mut self, name: &str, renderer: Arc<dyn ProgressRenderer>) {
        self.progress_renderers.insert(name.to_string(), renderer);
    }

    pub fn resolve_progress_renderer(&self, name: Option<&str>) -> Arc<dyn ProgressRenderer> {
        name.and_then(|n| self.progress_renderers.get(n).cloned())
            .unwrap_or_else(|| self.default_progress.clone())
    }
}
