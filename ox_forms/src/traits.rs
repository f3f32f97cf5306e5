use crate::schema::{FieldDefinition, FieldKind, ProgressConfig};
use anyhow::Error;
use serde_json::Value;

/// Everything a field renderer is allowed to see for one field.
pub struct FieldRenderContext<'a> {
    pub value: Option<&'a Value>,
    pub errors: &'a [String],
    pub touched: bool,
    /// Renderers must disable interaction while this is set.
    pub is_submitting: bool,
    /// Must be called with the new raw value on every user edit.
    pub on_change: &'a dyn Fn(Value),
    /// Must be called on focus loss.
    pub on_blur: &'a dyn Fn(),
    pub wrapper_classes: Option<&'a str>,
}

pub trait ElementRenderer: Send + Sync {
    /// Kinds this renderer handles when registered with `TypeRegistry::register`.
    fn kinds(&self) -> Vec<FieldKind> {
        Vec::new()
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error>;
}

/// Decorates a field's rendered markup, e.g. with a card or a grid cell.
pub trait FieldWrapper: Send + Sync {
    fn wrap(&self, field: &FieldDefinition, inner: &str) -> Result<String, Error>;
}

pub struct PageRenderContext<'a> {
    pub page: u32,
    pub total_pages: usize,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
}

pub trait PageRenderer: Send + Sync {
    /// `fields` holds the rendered fragments of the visible fields, in declaration order.
    fn render(&self, page: &PageRenderContext, fields: &[String]) -> Result<String, Error>;
}

pub struct ProgressView<'a> {
    pub value: f64,
    /// 1-based position among the pages.
    pub current_page: usize,
    pub total_pages: usize,
    pub config: &'a ProgressConfig,
}

pub trait ProgressRenderer: Send + Sync {
    fn render(&self, progress: &ProgressView) -> Result<String, Error>;
}
