//! Default HTML renderers for the built-in field kinds, the default page
//! layout and the default progress indicator.

use crate::registry::TypeRegistry;
use crate::schema::{FieldDefinition, FieldKind};
use crate::traits::{
    ElementRenderer, FieldRenderContext, PageRenderContext, PageRenderer, ProgressRenderer,
    ProgressView,
};
use anyhow::{Error, Result};
use serde_json::Value;
use std::sync::Arc;

pub fn register_standard_renderers(registry: &mut TypeRegistry) {
    let renderers: Vec<Arc<dyn ElementRenderer>> = vec![
        Arc::new(TextInputRenderer),
        Arc::new(TextAreaRenderer),
        Arc::new(NumberInputRenderer),
        Arc::new(CheckboxRenderer),
        Arc::new(SelectRenderer),
        Arc::new(DateInputRenderer),
        Arc::new(SliderRenderer),
        Arc::new(FileUploadRenderer),
    ];
    for renderer in renderers {
        registry
            .register(renderer)
            .expect("built-in kinds are valid");
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn disabled_attr(ctx: &FieldRenderContext) -> &'static str {
    if ctx.is_submitting {
        " disabled"
    } else {
        ""
    }
}

fn optional_attr(name: &str, value: Option<String>) -> String {
    value
        .map(|v| format!(r#" {}="{}""#, name, escape_html(&v)))
        .unwrap_or_default()
}

/// Label, description, control and, once touched, the inline error list.
fn wrap(field: &FieldDefinition, ctx: &FieldRenderContext, label_suffix: &str, control: &str) -> String {
    let name = escape_html(&field.name);
    let mut out = format!(
        r#"<div class="form-group {}">"#,
        escape_html(ctx.wrapper_classes.unwrap_or_default())
    );
    if let Some(label) = &field.label {
        out.push_str(&format!(
            r#"<label for="{}">{}{}</label>"#,
            name,
            escape_html(label),
            escape_html(label_suffix)
        ));
    }
    if let Some(description) = &field.description {
        out.push_str(&format!(r#"<p class="form-description">{}</p>"#, escape_html(description)));
    }
    out.push_str(control);
    if ctx.touched && !ctx.errors.is_empty() {
        out.push_str(r#"<div class="form-errors">"#);
        for error in ctx.errors {
            out.push_str(&format!(r#"<p class="form-error">{}</p>"#, escape_html(error)));
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

pub struct TextInputRenderer;

impl ElementRenderer for TextInputRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Text, FieldKind::Email, FieldKind::Password, FieldKind::Url]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let input_type = match field.kind {
            FieldKind::Email | FieldKind::Password | FieldKind::Url => field.kind.as_str(),
            _ => "text",
        };
        let name = escape_html(&field.name);
        let control = format!(
            r#"<input type="{}" id="{}" name="{}" value="{}" class="form-control"{}{} />"#,
            input_type,
            name,
            name,
            escape_html(&value_text(ctx.value)),
            optional_attr("placeholder", field.placeholder.clone()),
            disabled_attr(ctx)
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

pub struct TextAreaRenderer;

impl ElementRenderer for TextAreaRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::TextArea]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let name = escape_html(&field.name);
        let control = format!(
            r#"<textarea id="{}" name="{}" class="form-control"{}{}{}>{}</textarea>"#,
            name,
            name,
            optional_attr("placeholder", field.placeholder.clone()),
            optional_attr("rows", field.prop("rows").map(|r| r.to_string())),
            disabled_attr(ctx),
            escape_html(&value_text(ctx.value))
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

pub struct NumberInputRenderer;

impl ElementRenderer for NumberInputRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Number]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let name = escape_html(&field.name);
        let control = format!(
            r#"<input type="number" id="{}" name="{}" value="{}" class="form-control"{}{}{}{}{} />"#,
            name,
            name,
            escape_html(&value_text(ctx.value)),
            optional_attr("min", field.prop_f64("min").map(|v| v.to_string())),
            optional_attr("max", field.prop_f64("max").map(|v| v.to_string())),
            optional_attr("step", field.prop_f64("step").map(|v| v.to_string())),
            optional_attr("placeholder", field.placeholder.clone()),
            disabled_attr(ctx)
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

/// Checkbox and switch; a switch is a checkbox with `role="switch"`.
pub struct CheckboxRenderer;

impl ElementRenderer for CheckboxRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Checkbox, FieldKind::Switch]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let name = escape_html(&field.name);
        let checked = ctx.value.and_then(Value::as_bool).unwrap_or(false);
        let role = if field.kind == FieldKind::Switch {
            r#" role="switch""#
        } else {
            ""
        };
        let control = format!(
            r#"<input type="checkbox" id="{}" name="{}"{}{}{} />"#,
            name,
            name,
            role,
            if checked { " checked" } else { "" },
            disabled_attr(ctx)
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

pub struct SelectRenderer;

impl ElementRenderer for SelectRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Select]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let name = escape_html(&field.name);
        let current = value_text(ctx.value);
        let mut options = String::new();
        if let Some(placeholder) = &field.placeholder {
            options.push_str(&format!(r#"<option value="">{}</option>"#, escape_html(placeholder)));
        }
        for option in field.options() {
            let selected = if option == current { " selected" } else { "" };
            options.push_str(&format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_html(&option),
                selected,
                escape_html(&option)
            ));
        }
        let control = format!(
            r#"<select id="{}" name="{}" class="form-control"{}>{}</select>"#,
            name,
            name,
            disabled_attr(ctx),
            options
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

pub struct DateInputRenderer;

impl ElementRenderer for DateInputRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Date]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let name = escape_html(&field.name);
        let control = format!(
            r#"<input type="date" id="{}" name="{}" value="{}" class="form-control"{} />"#,
            name,
            name,
            escape_html(&value_text(ctx.value)),
            disabled_attr(ctx)
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

/// Numeric range. An unset value displays as `min`.
pub struct SliderRenderer;

impl ElementRenderer for SliderRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::Slider]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let min = field.prop_f64("min").unwrap_or(0.0);
        let max = field.prop_f64("max").unwrap_or(100.0);
        let step = field.prop_f64("step").unwrap_or(1.0);
        let precision = field.prop("precision").and_then(Value::as_u64).unwrap_or(0) as usize;
        let prefix = field.prop("prefix").and_then(Value::as_str).unwrap_or_default();
        let suffix = field.prop("suffix").and_then(Value::as_str).unwrap_or_default();

        let value = ctx.value.and_then(Value::as_f64).unwrap_or(min);
        let display = format!(" ({}{:.*}{})", prefix, precision, value, suffix);

        let name = escape_html(&field.name);
        let control = format!(
            r#"<input type="range" id="{}" name="{}" value="{}" min="{}" max="{}" step="{}" class="form-control"{} />"#,
            name,
            name,
            value,
            min,
            max,
            step,
            disabled_attr(ctx)
        );
        Ok(wrap(field, ctx, &display, &control))
    }
}

pub struct FileUploadRenderer;

impl ElementRenderer for FileUploadRenderer {
    fn kinds(&self) -> Vec<FieldKind> {
        vec![FieldKind::File]
    }

    fn render(&self, field: &FieldDefinition, ctx: &FieldRenderContext) -> Result<String, Error> {
        let name = escape_html(&field.name);
        let multiple = field.prop("multiple").and_then(Value::as_bool).unwrap_or(false);
        let control = format!(
            r#"<input type="file" id="{}" name="{}" class="form-control"{}{}{} />"#,
            name,
            name,
            optional_attr("accept", field.prop("accept").and_then(Value::as_str).map(str::to_string)),
            if multiple { " multiple" } else { "" },
            disabled_attr(ctx)
        );
        Ok(wrap(field, ctx, "", &control))
    }
}

pub struct DefaultPageRenderer;

impl PageRenderer for DefaultPageRenderer {
    fn render(&self, page: &PageRenderContext, fields: &[String]) -> Result<String, Error> {
        let mut out = format!(r#"<section class="form-page" data-page="{}">"#, page.page);
        if page.title.is_some() || page.description.is_some() {
            out.push_str(r#"<header class="form-page-header">"#);
            if let Some(title) = page.title {
                out.push_str(&format!("<h3>{}</h3>", escape_html(title)));
            }
            if let Some(description) = page.description {
                out.push_str(&format!("<p>{}</p>", escape_html(description)));
            }
            out.push_str("</header>");
        }
        out.push_str(r#"<div class="form-fields">"#);
        for field in fields {
            out.push_str(field);
        }
        out.push_str("</div></section>");
        Ok(out)
    }
}

pub struct DefaultProgressRenderer;

impl ProgressRenderer for DefaultProgressRenderer {
    fn render(&self, progress: &ProgressView) -> Result<String, Error> {
        let classes = progress.config.classes.as_deref().unwrap_or_default();
        let mut out = format!(r#"<div class="form-progress {}">"#, escape_html(classes));
        if progress.config.show_steps {
            out.push_str(&format!(
                "<span>Step {} of {}</span>",
                progress.current_page, progress.total_pages
            ));
        }
        if progress.config.show_percentage {
            out.push_str(&format!("<span>{}%</span>", progress.value.round()));
        }
        out.push_str(&format!(
            r#"<progress value="{}" max="100"></progress></div>"#,
            progress.value
        ));
        Ok(out)
    }
}
