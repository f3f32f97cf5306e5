use crate::engine::{FieldEvent, FormEngine};
use crate::schema::FieldDefinition;
use crate::std_renderers::escape_html;
use crate::traits::{FieldRenderContext, PageRenderContext, ProgressView};
use anyhow::{Context, Result};
use serde_json::Value;
use std::cell::RefCell;

type EventQueue = RefCell<Vec<FieldEvent>>;

impl FormEngine {
    /// Renders the whole form: progress, the current page and navigation.
    ///
    /// Renderers run in immediate mode: `on_change`/`on_blur` calls made
    /// while rendering are queued and applied once the pass is complete, so
    /// the next render reflects them.
    pub fn render(&mut self) -> Result<String> {
        let queue = EventQueue::default();
        let html = self.render_form(&queue)?;
        self.apply_events(queue.into_inner())?;
        Ok(html)
    }

    /// Renders only the current page's layout with its visible fields.
    pub fn render_current_page(&mut self) -> Result<String> {
        let queue = EventQueue::default();
        let html = self.render_page(&queue)?;
        self.apply_events(queue.into_inner())?;
        Ok(html)
    }

    fn render_form(&self, queue: &EventQueue) -> Result<String> {
        let mut content = String::new();
        if let Some(progress) = self.render_progress()? {
            content.push_str(&progress);
        }
        content.push_str(&self.render_page(queue)?);
        content.push_str(&self.render_navigation());

        let classes = self.definition.classes.as_deref().unwrap_or_default();
        Ok(format!(
            r#"<form id="{}" class="{}" method="post">{}</form>"#,
            escape_html(&self.definition.id),
            escape_html(classes),
            content
        ))
    }

    fn render_page(&self, queue: &EventQueue) -> Result<String> {
        let page = self.current_page();
        let page_def = self.definition.page(page);

        let fields = self
            .visible_fields()
            .into_iter()
            .map(|f| self.render_field(f, queue))
            .collect::<Result<Vec<_>>>()?;

        let renderer = self
            .registry
            .resolve_page_renderer(page_def.and_then(|p| p.component.as_deref()));
        let ctx = PageRenderContext {
            page,
            total_pages: self.total_pages(),
            title: page_def.and_then(|p| p.title.as_deref()),
            description: page_def.and_then(|p| p.description.as_deref()),
        };
        renderer
            .render(&ctx, &fields)
            .with_context(|| format!("Failed to render page {}", page))
    }

    fn render_field(&self, field: &FieldDefinition, queue: &EventQueue) -> Result<String> {
        let renderer = self.registry.resolve_field_renderer(field);
        let errors = self.state.errors_for(&field.name);
        let touched = self.state.field_meta(&field.name).map_or(false, |m| m.touched);

        let on_change = |value: Value| {
            queue.borrow_mut().push(FieldEvent::Change {
                name: field.name.clone(),
                value,
            })
        };
        let on_blur = || {
            queue.borrow_mut().push(FieldEvent::Blur {
                name: field.name.clone(),
            })
        };

        let ctx = FieldRenderContext {
            value: self.state.values.get(&field.name),
            errors: &errors,
            touched,
            is_submitting: self.state.is_submitting,
            on_change: &on_change,
            on_blur: &on_blur,
            wrapper_classes: self.definition.field_classes.as_deref(),
        };
        let html = renderer
            .render(field, &ctx)
            .with_context(|| format!("Failed to render field '{}'", field.name))?;

        match self.registry.resolve_wrapper(field, self.definition.wrapper.as_deref()) {
            Some(wrapper) => wrapper
                .wrap(field, &html)
                .with_context(|| format!("Failed to wrap field '{}'", field.name)),
            None => Ok(html),
        }
    }

    fn render_progress(&self) -> Result<Option<String>> {
        let config = match &self.definition.progress {
            Some(config) if self.pages.has_pages() => config,
            _ => return Ok(None),
        };
        let view = ProgressView {
            value: self.progress(),
            current_page: self.current_page_index() + 1,
            total_pages: self.total_pages(),
            config,
        };
        let renderer = self.registry.resolve_progress_renderer(config.component.as_deref());
        Ok(Some(renderer.render(&view)?))
    }

    fn render_navigation(&self) -> String {
        let last = self.is_last_page();
        let submitting = self.is_submitting();
        let label = if submitting && last {
            "Submitting..."
        } else if last {
            self.definition.submit_label.as_str()
        } else {
            self.definition.next_label.as_str()
        };
        let disabled = if last && (!self.can_submit() || submitting) {
            " disabled"
        } else {
            ""
        };
        let primary = format!(r#"<button type="submit"{}>{}</button>"#, disabled, escape_html(label));

        if !self.pages.has_pages() {
            return format!(r#"<div class="form-navigation">{}</div>"#, primary);
        }

        let (prev_disabled, prev_class) = if self.is_first_page() {
            (" disabled", " invisible")
        } else {
            ("", "")
        };
        format!(
            r#"<div class="form-navigation"><button type="button" class="previous{}"{}>{}</button>{}</div>"#,
            prev_class,
            prev_disabled,
            escape_html(&self.definition.previous_label),
            primary
        )
    }
}
