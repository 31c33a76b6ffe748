//! Rendering of parsed templates.
//!
//! The compiler walks a [`Templates`] mapping and hands every string to a
//! [`Renderer`] together with the caller's context. The default renderer is
//! [`MiniJinjaRenderer`], so placeholders look like `{{ name }}`.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::ast::{Entry, Templates};
use crate::error::Result;

/// Renders one template string against a context.
///
/// Implementations report their own failures through
/// [`ItmlError::render`](crate::ItmlError::render) so callers can get the
/// original error back.
pub trait Renderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-backed renderer.
///
/// Undefined variables render as empty strings unless the renderer was built
/// with [`strict`](Self::strict).
///
/// ```rust
/// use itml::{MiniJinjaRenderer, Renderer};
/// use serde_json::json;
///
/// let renderer = MiniJinjaRenderer::new();
/// let out = renderer.render("Hello, {{ name }}!", &json!({ "name": "World" })).unwrap();
/// assert_eq!(out, "Hello, World!");
/// ```
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// A renderer that fails on any undefined variable.
    pub fn strict() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { env }
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Mutable access for registering filters and functions.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MiniJinjaRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        let value = minijinja::Value::from_serialize(context);
        Ok(self.env.render_str(template, value)?)
    }
}

/// Renders every entry of a [`Templates`] mapping, keeping its shape.
pub struct Compiler<R = MiniJinjaRenderer> {
    renderer: R,
}

impl<R: Renderer> Compiler<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render all entries. A list renders element by element, in order.
    pub fn compile<C: Serialize>(&self, templates: &Templates, context: C) -> Result<Templates> {
        let context = serde_json::to_value(context)?;
        templates
            .iter()
            .map(|(id, entry)| -> Result<(String, Entry)> {
                let rendered = match entry {
                    Entry::Str(source) => Entry::Str(self.renderer.render(source, &context)?),
                    Entry::List(items) => Entry::List(
                        items
                            .iter()
                            .map(|item| self.renderer.render(item, &context))
                            .collect::<Result<_>>()?,
                    ),
                };
                Ok((id.clone(), rendered))
            })
            .collect()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(MiniJinjaRenderer::new())
    }
}

/// Render `templates` with the default MiniJinja renderer.
pub fn compile<C: Serialize>(templates: &Templates, context: C) -> Result<Templates> {
    Compiler::new(MiniJinjaRenderer::new()).compile(templates, context)
}
