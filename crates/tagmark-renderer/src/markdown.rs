//! Markdown engines for text nodes.

use std::fmt::Write;

use pulldown_cmark::{Options, Parser};

use crate::error::RenderError;
use crate::renderer::Render;

/// Converts the markdown of a text node into markup.
///
/// The engine writes its output through `render`; it may also hand nodes back
/// to `render` to continue the traversal.
pub trait MarkdownEngine: Send + Sync {
    fn convert(&self, text: &str, render: &mut Render<'_>) -> Result<(), RenderError>;
}

impl<F> MarkdownEngine for F
where
    F: Fn(&str, &mut Render<'_>) -> Result<(), RenderError> + Send + Sync,
{
    fn convert(&self, text: &str, render: &mut Render<'_>) -> Result<(), RenderError> {
        self(text, render)
    }
}

/// `CommonMark` engine backed by pulldown-cmark.
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use tagmark_renderer::{CommonMark, RenderOptions, Renderer, parse};
///
/// let renderer = Renderer::new(RenderOptions::new().with_markdown_engine(CommonMark::new()));
/// let nodes = parse("**bold**").unwrap();
/// let html = renderer.render_to_string(&nodes, &Value::Null).unwrap();
/// assert_eq!(html, "<p><strong>bold</strong></p>\n");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CommonMark {
    options: Options,
}

impl Default for CommonMark {
    fn default() -> Self {
        Self::new()
    }
}

impl CommonMark {
    /// Create an engine with tables and strikethrough enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }

    /// Create an engine with explicit pulldown-cmark options.
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }
}

impl MarkdownEngine for CommonMark {
    fn convert(&self, text: &str, render: &mut Render<'_>) -> Result<(), RenderError> {
        let mut html = String::with_capacity(text.len() + text.len() / 2);
        pulldown_cmark::html::push_html(&mut html, Parser::new_ext(text, self.options));
        render.write_str(&html)?;
        Ok(())
    }
}

/// Engine that writes text unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Verbatim;

impl MarkdownEngine for Verbatim {
    fn convert(&self, text: &str, render: &mut Render<'_>) -> Result<(), RenderError> {
        render.write_str(text)?;
        Ok(())
    }
}
