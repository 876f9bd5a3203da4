//! Tree-to-stream rendering with component dispatch.

use std::fmt;

use serde_json::Value;

use crate::component::{Component, Components, DefaultComponent, Props};
use crate::error::RenderError;
use crate::interpolate::{Interpolator, PathInterpolator};
use crate::markdown::MarkdownEngine;
use crate::node::Node;
use crate::parser::parse;

static NULL: Value = Value::Null;

/// Default limit on node nesting during a render pass.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Something the renderer can write.
///
/// Conversions exist for node references, node slices, markup strings, JSON
/// values and `Option`s of those, so components can pass most things straight
/// to [`Render::render`].
#[derive(Clone, Copy, Debug)]
pub enum Fragment<'a> {
    /// Nothing to write.
    Absent,
    /// Markup appended to the output unchanged.
    Markup(&'a str),
    Node(&'a Node),
    Nodes(&'a [Node]),
    /// A JSON value: `null` is absent, strings are markup, arrays are
    /// rendered item by item. Anything else is rejected.
    Value(&'a Value),
}

impl<'a> From<&'a str> for Fragment<'a> {
    fn from(markup: &'a str) -> Self {
        Self::Markup(markup)
    }
}

impl<'a> From<&'a String> for Fragment<'a> {
    fn from(markup: &'a String) -> Self {
        Self::Markup(markup)
    }
}

impl<'a> From<&'a Node> for Fragment<'a> {
    fn from(node: &'a Node) -> Self {
        Self::Node(node)
    }
}

impl<'a> From<&'a [Node]> for Fragment<'a> {
    fn from(nodes: &'a [Node]) -> Self {
        Self::Nodes(nodes)
    }
}

impl<'a> From<&'a Vec<Node>> for Fragment<'a> {
    fn from(nodes: &'a Vec<Node>) -> Self {
        Self::Nodes(nodes)
    }
}

impl<'a> From<&'a Value> for Fragment<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Value(value)
    }
}

impl<'a, T: Into<Fragment<'a>>> From<Option<T>> for Fragment<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// Configuration for a [`Renderer`].
///
/// | field | default |
/// |---|---|
/// | `components` | empty |
/// | `markdown_engine` | none; required once a text node is rendered |
/// | `default_component` | [`DefaultComponent`] |
/// | `interpolator` | [`PathInterpolator`] |
/// | `max_depth` | [`DEFAULT_MAX_DEPTH`] |
#[derive(Default)]
pub struct RenderOptions {
    pub components: Components,
    pub markdown_engine: Option<Box<dyn MarkdownEngine>>,
    pub default_component: Option<Box<dyn Component>>,
    pub interpolator: Option<Box<dyn Interpolator>>,
    pub max_depth: Option<usize>,
}

impl RenderOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the component registry.
    #[must_use]
    pub fn with_components(mut self, components: Components) -> Self {
        self.components = components;
        self
    }

    /// Register a closure component for `name`.
    #[must_use]
    pub fn with_component<F>(mut self, name: &str, component: F) -> Self
    where
        F: Fn(&Props<'_>, &mut Render<'_>) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        self.components.insert(name, Box::new(component));
        self
    }

    /// Set the markdown engine.
    #[must_use]
    pub fn with_markdown_engine<E: MarkdownEngine + 'static>(mut self, engine: E) -> Self {
        self.markdown_engine = Some(Box::new(engine));
        self
    }

    /// Set a closure as the markdown engine.
    #[must_use]
    pub fn with_markdown<F>(self, engine: F) -> Self
    where
        F: Fn(&str, &mut Render<'_>) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        self.with_markdown_engine(engine)
    }

    /// Override the component used for unregistered tags.
    #[must_use]
    pub fn with_default_component<C: Component + 'static>(mut self, component: C) -> Self {
        self.default_component = Some(Box::new(component));
        self
    }

    /// Override context reference resolution.
    #[must_use]
    pub fn with_interpolator<I: Interpolator + 'static>(mut self, interpolator: I) -> Self {
        self.interpolator = Some(Box::new(interpolator));
        self
    }

    /// Limit how deeply nodes may nest before rendering fails.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("components", &self.components)
            .field("markdown_engine", &self.markdown_engine.is_some())
            .field("default_component", &self.default_component.is_some())
            .field("interpolator", &self.interpolator.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Renders node trees into a string sink.
///
/// Traversal is depth-first and synchronous: output appears in call order.
/// A renderer holds no per-pass state and can be reused and shared between
/// threads; each pass needs its own output.
///
/// Every nesting level recurses through the component that renders it, so
/// the pass fails with [`RenderError::DepthLimitExceeded`] once nodes nest
/// deeper than `max_depth` (default [`DEFAULT_MAX_DEPTH`]).
///
/// # Example
///
/// ```
/// use std::fmt::Write;
/// use serde_json::json;
/// use tagmark_renderer::{RenderOptions, Renderer, Verbatim, parse};
///
/// let renderer = Renderer::new(
///     RenderOptions::new()
///         .with_markdown_engine(Verbatim)
///         .with_component("Greeting", |props, render| {
///             let name = props.get_str("name").unwrap_or("stranger");
///             write!(render, "<p>Hello, {name}!</p>")?;
///             Ok(())
///         }),
/// );
///
/// let nodes = parse("<Greeting name={user.first} />").unwrap();
/// let html = renderer
///     .render_to_string(&nodes, &json!({"user": {"first": "Ada"}}))
///     .unwrap();
/// assert_eq!(html, "<p>Hello, Ada!</p>");
/// ```
pub struct Renderer {
    components: Components,
    markdown_engine: Option<Box<dyn MarkdownEngine>>,
    default_component: Box<dyn Component>,
    interpolator: Box<dyn Interpolator>,
    max_depth: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Renderer {
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            components: options.components,
            markdown_engine: options.markdown_engine,
            default_component: options
                .default_component
                .unwrap_or_else(|| Box::new(DefaultComponent)),
            interpolator: options
                .interpolator
                .unwrap_or_else(|| Box::new(PathInterpolator)),
            max_depth: options.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        }
    }

    /// Render `fragment` with `context` into `out`.
    ///
    /// # Errors
    ///
    /// Fails on the first error raised anywhere in the traversal. Output
    /// written before the failure is left in `out`.
    pub fn write<'f>(
        &self,
        fragment: impl Into<Fragment<'f>>,
        context: &Value,
        out: &mut dyn fmt::Write,
    ) -> Result<(), RenderError> {
        self.write_fragment(fragment.into(), context, out, 0)
    }

    /// Render `fragment` into a new string.
    ///
    /// # Errors
    ///
    /// See [`write`](Self::write).
    pub fn render_to_string<'f>(
        &self,
        fragment: impl Into<Fragment<'f>>,
        context: &Value,
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write(fragment, context, &mut out)?;
        Ok(out)
    }

    fn write_fragment(
        &self,
        fragment: Fragment<'_>,
        context: &Value,
        out: &mut dyn fmt::Write,
        depth: usize,
    ) -> Result<(), RenderError> {
        match fragment {
            Fragment::Absent => Ok(()),
            Fragment::Markup(markup) => Ok(out.write_str(markup)?),
            Fragment::Node(node) => self.write_node(node, context, out, depth),
            Fragment::Nodes(nodes) => {
                for node in nodes {
                    self.write_node(node, context, out, depth)?;
                }
                Ok(())
            }
            Fragment::Value(value) => Self::write_value(value, out),
        }
    }

    fn write_value(value: &Value, out: &mut dyn fmt::Write) -> Result<(), RenderError> {
        match value {
            Value::Null => Ok(()),
            Value::String(markup) => Ok(out.write_str(markup)?),
            Value::Array(items) => {
                for item in items {
                    Self::write_value(item, out)?;
                }
                Ok(())
            }
            Value::Bool(_) | Value::Number(_) | Value::Object(_) => {
                Err(RenderError::UnexpectedNodeShape(value.to_string()))
            }
        }
    }

    fn write_node(
        &self,
        node: &Node,
        context: &Value,
        out: &mut dyn fmt::Write,
        depth: usize,
    ) -> Result<(), RenderError> {
        if depth >= self.max_depth {
            return Err(RenderError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }
        let mut render = Render {
            renderer: self,
            context,
            out,
            depth: depth + 1,
        };

        match node {
            Node::Text(text) => {
                let engine = self
                    .markdown_engine
                    .as_deref()
                    .ok_or(RenderError::MissingMarkdownEngine)?;
                engine.convert(&text.data, &mut render)
            }
            Node::Element(element) => {
                let component = self.components.lookup(&element.name).unwrap_or_else(|| {
                    tracing::trace!(tag = %element.name, "No component registered, using default");
                    self.default_component.as_ref()
                });
                let props = Props::resolve(element, context, self.interpolator.as_ref());
                component.render(&props, &mut render)
            }
        }
    }
}

/// Handle given to components and markdown engines to continue rendering.
///
/// Strings passed to [`render`](Self::render) are appended as-is; nodes are
/// rendered with the context and output of the current pass. The handle also
/// implements [`fmt::Write`], so `write!` appends formatted markup.
pub struct Render<'a> {
    renderer: &'a Renderer,
    context: &'a Value,
    out: &'a mut dyn fmt::Write,
    depth: usize,
}

impl Render<'_> {
    /// Render a fragment with the current context.
    ///
    /// # Errors
    ///
    /// Propagates any error from the nested traversal.
    pub fn render<'f>(&mut self, fragment: impl Into<Fragment<'f>>) -> Result<(), RenderError> {
        self.renderer
            .write_fragment(fragment.into(), self.context, &mut *self.out, self.depth)
    }

    /// Render a fragment with a different context.
    ///
    /// # Errors
    ///
    /// Propagates any error from the nested traversal.
    pub fn render_with_context<'f>(
        &mut self,
        fragment: impl Into<Fragment<'f>>,
        context: &Value,
    ) -> Result<(), RenderError> {
        self.renderer
            .write_fragment(fragment.into(), context, &mut *self.out, self.depth)
    }

    /// Context of the current pass.
    #[must_use]
    pub fn context(&self) -> &Value {
        self.context
    }
}

impl fmt::Write for Render<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.out.write_str(s)
    }
}

/// Render `root` with a renderer built from `options`.
///
/// # Errors
///
/// See [`Renderer::write`].
pub fn render<'f>(
    root: impl Into<Fragment<'f>>,
    context: &Value,
    out: &mut dyn fmt::Write,
    options: RenderOptions,
) -> Result<(), RenderError> {
    Renderer::new(options).write(root, context, out)
}

/// Arguments for [`to_html`].
pub struct ToHtml<'a> {
    pub input: &'a str,
    pub components: Components,
    pub markdown_engine: Option<Box<dyn MarkdownEngine>>,
    pub context: &'a Value,
}

impl Default for ToHtml<'_> {
    fn default() -> Self {
        Self {
            input: "",
            components: Components::default(),
            markdown_engine: None,
            context: &NULL,
        }
    }
}

/// Parse `input` and render it to a string in one step.
///
/// # Errors
///
/// Returns [`RenderError::Parse`] for malformed input and any error raised
/// while rendering.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tagmark_renderer::{CommonMark, ToHtml, to_html};
///
/// let context = json!({"page": {"title": "Intro"}});
/// let html = to_html(ToHtml {
///     input: r#"<header title={page.title}></header>"#,
///     markdown_engine: Some(Box::new(CommonMark::new())),
///     context: &context,
///     ..ToHtml::default()
/// })
/// .unwrap();
/// assert_eq!(html, r#"<header title="Intro"></header>"#);
/// ```
pub fn to_html(args: ToHtml<'_>) -> Result<String, RenderError> {
    let nodes = parse(args.input)?;
    let renderer = Renderer::new(RenderOptions {
        components: args.components,
        markdown_engine: args.markdown_engine,
        ..RenderOptions::default()
    });
    renderer.render_to_string(&nodes, args.context)
}
