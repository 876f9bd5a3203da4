//! Components: per-tag rendering functions and their registry.

use std::collections::HashMap;
use std::fmt::Write;

use serde_json::{Number, Value};

use crate::error::RenderError;
use crate::interpolate::Interpolator;
use crate::node::{AttributeValue, Element, Node};
use crate::renderer::Render;

/// Renders one element.
///
/// A component receives the element's [`Props`] and a [`Render`] handle. The
/// element's children are not rendered unless the component asks for it with
/// `render.render(props.children())`, which it may do any number of times.
///
/// Closures with the matching signature are components. Struct components
/// implement the trait directly:
///
/// ```
/// use std::fmt::Write;
/// use tagmark_renderer::{Component, Props, Render, RenderError};
///
/// struct Badge;
///
/// impl Component for Badge {
///     fn render(&self, props: &Props<'_>, render: &mut Render<'_>) -> Result<(), RenderError> {
///         let label = props.get_str("label").unwrap_or("?");
///         write!(render, r#"<span class="badge">{label}</span>"#)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Component: Send + Sync {
    fn render(&self, props: &Props<'_>, render: &mut Render<'_>) -> Result<(), RenderError>;
}

impl<F> Component for F
where
    F: Fn(&Props<'_>, &mut Render<'_>) -> Result<(), RenderError> + Send + Sync,
{
    fn render(&self, props: &Props<'_>, render: &mut Render<'_>) -> Result<(), RenderError> {
        self(props, render)
    }
}

/// Properties handed to a component.
///
/// Carries the tag name, the raw (unrendered) children and the attributes with
/// context references already resolved. An attribute whose reference did not
/// resolve is present with an absent (`None`) value.
#[derive(Clone, Debug, PartialEq)]
pub struct Props<'n> {
    name: &'n str,
    children: &'n [Node],
    attrs: Vec<(&'n str, Option<Value>)>,
}

impl<'n> Props<'n> {
    /// Create props with no attributes.
    ///
    /// Components build props by hand to delegate to another component:
    ///
    /// ```
    /// use serde_json::{Value, json};
    /// use tagmark_renderer::{
    ///     Component, Components, DefaultComponent, Props, Render, RenderError, RenderOptions,
    ///     Renderer, Verbatim, parse,
    /// };
    ///
    /// struct Button;
    ///
    /// impl Component for Button {
    ///     fn render(&self, props: &Props<'_>, render: &mut Render<'_>) -> Result<(), RenderError> {
    ///         let button = Props::new("button", props.children())
    ///             .with_attr("type", Some(json!("button")));
    ///         DefaultComponent.render(&button, render)
    ///     }
    /// }
    ///
    /// let renderer = Renderer::new(
    ///     RenderOptions::new()
    ///         .with_markdown_engine(Verbatim)
    ///         .with_components(Components::new().with_component("Action", Button)),
    /// );
    /// let nodes = parse("<Action>Go</Action>").unwrap();
    /// let html = renderer.render_to_string(&nodes, &Value::Null).unwrap();
    /// assert_eq!(html, r#"<button type="button">Go</button>"#);
    /// ```
    #[must_use]
    pub fn new(name: &'n str, children: &'n [Node]) -> Self {
        Self {
            name,
            children,
            attrs: Vec::new(),
        }
    }

    /// Add an attribute, replacing an existing one with the same key.
    #[must_use]
    pub fn with_attr(mut self, key: &'n str, value: Option<Value>) -> Self {
        match self.attrs.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((key, value)),
        }
        self
    }

    /// Build props for `element`, resolving context references against `context`.
    pub(crate) fn resolve(
        element: &'n Element,
        context: &Value,
        interpolator: &dyn Interpolator,
    ) -> Self {
        let attrs = element
            .attribs
            .iter()
            .map(|(key, value)| {
                let resolved = match value {
                    AttributeValue::Str(s) => Some(Value::String(s.clone())),
                    AttributeValue::Number(n) => Some(number_value(*n)),
                    AttributeValue::ContextRef { accessor } => {
                        interpolator.interpolate(context, accessor)
                    }
                };
                (key, resolved)
            })
            .collect();

        Self {
            name: &element.name,
            children: &element.children,
            attrs,
        }
    }

    /// Tag name as written in the source.
    #[must_use]
    pub fn name(&self) -> &'n str {
        self.name
    }

    /// Child nodes, not yet rendered.
    #[must_use]
    pub fn children(&self) -> &'n [Node] {
        self.children
    }

    /// Attribute value, `None` if the attribute is missing or absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attrs
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, value)| value.as_ref())
    }

    /// String attribute value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether the element declared `key`, even if its value is absent.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.attrs.iter().any(|(k, _)| *k == key)
    }

    /// Attributes in source order.
    pub fn attrs(&self) -> impl Iterator<Item = (&'n str, Option<&Value>)> {
        self.attrs.iter().map(|(key, value)| (*key, value.as_ref()))
    }
}

/// Convert a parsed number to JSON, keeping integral values integral.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Fallback for tags without a registered component.
///
/// Writes the tag back out: `<name key=json ...>`, the rendered children, then
/// `</name>`. Each attribute value is written as its JSON encoding, so strings
/// keep their quotes (`x="1"`) and numbers do not (`n=2`). Absent values are
/// left out.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultComponent;

impl Component for DefaultComponent {
    fn render(&self, props: &Props<'_>, render: &mut Render<'_>) -> Result<(), RenderError> {
        let name = props.name();
        write!(render, "<{name}")?;
        for (key, value) in props.attrs() {
            if let Some(value) = value {
                write!(render, " {key}={value}")?;
            }
        }
        render.write_str(">")?;
        render.render(props.children())?;
        write!(render, "</{name}>")?;
        Ok(())
    }
}

/// Registry of components keyed by case-insensitive tag name.
///
/// # Example
///
/// ```
/// use std::fmt::Write;
/// use tagmark_renderer::Components;
///
/// let components = Components::new().with("Note", |props, render| {
///     render.write_str("<aside>")?;
///     render.render(props.children())?;
///     render.write_str("</aside>")?;
///     Ok(())
/// });
///
/// assert!(components.lookup("note").is_some());
/// assert!(components.lookup("NOTE").is_some());
/// assert!(components.lookup("card").is_none());
/// ```
#[derive(Default)]
pub struct Components {
    by_name: HashMap<String, Box<dyn Component>>,
}

impl Components {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure component.
    #[must_use]
    pub fn with<F>(mut self, name: &str, component: F) -> Self
    where
        F: Fn(&Props<'_>, &mut Render<'_>) -> Result<(), RenderError> + Send + Sync + 'static,
    {
        self.insert(name, Box::new(component));
        self
    }

    /// Register a [`Component`] implementation.
    #[must_use]
    pub fn with_component<C: Component + 'static>(mut self, name: &str, component: C) -> Self {
        self.insert(name, Box::new(component));
        self
    }

    /// Register a component, replacing any component with the same normalized name.
    pub fn insert(&mut self, name: &str, component: Box<dyn Component>) {
        self.by_name.insert(normalize(name), component);
    }

    /// Find the component for a tag name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&dyn Component> {
        self.by_name.get(&normalize(name)).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl std::fmt::Debug for Components {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("Components").field("names", &names).finish()
    }
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}
