//! Context interpolation for `{path.to.value}` attribute references.

use serde_json::Value;

/// Resolves a context reference accessor against the render context.
///
/// The renderer holds a single interpolator for a whole render pass and calls
/// it once per reference each time an element is rendered. Returning `None`
/// means the value is absent; components decide how to render that.
///
/// Closures with the matching signature are interpolators:
///
/// ```
/// use serde_json::{Value, json};
/// use tagmark_renderer::Interpolator;
///
/// let upper = |ctx: &Value, accessor: &str| {
///     ctx.get(accessor)
///         .and_then(Value::as_str)
///         .map(|s| Value::String(s.to_uppercase()))
/// };
/// assert_eq!(upper.interpolate(&json!({"name": "ada"}), "name"), Some(json!("ADA")));
/// ```
pub trait Interpolator: Send + Sync {
    fn interpolate(&self, context: &Value, accessor: &str) -> Option<Value>;
}

impl<F> Interpolator for F
where
    F: Fn(&Value, &str) -> Option<Value> + Send + Sync,
{
    fn interpolate(&self, context: &Value, accessor: &str) -> Option<Value> {
        self(context, accessor)
    }
}

/// Default interpolator: dotted path lookup via [`resolve`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PathInterpolator;

impl Interpolator for PathInterpolator {
    fn interpolate(&self, context: &Value, accessor: &str) -> Option<Value> {
        let value = resolve(context, accessor).cloned();
        if value.is_none() {
            tracing::debug!(accessor, "Context path not found");
        }
        value
    }
}

/// Resolve a dotted accessor (`"a.b.c"`) against `context`.
///
/// An empty accessor resolves to the context itself.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tagmark_renderer::resolve;
///
/// let ctx = json!({"a": {"b": 5}});
/// assert_eq!(resolve(&ctx, "a.b"), Some(&json!(5)));
/// assert_eq!(resolve(&ctx, "a.c"), None);
/// assert_eq!(resolve(&ctx, ""), Some(&ctx));
/// ```
#[must_use]
pub fn resolve<'a>(context: &'a Value, accessor: &str) -> Option<&'a Value> {
    if accessor.is_empty() {
        return Some(context);
    }
    let segments: Vec<&str> = accessor.split('.').collect();
    resolve_path(context, &segments)
}

/// Resolve a sequence of path segments against `context`.
///
/// Objects are stepped through by key, arrays by decimal index. Any other
/// value, or a missing key, makes the remainder of the path absent.
#[must_use]
pub fn resolve_path<'a, S: AsRef<str>>(context: &'a Value, segments: &[S]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(context, |current, segment| step(current, segment.as_ref()))
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
