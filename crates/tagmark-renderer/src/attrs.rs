//! Attribute extraction from raw tag text.
//!
//! Supports three value forms:
//!
//! - `name="literal"` - string, quotes stripped, no escape processing
//! - `name=12.5` - number (optional sign, optional fraction)
//! - `name={path.to.value}` - context reference resolved at render time
//!
//! Anything that does not match one of these forms is skipped.

use std::sync::LazyLock;

use regex::Regex;

use crate::node::{AttributeValue, Attributes};

/// One attribute: name, `=`, then a quoted string, a number or a `{...}` reference.
///
/// Alternation order fixes the precedence: string, number, reference.
static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^=<>"'\s]+)\s*=\s*(?:"([^"]*)"|([-+]?[0-9]*\.?[0-9]+)|\{([^}]*)\})"#)
        .unwrap()
});

/// Extract attributes from the raw text following a tag name.
///
/// Every call scans `raw` from the start with its own iterator.
///
/// # Example
///
/// ```
/// use tagmark_renderer::{AttributeValue, extract_attributes};
///
/// let attrs = extract_attributes(r#"title="Hi" width=560 user={ session.user }"#);
/// assert_eq!(attrs.get("title"), Some(&AttributeValue::Str("Hi".to_owned())));
/// assert_eq!(attrs.get("width"), Some(&AttributeValue::Number(560.0)));
/// assert_eq!(attrs.get("user"), Some(&AttributeValue::context_ref("session.user")));
/// ```
#[must_use]
pub fn extract_attributes(raw: &str) -> Attributes {
    let mut attrs = Attributes::new();

    for caps in ATTRIBUTE_RE.captures_iter(raw) {
        let name = &caps[1];
        let value = if let Some(literal) = caps.get(2) {
            AttributeValue::Str(literal.as_str().to_owned())
        } else if let Some(number) = caps.get(3) {
            match number.as_str().parse::<f64>() {
                Ok(n) => AttributeValue::Number(n),
                Err(_) => continue,
            }
        } else if let Some(expr) = caps.get(4) {
            AttributeValue::context_ref(expr.as_str().trim())
        } else {
            continue;
        };
        attrs.insert(name, value);
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(value: &str) -> AttributeValue {
        AttributeValue::Str(value.to_owned())
    }

    #[test]
    fn test_string_literal() {
        let attrs = extract_attributes(r#"k="v""#);
        assert_eq!(attrs.get("k"), Some(&s("v")));
    }

    #[test]
    fn test_string_keeps_backslashes() {
        let attrs = extract_attributes(r#"path="a\nb""#);
        assert_eq!(attrs.get("path"), Some(&s(r"a\nb")));
    }

    #[test]
    fn test_empty_string_literal() {
        let attrs = extract_attributes(r#"alt="""#);
        assert_eq!(attrs.get("alt"), Some(&s("")));
    }

    #[test]
    fn test_number_literal() {
        let attrs = extract_attributes("k=12.75");
        assert_eq!(attrs.get("k"), Some(&AttributeValue::Number(12.75)));
    }

    #[test]
    fn test_signed_and_fractional_numbers() {
        let attrs = extract_attributes("a=-2 b=+7 c=.5 d=-0.25");
        assert_eq!(attrs.get("a"), Some(&AttributeValue::Number(-2.0)));
        assert_eq!(attrs.get("b"), Some(&AttributeValue::Number(7.0)));
        assert_eq!(attrs.get("c"), Some(&AttributeValue::Number(0.5)));
        assert_eq!(attrs.get("d"), Some(&AttributeValue::Number(-0.25)));
    }

    #[test]
    fn test_context_ref() {
        let attrs = extract_attributes("k={a.b}");
        assert_eq!(attrs.get("k"), Some(&AttributeValue::context_ref("a.b")));
    }

    #[test]
    fn test_context_ref_is_trimmed() {
        let attrs = extract_attributes("k={   a.b.c  }");
        assert_eq!(attrs.get("k"), Some(&AttributeValue::context_ref("a.b.c")));
    }

    #[test]
    fn test_whitespace_around_equals() {
        let attrs = extract_attributes(r#"k = "v" n =  4"#);
        assert_eq!(attrs.get("k"), Some(&s("v")));
        assert_eq!(attrs.get("n"), Some(&AttributeValue::Number(4.0)));
    }

    #[test]
    fn test_duplicate_last_wins() {
        let attrs = extract_attributes("x=1 x=2");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("x"), Some(&AttributeValue::Number(2.0)));
    }

    #[test]
    fn test_source_order_preserved() {
        let attrs = extract_attributes(r#"b="1" a=2 c={x}"#);
        let names: Vec<_> = attrs.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_malformed_fragments_skipped() {
        let attrs = extract_attributes(r#"disabled x='single' y=abc z="ok" w={unterminated"#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("z"), Some(&s("ok")));
    }

    #[test]
    fn test_string_wins_over_number() {
        let attrs = extract_attributes(r#"n="42""#);
        assert_eq!(attrs.get("n"), Some(&s("42")));
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_attributes("").is_empty());
        assert!(extract_attributes("   ").is_empty());
    }

    #[test]
    fn test_back_to_back_extractions_are_independent() {
        let first = extract_attributes(r#"aaaaaaaaaaaaaaaa="long value here" b=1"#);
        let second = extract_attributes("c=2");
        let third = extract_attributes(r#"aaaaaaaaaaaaaaaa="long value here" b=1"#);

        assert_eq!(second.len(), 1);
        assert_eq!(second.get("c"), Some(&AttributeValue::Number(2.0)));
        assert_eq!(first, third);
        assert_eq!(first.len(), 2);
    }
}
