//! Document tree produced by [`parse`](crate::parse).

/// Typed attribute value as written in the source markup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "snake_case"))]
pub enum AttributeValue {
    /// `name="text"`, quotes stripped, no escape processing.
    Str(String),
    /// `name=12.5`.
    Number(f64),
    /// `name={path.to.value}`, resolved against the context at render time.
    ContextRef {
        /// Dotted accessor path, trimmed.
        accessor: String,
    },
}

impl AttributeValue {
    /// Create a context reference.
    #[must_use]
    pub fn context_ref(accessor: impl Into<String>) -> Self {
        Self::ContextRef {
            accessor: accessor.into(),
        }
    }
}

/// Attributes of an element, in source order.
///
/// Inserting an existing name replaces its value but keeps its original
/// position, so the last duplicate wins.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes(Vec<(String, AttributeValue)>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute, replacing any previous value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (name, value) in iter {
            attrs.insert(name, value);
        }
        attrs
    }
}

/// Element node: `<name attr=...>children</name>`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Element {
    /// Tag name as written in the source.
    pub name: String,
    pub attribs: Attributes,
    pub children: Vec<Node>,
}

/// Text node holding raw markdown.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Text {
    pub data: String,
}

/// A node of the document tree.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Create an element node.
    #[must_use]
    pub fn element(name: impl Into<String>, attribs: Attributes, children: Vec<Node>) -> Self {
        Self::Element(Element {
            name: name.into(),
            attribs,
            children,
        })
    }

    /// Create a text node.
    #[must_use]
    pub fn text(data: impl Into<String>) -> Self {
        Self::Text(Text { data: data.into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_position() {
        let mut attrs = Attributes::new();
        attrs.insert("a", AttributeValue::Number(1.0));
        attrs.insert("b", AttributeValue::Number(2.0));
        attrs.insert("a", AttributeValue::Number(3.0));

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("a", &AttributeValue::Number(3.0)),
                ("b", &AttributeValue::Number(2.0)),
            ]
        );
    }

    #[test]
    fn test_get_missing() {
        let attrs = Attributes::new();
        assert!(attrs.get("x").is_none());
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_from_iter_last_wins() {
        let attrs: Attributes = [
            ("x", AttributeValue::Str("first".to_owned())),
            ("x", AttributeValue::Str("second".to_owned())),
        ]
        .into_iter()
        .collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("x"), Some(&AttributeValue::Str("second".to_owned())));
    }
}
