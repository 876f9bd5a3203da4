//! Document tree builder.
//!
//! Drives the `quick-xml` pull reader over the input and builds [`Node`] trees.
//! Attribute text of every start tag goes through [`extract_attributes`]
//! instead of the tokenizer's own attribute parser, so `{...}` references and
//! bare numbers survive.
//!
//! The builder is lenient in the way HTML tokenizers are:
//!
//! - text is kept raw (entity references are reproduced as written)
//! - comments, doctypes, declarations and processing instructions are dropped
//! - void elements (`<br>`, `<img>`, ...) never take children
//! - a closing tag also closes everything opened inside its element
//! - elements left open at the end of input are closed implicitly
//! - a `<` that does not start terminated markup is text

use std::str;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::attrs::extract_attributes;
use crate::error::ParseError;
use crate::node::{Attributes, Element, Node, Text};

/// HTML elements that never have content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "isindex",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Parse markup with embedded markdown into a sequence of top-level nodes.
///
/// A `<` that cannot start markup (`1 < 2`, `x <= y`, or a tag that is never
/// closed) is kept as text.
///
/// # Errors
///
/// Returns [`ParseError`] if the tokenizer rejects the input or a closing tag
/// matches no open element.
///
/// # Example
///
/// ```
/// use tagmark_renderer::{AttributeValue, Node, parse};
///
/// let nodes = parse(r#"<Note level=2>Some *text*</Note>"#).unwrap();
/// let Node::Element(note) = &nodes[0] else { panic!("expected element") };
/// assert_eq!(note.name, "Note");
/// assert_eq!(note.attribs.get("level"), Some(&AttributeValue::Number(2.0)));
/// assert_eq!(note.children, vec![Node::text("Some *text*")]);
/// ```
pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    let mut tree = TreeBuilder::default();

    let mut start = 0;
    for literal in literal_angle_brackets(input) {
        read_markup(&input[start..literal], start, &mut tree)?;
        tree.text("<");
        start = literal + 1;
    }
    read_markup(&input[start..], start, &mut tree)?;

    let nodes = tree.finish();
    tracing::debug!(nodes = nodes.len(), bytes = input.len(), "Parsed document");
    Ok(nodes)
}

/// Feed one span of input, free of literal `<`, into the tree.
///
/// `offset` is the span's byte offset in the whole document.
fn read_markup(span: &str, offset: usize, tree: &mut TreeBuilder) -> Result<(), ParseError> {
    let base = offset as u64;
    let mut reader = Reader::from_str(span);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.expand_empty_elements = false;
    config.allow_dangling_amp = true;

    loop {
        let event = reader.read_event().map_err(|source| ParseError::Syntax {
            position: base + reader.error_position(),
            source,
        })?;
        let position = base + reader.buffer_position();

        match event {
            Event::Start(e) => {
                let (name, attribs) = split_tag(&e, position)?;
                if is_void(&name) {
                    tree.leaf(name, attribs);
                } else {
                    tree.open(name, attribs);
                }
            }
            Event::Empty(e) => {
                let (name, attribs) = split_tag(&e, position)?;
                tree.leaf(name, attribs);
            }
            Event::End(e) => {
                let qname = e.name();
                let name = decode(qname.as_ref(), position)?;
                if !tree.close(name) && !is_void(name) {
                    return Err(ParseError::UnexpectedEndTag {
                        name: name.to_owned(),
                        position,
                    });
                }
            }
            Event::Text(e) => tree.text(decode(&e, position)?),
            Event::GeneralRef(e) => {
                let entity = decode(&e, position)?;
                tree.text(&format!("&{entity};"));
            }
            Event::CData(e) => tree.text(decode(&e, position)?),
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

/// Byte offsets of `<` characters that do not start markup.
///
/// Markup is a tag (`<name`, `</name`) closed by a `>` outside quotes, a
/// comment, a CDATA section, a processing instruction or a declaration. Any
/// other `<`, including one whose markup never ends, is text.
fn literal_angle_brackets(input: &str) -> Vec<usize> {
    let mut literals = Vec::new();
    let mut pos = 0;
    while let Some(found) = input[pos..].find('<') {
        let start = pos + found;
        match markup_len(&input[start..]) {
            Some(len) => pos = start + len,
            None => {
                literals.push(start);
                pos = start + 1;
            }
        }
    }
    literals
}

/// Length of the markup at the start of `rest` (which begins with `<`).
fn markup_len(rest: &str) -> Option<usize> {
    let after = &rest[1..];
    let (open, close) = if after.starts_with("!--") {
        ("<!--", "-->")
    } else if after.starts_with("![CDATA[") {
        ("<![CDATA[", "]]>")
    } else if after.starts_with('?') {
        ("<?", "?>")
    } else if after.starts_with('!') {
        ("<!", ">")
    } else {
        let name = after.strip_prefix('/').unwrap_or(after);
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        return tag_end(rest);
    };
    rest[open.len()..]
        .find(close)
        .map(|end| open.len() + end + close.len())
}

/// Offset just past the first `>` outside a quoted value.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in tag.bytes().enumerate() {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Split a start tag into its name and extracted attributes.
fn split_tag(tag: &BytesStart<'_>, position: u64) -> Result<(String, Attributes), ParseError> {
    let content = decode(tag, position)?;
    let name_end = content
        .find(char::is_whitespace)
        .unwrap_or(content.len());
    let (name, rest) = content.split_at(name_end);
    let raw_attrs = rest.trim_start();

    let attribs = if raw_attrs.is_empty() {
        Attributes::new()
    } else {
        extract_attributes(raw_attrs)
    };

    Ok((name.to_owned(), attribs))
}

fn decode(bytes: &[u8], position: u64) -> Result<&str, ParseError> {
    str::from_utf8(bytes).map_err(|source| ParseError::Utf8 { position, source })
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// Element whose closing tag has not been seen yet.
struct OpenElement {
    name: String,
    attribs: Attributes,
    children: Vec<Node>,
}

impl OpenElement {
    fn into_node(self) -> Node {
        Node::Element(Element {
            name: self.name,
            attribs: self.attribs,
            children: self.children,
        })
    }
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<OpenElement>,
}

impl TreeBuilder {
    fn children_mut(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.root,
        }
    }

    fn open(&mut self, name: String, attribs: Attributes) {
        self.stack.push(OpenElement {
            name,
            attribs,
            children: Vec::new(),
        });
    }

    fn leaf(&mut self, name: String, attribs: Attributes) {
        self.children_mut().push(Node::Element(Element {
            name,
            attribs,
            children: Vec::new(),
        }));
    }

    /// Close the innermost open element named `name`.
    ///
    /// Returns `false` if no such element is open.
    fn close(&mut self, name: &str) -> bool {
        let Some(index) = self
            .stack
            .iter()
            .rposition(|open| open.name.eq_ignore_ascii_case(name))
        else {
            return false;
        };

        while self.stack.len() > index {
            self.pop();
        }
        true
    }

    fn pop(&mut self) {
        if let Some(open) = self.stack.pop() {
            let node = open.into_node();
            self.children_mut().push(node);
        }
    }

    /// Append text, merging with a preceding text node.
    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.children_mut();
        if let Some(Node::Text(Text { data })) = children.last_mut() {
            data.push_str(text);
        } else {
            children.push(Node::text(text));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.stack.is_empty() {
            self.pop();
        }
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AttributeValue;
    use pretty_assertions::assert_eq;

    fn element(name: &str, attribs: Attributes, children: Vec<Node>) -> Node {
        Node::element(name, attribs, children)
    }

    #[test]
    fn test_parse_text_only() {
        let nodes = parse("# Title\n\nBody").unwrap();
        assert_eq!(nodes, vec![Node::text("# Title\n\nBody")]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_element_with_attributes() {
        let nodes = parse(r#"<foo x="1" n=2 ref={a.b}>text</foo>"#).unwrap();
        let attribs: Attributes = [
            ("x", AttributeValue::Str("1".to_owned())),
            ("n", AttributeValue::Number(2.0)),
            ("ref", AttributeValue::context_ref("a.b")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            nodes,
            vec![element("foo", attribs, vec![Node::text("text")])]
        );
    }

    #[test]
    fn test_parse_preserves_name_case() {
        let nodes = parse("<MyCard></MyCard>").unwrap();
        assert_eq!(nodes, vec![element("MyCard", Attributes::new(), vec![])]);
    }

    #[test]
    fn test_parse_nested_and_mixed() {
        let nodes = parse("intro <a><b>inner</b> tail</a> outro").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::text("intro "),
                element(
                    "a",
                    Attributes::new(),
                    vec![
                        element("b", Attributes::new(), vec![Node::text("inner")]),
                        Node::text(" tail"),
                    ]
                ),
                Node::text(" outro"),
            ]
        );
    }

    #[test]
    fn test_parse_self_closing() {
        let nodes = parse(r#"<Chart data={points} />after"#).unwrap();
        let attribs: Attributes = [("data", AttributeValue::context_ref("points"))]
            .into_iter()
            .collect();
        assert_eq!(
            nodes,
            vec![element("Chart", attribs, vec![]), Node::text("after")]
        );
    }

    #[test]
    fn test_parse_void_element_takes_no_children() {
        let nodes = parse("<p>line<br>next</p>").unwrap();
        assert_eq!(
            nodes,
            vec![element(
                "p",
                Attributes::new(),
                vec![
                    Node::text("line"),
                    element("br", Attributes::new(), vec![]),
                    Node::text("next"),
                ]
            )]
        );
    }

    #[test]
    fn test_parse_stray_void_end_tag_ignored() {
        let nodes = parse("<br></br>x").unwrap();
        assert_eq!(
            nodes,
            vec![element("br", Attributes::new(), vec![]), Node::text("x")]
        );
    }

    #[test]
    fn test_parse_entities_kept_verbatim() {
        let nodes = parse("a &amp; b &lt;c&gt;").unwrap();
        assert_eq!(nodes, vec![Node::text("a &amp; b &lt;c&gt;")]);
    }

    #[test]
    fn test_parse_drops_comments() {
        let nodes = parse("a<!-- hidden -->b").unwrap();
        assert_eq!(nodes, vec![Node::text("ab")]);
    }

    #[test]
    fn test_parse_closing_tag_closes_inner_elements() {
        let nodes = parse("<outer><inner>text</outer>rest").unwrap();
        assert_eq!(
            nodes,
            vec![
                element(
                    "outer",
                    Attributes::new(),
                    vec![element("inner", Attributes::new(), vec![Node::text("text")])]
                ),
                Node::text("rest"),
            ]
        );
    }

    #[test]
    fn test_parse_end_tag_case_insensitive() {
        let nodes = parse("<Note>x</note>").unwrap();
        assert_eq!(
            nodes,
            vec![element("Note", Attributes::new(), vec![Node::text("x")])]
        );
    }

    #[test]
    fn test_parse_unclosed_at_eof() {
        let nodes = parse("<a>open").unwrap();
        assert_eq!(
            nodes,
            vec![element("a", Attributes::new(), vec![Node::text("open")])]
        );
    }

    #[test]
    fn test_parse_unexpected_end_tag() {
        let err = parse("text</missing>").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedEndTag { ref name, .. } if name == "missing"
        ));
    }

    #[test]
    fn test_parse_less_than_before_letter_without_close() {
        assert_eq!(parse("a<b").unwrap(), vec![Node::text("a<b")]);
        assert_eq!(
            parse("Use `a<b` to compare").unwrap(),
            vec![Node::text("Use `a<b` to compare")]
        );
    }

    #[test]
    fn test_parse_comparison_operators_kept_as_text() {
        assert_eq!(parse("x <= y").unwrap(), vec![Node::text("x <= y")]);
        assert_eq!(
            parse("1 < 2 and 3 > 2").unwrap(),
            vec![Node::text("1 < 2 and 3 > 2")]
        );
        assert_eq!(parse("a <> b < c").unwrap(), vec![Node::text("a <> b < c")]);
    }

    #[test]
    fn test_parse_literal_less_than_inside_element() {
        let nodes = parse("<p>1 < 2</p>after <").unwrap();
        assert_eq!(
            nodes,
            vec![
                element("p", Attributes::new(), vec![Node::text("1 < 2")]),
                Node::text("after <"),
            ]
        );
    }

    #[test]
    fn test_parse_less_than_in_quoted_attribute() {
        let nodes = parse(r#"<Cmp rule="a < b > c">x</Cmp>"#).unwrap();
        let attribs: Attributes = [("rule", AttributeValue::Str("a < b > c".to_owned()))]
            .into_iter()
            .collect();
        assert_eq!(
            nodes,
            vec![element("Cmp", attribs, vec![Node::text("x")])]
        );
    }

    #[test]
    fn test_parse_less_than_in_comment_is_dropped_with_comment() {
        assert_eq!(parse("a<!-- 1 < 2 -->b").unwrap(), vec![Node::text("ab")]);
    }

    #[test]
    fn test_literal_angle_brackets() {
        assert_eq!(literal_angle_brackets("<a>1 < 2</a>"), vec![5]);
        assert_eq!(literal_angle_brackets("<a x='>'>"), Vec::<usize>::new());
        assert_eq!(literal_angle_brackets("<!-- open"), vec![0]);
        assert_eq!(literal_angle_brackets("</ x>"), vec![0]);
    }

    #[test]
    fn test_parse_multiline_attributes() {
        let nodes = parse("<x\n  a=\"1\"\n  b={c}\n></x>").unwrap();
        let Node::Element(el) = &nodes[0] else {
            panic!("expected element");
        };
        assert_eq!(el.attribs.len(), 2);
        assert_eq!(el.attribs.get("b"), Some(&AttributeValue::context_ref("c")));
    }
}
