//! Renderer for markup tags with embedded markdown.
//!
//! Documents mix markup tags and markdown text. Tags carry attributes whose
//! values are literals or references into a runtime context:
//!
//! ```text
//! <Alert level="warning" count=3 user={session.user.name}>
//! Your **quota** is almost used up.
//! </Alert>
//! ```
//!
//! # Architecture
//!
//! - [`parse`] builds a [`Node`] tree; attribute text goes through
//!   [`extract_attributes`]
//! - [`Renderer`] walks the tree, resolving `{...}` references with an
//!   [`Interpolator`] and dispatching elements to registered [`Component`]s
//!   (case-insensitive) or to [`DefaultComponent`]
//! - text nodes go to the configured [`MarkdownEngine`]
//! - components and engines continue the traversal through the [`Render`]
//!   handle, as often as they like
//!
//! # Example
//!
//! ```
//! use std::fmt::Write;
//! use serde_json::json;
//! use tagmark_renderer::{CommonMark, RenderOptions, Renderer, parse};
//!
//! let renderer = Renderer::new(
//!     RenderOptions::new()
//!         .with_markdown_engine(CommonMark::new())
//!         .with_component("Alert", |props, render| {
//!             let level = props.get_str("level").unwrap_or("info");
//!             write!(render, r#"<div class="alert alert-{level}">"#)?;
//!             render.render(props.children())?;
//!             render.write_str("</div>")?;
//!             Ok(())
//!         }),
//! );
//!
//! let nodes = parse(r#"<Alert level="warning">Quota **low**</Alert>"#).unwrap();
//! let html = renderer.render_to_string(&nodes, &json!({})).unwrap();
//! assert_eq!(
//!     html,
//!     "<div class=\"alert alert-warning\"><p>Quota <strong>low</strong></p>\n</div>"
//! );
//! ```

mod attrs;
mod component;
mod error;
mod interpolate;
mod markdown;
mod node;
mod parser;
mod renderer;

pub use attrs::extract_attributes;
pub use component::{Component, Components, DefaultComponent, Props};
pub use error::{ParseError, RenderError};
pub use interpolate::{Interpolator, PathInterpolator, resolve, resolve_path};
pub use markdown::{CommonMark, MarkdownEngine, Verbatim};
pub use node::{AttributeValue, Attributes, Element, Node, Text};
pub use parser::parse;
pub use renderer::{
    DEFAULT_MAX_DEPTH, Fragment, Render, RenderOptions, Renderer, ToHtml, render, to_html,
};

pub use pulldown_cmark::Options as MarkdownOptions;
