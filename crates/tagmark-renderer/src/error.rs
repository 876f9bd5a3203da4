//! Error types for parsing and rendering.

use std::fmt;

/// Error while building the document tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The tokenizer rejected the input.
    #[error("syntax error at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// A closing tag that matches no open element.
    #[error("unexpected closing tag </{name}> at byte {position}")]
    UnexpectedEndTag { name: String, position: u64 },

    /// Token bytes were not valid UTF-8.
    #[error("invalid UTF-8 at byte {position}")]
    Utf8 {
        position: u64,
        #[source]
        source: std::str::Utf8Error,
    },
}

/// Error that aborts a render pass.
///
/// Output written before the failure stays in the stream.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// Input could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A value handed to the renderer is not a node, a node sequence,
    /// markup text or absent.
    #[error("unexpected node shape: {0}")]
    UnexpectedNodeShape(String),

    /// A text node was reached but no markdown engine is configured.
    #[error("text node cannot be rendered without a markdown engine")]
    MissingMarkdownEngine,

    /// Nodes nest deeper than the renderer's depth limit.
    #[error("nesting exceeds the render depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A component reported a failure.
    #[error("component <{tag}> failed: {message}")]
    Component { tag: String, message: String },

    /// The output stream rejected a write.
    #[error("failed to write output")]
    Write(#[from] fmt::Error),
}

impl RenderError {
    /// Create a component failure for `tag`.
    ///
    /// ```
    /// use tagmark_renderer::RenderError;
    ///
    /// let err = RenderError::component("Chart", "missing data");
    /// assert_eq!(err.to_string(), "component <Chart> failed: missing data");
    /// ```
    pub fn component(tag: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Component {
            tag: tag.into(),
            message: message.to_string(),
        }
    }
}
