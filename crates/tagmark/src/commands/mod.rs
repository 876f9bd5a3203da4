//! CLI command implementations.

pub(crate) mod parse;
pub(crate) mod render;

pub(crate) use parse::ParseArgs;
pub(crate) use render::RenderArgs;
