//! `tagmark render` command implementation.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use tagmark_config::{CliSettings, Config, MarkdownConfig};
use tagmark_renderer::{CommonMark, MarkdownOptions, RenderOptions, Renderer, Verbatim, parse};

use crate::alias::alias_components;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markup file to render.
    input: PathBuf,

    /// Path to configuration file (default: auto-discover tagmark.toml).
    #[arg(short, long, env = "TAGMARK_CONFIG")]
    config: Option<PathBuf>,

    /// JSON file used as the render context (overrides config).
    #[arg(long)]
    context: Option<PathBuf>,

    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write text nodes unchanged instead of converting markdown.
    #[arg(long)]
    raw: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, context loading, parsing or
    /// rendering fails, or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            context_file: self.context,
            markdown_enabled: self.raw.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let input = fs::read_to_string(&self.input)?;
        let context = config.load_context()?;
        let html = render_document(&config, &input, &context)?;

        match &self.output {
            Some(path) => {
                fs::write(path, &html)?;
                Output::new().success(&format!("Rendered {}", path.display()));
            }
            None => std::io::stdout().lock().write_all(html.as_bytes())?,
        }
        Ok(())
    }
}

/// Parse and render `input` with the components and engine from `config`.
pub(crate) fn render_document(
    config: &Config,
    input: &str,
    context: &Value,
) -> Result<String, CliError> {
    let nodes = parse(input)?;
    let renderer = Renderer::new(build_options(config));
    Ok(renderer.render_to_string(&nodes, context)?)
}

/// Render options for `config`.
pub(crate) fn build_options(config: &Config) -> RenderOptions {
    let options = RenderOptions::new().with_components(alias_components(&config.components));
    if config.markdown.enabled {
        options.with_markdown_engine(CommonMark::with_options(markdown_options(&config.markdown)))
    } else {
        options.with_markdown_engine(Verbatim)
    }
}

fn markdown_options(markdown: &MarkdownConfig) -> MarkdownOptions {
    let mut options = MarkdownOptions::empty();
    options.set(MarkdownOptions::ENABLE_TABLES, markdown.tables);
    options.set(MarkdownOptions::ENABLE_STRIKETHROUGH, markdown.strikethrough);
    options.set(MarkdownOptions::ENABLE_FOOTNOTES, markdown.footnotes);
    options.set(MarkdownOptions::ENABLE_TASKLISTS, markdown.tasklists);
    options.set(
        MarkdownOptions::ENABLE_SMART_PUNCTUATION,
        markdown.smart_punctuation,
    );
    options
}
