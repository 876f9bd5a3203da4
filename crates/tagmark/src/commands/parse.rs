//! `tagmark parse` command implementation.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tagmark_renderer::parse;

use crate::error::CliError;

/// Arguments for the parse command.
#[derive(Args)]
pub(crate) struct ParseArgs {
    /// Markup file to parse.
    input: PathBuf,

    /// Print compact JSON on a single line.
    #[arg(long)]
    compact: bool,
}

impl ParseArgs {
    /// Execute the parse command, printing the document tree as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or parsed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let input = fs::read_to_string(&self.input)?;
        let json = tree_json(&input, self.compact)?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

fn tree_json(input: &str, compact: bool) -> Result<String, CliError> {
    let nodes = parse(input)?;
    let json = if compact {
        serde_json::to_string(&nodes)?
    } else {
        serde_json::to_string_pretty(&nodes)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[test]
    fn test_tree_json() {
        let json = tree_json(r#"<a n=1>t</a>"#, true).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["type"], json!("element"));
        assert_eq!(value[0]["name"], json!("a"));
        assert_eq!(value[0]["children"][0], json!({"type": "text", "data": "t"}));
    }

    #[test]
    fn test_tree_json_parse_error() {
        assert!(matches!(tree_json("</x>", false), Err(CliError::Parse(_))));
    }
}
