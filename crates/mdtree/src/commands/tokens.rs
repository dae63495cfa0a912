//! `mdtree tokens` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdtree_config::Config;
use mdtree_renderer::BlockLexer;

use super::{markdown_options, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tokens command.
#[derive(Args)]
pub(crate) struct TokensArgs {
    /// Markdown file to tokenize (default: stdin; `-` also reads stdin).
    path: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdtree.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl TokensArgs {
    /// Execute the tokens command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, lexing or output fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let source = read_input(self.path.as_deref())?;
        let options = markdown_options(&config.markdown);

        let lexed = BlockLexer::new(&options).lex(&source)?;
        output.result(&serde_json::to_string_pretty(&lexed)?)?;
        Ok(())
    }
}
