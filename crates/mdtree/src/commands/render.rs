//! `mdtree render` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdtree_config::{CliSettings, Config, OutputFormat};
use mdtree_renderer::{Node, render};

use super::{markdown_options, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin; `-` also reads stdin).
    path: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdtree.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: json or html (overrides config).
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Print JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Reject script hrefs and escape raw HTML.
    #[arg(long)]
    sanitize: bool,

    /// Follow markdown.pl quirks.
    #[arg(long)]
    pedantic: bool,

    /// Typographic quotes, dashes and ellipses.
    #[arg(long)]
    smartypants: bool,

    /// Prefix for generated heading ids (overrides config).
    #[arg(long)]
    header_prefix: Option<String>,

    /// Seed for email mangling, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, rendering or output fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            sanitize: self.sanitize.then_some(true),
            pedantic: self.pedantic.then_some(true),
            smartypants: self.smartypants.then_some(true),
            header_prefix: self.header_prefix,
            format: self.format,
            pretty: self.compact.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source = read_input(self.path.as_deref())?;
        let mut options = markdown_options(&config.markdown);
        if let Some(seed) = self.seed {
            options = options.with_mangle_seed(seed);
        }

        let nodes = render(&source, &options)?;
        tracing::debug!(nodes = nodes.len(), format = %config.output.format, "Rendered document");
        let formatted = format_nodes(&nodes, config.output.format, config.output.pretty)?;
        output.result(&formatted)?;
        Ok(())
    }
}

/// Serialize nodes in the requested format.
fn format_nodes(nodes: &[Node], format: OutputFormat, pretty: bool) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json if pretty => serde_json::to_string_pretty(nodes)?,
        OutputFormat::Json => serde_json::to_string(nodes)?,
        OutputFormat::Html => Node::sequence_to_html(nodes),
    })
}
