//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod tokens;

use std::io::Read;
use std::path::Path;

use mdtree_config::MarkdownConfig;
use mdtree_renderer::Options;

pub(crate) use render::RenderArgs;
pub(crate) use tokens::TokensArgs;

use crate::error::CliError;

/// Read markdown from `path`, or from stdin when the path is absent or `-`.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    let source = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            source
        }
    };
    tracing::debug!(bytes = source.len(), "Read input");
    Ok(source)
}

/// Build renderer options from the `[markdown]` config section.
fn markdown_options(config: &MarkdownConfig) -> Options {
    let mut options = Options::new()
        .with_gfm(config.gfm)
        .with_tables(config.tables)
        .with_breaks(config.breaks)
        .with_pedantic(config.pedantic)
        .with_sanitize(config.sanitize)
        .with_mangle(config.mangle)
        .with_smartypants(config.smartypants)
        .with_header_prefix(config.header_prefix.as_str())
        .with_lang_prefix(config.lang_prefix.as_str());
    if let Some(interpolations) = &config.interpolations {
        options = options.with_interpolations(interpolations.clone());
    }
    options
}
