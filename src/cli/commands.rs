//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::domain::{forest_to_json, JsonAdapter, JsonWeight, TreeBuilder, TreeConfig, TreeNode};
use crate::tree_traits::TreeNodeConvert;

/// Forest type produced from JSON input.
pub type JsonForest = Vec<TreeNode<Value, JsonWeight>>;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build {
            file,
            root,
            max_depth,
            format,
            node,
        }) => cmd_build(cli, file, root, *max_depth, *format, node.as_deref()),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(cli),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `rstree --help`".to_string(),
        )),
    }
}

/// Parse an id given on the command line: JSON if it parses, else a plain string.
pub fn parse_id(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Read a JSON array of records from `path`.
pub fn read_records(path: &Path) -> CliResult<Vec<Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Array(records) => Ok(records),
        other => Err(CliError::InvalidArgs(format!(
            "{}: expected a JSON array of records, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Effective settings: layered config plus command-line overrides.
fn effective_settings(
    cli: &Cli,
    max_depth: Option<i64>,
    format: Option<OutputFormat>,
) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if max_depth.is_some() {
        settings.max_depth = max_depth;
    }
    if let Some(format) = format {
        settings.format = format;
    }
    Ok(settings)
}

/// Build JSON records into a forest, optionally keeping only the subtree of `node`.
///
/// `root` and `node` are command-line ids, see `parse_id`.
pub fn build_records(
    records: &[Value],
    root: &str,
    node: Option<&str>,
    config: &TreeConfig,
) -> CliResult<JsonForest> {
    let root_sentinel = parse_id(root);
    debug!(records = records.len(), root = %root_sentinel, "building");

    let builder = TreeBuilder::new(config, JsonAdapter::<Value, JsonWeight>::new(config));
    let forest = match node {
        Some(id) => builder
            .build_single(records, &root_sentinel, &parse_id(id))?
            .into_iter()
            .collect(),
        None => builder.build(records, &root_sentinel)?,
    };
    Ok(forest)
}

/// Render a forest as pretty JSON or as `termtree` text, one tree after another.
pub fn render_forest(
    forest: &[TreeNode<Value, JsonWeight>],
    config: &TreeConfig,
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            let json = forest_to_json(forest, config)?;
            Ok(serde_json::to_string_pretty(&json)?)
        }
        OutputFormat::Tree => Ok(forest
            .iter()
            .map(|tree| tree.to_tree_string(config).to_string())
            .collect()),
    }
}

#[instrument(level = "debug", skip(cli))]
fn cmd_build(
    cli: &Cli,
    file: &Path,
    root: &str,
    max_depth: Option<i64>,
    format: Option<OutputFormat>,
    node: Option<&str>,
) -> CliResult<()> {
    let settings = effective_settings(cli, max_depth, format)?;
    let config = settings.tree_config()?;
    let records = read_records(file)?;
    let forest = build_records(&records, root, node, &config)?;

    if forest.is_empty() {
        output::warning(&format!("no roots with parent id {}", parse_id(root)));
    }
    if settings.format == OutputFormat::Tree {
        let nodes: usize = forest.iter().map(TreeNode::len).sum();
        output::header(&format!(
            "{} root(s), {} node(s) from {} record(s)",
            forest.len(),
            nodes,
            records.len()
        ));
    }
    let rendered = render_forest(&forest, &config, settings.format)?;
    output::info(rendered.trim_end());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    // Validate so `config show` reports the same errors as `build`
    settings.tree_config()?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(cli: &Cli) -> CliResult<()> {
    let global = global_config_path().map_or_else(
        || "(no home directory)".to_string(),
        |p: PathBuf| p.display().to_string(),
    );
    output::header("Config files:");
    output::detail(&format!("global: {}", global));
    if let Some(local) = &cli.config {
        output::detail(&format!("local:  {}", local.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_json_literal_when_parsing_id_then_keeps_type() {
        assert_eq!(parse_id("0"), json!(0));
        assert_eq!(parse_id("\"a\""), json!("a"));
    }

    #[test]
    fn given_bare_text_when_parsing_id_then_string() {
        assert_eq!(parse_id("root"), json!("root"));
    }
}
