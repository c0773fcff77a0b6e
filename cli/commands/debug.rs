use crate::cli_args::DebugArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use codecollect_core::{self as core, Config, OutputTarget, PlannedEntry};
use colored::*;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    effective_config: &'a Config,
    source: PathBuf,
    output: &'a OutputTarget,
    entries: &'a [PlannedEntry],
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let config = load_config_for_command(&cwd, &args.run)
        .context("Failed to load configuration for debug command")?;

    let requested = config.resolve_source_folder(args.run.project_config.source.as_deref())?;
    let source = core::locate_source(&requested)
        .with_context(|| format!("Cannot inspect '{}'", requested.display()))?;
    let target = config
        .resolve_output_target(&source)
        .context("Failed to resolve output location")?;

    let mut options = config.collect_options();
    options.skip_path = Some(core::canonical_output_path(&target.file));

    log::debug!("Debug: Planning walk...");
    let entries = core::plan_tree(&source, &config.exclusion_rules(), &options)
        .context("Failed to plan collection for debug")?;
    log::debug!("Debug: {} entries planned.", entries.len());

    let debug_data = DebugInfo {
        effective_config: &config,
        source,
        output: &target,
        entries: &entries,
    };

    match args.format.as_deref() {
        Some("json") => output::print_json(&debug_data),
        _ => print_debug_info_pretty(&debug_data),
    }
}

fn print_debug_info_pretty(debug_info: &DebugInfo) -> Result<()> {
    println!(
        "{}",
        "\n--- Effective Configuration ---"
            .green()
            .bold()
            .underline()
    );
    let config_toml = debug_info
        .effective_config
        .to_toml_string()
        .context("Failed to serialize effective config to TOML")?;
    println!("{}", config_toml);

    println!("{}", "\n--- Paths ---".green().bold().underline());
    println!("{:<16} {}", "Source:".bold(), debug_info.source.display().to_string().cyan());
    println!(
        "{:<16} {}",
        "Output folder:".bold(),
        debug_info.output.folder_name.cyan()
    );
    println!(
        "{:<16} {}",
        "Output file:".bold(),
        debug_info.output.file.display().to_string().cyan()
    );

    println!("{}", "\n--- Planned Entries ---".green().bold().underline());
    if debug_info.entries.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        output::print_planned_entries_table(debug_info.entries);
    }

    let included = debug_info
        .entries
        .iter()
        .filter(|e| e.included && !e.is_dir)
        .count();
    println!(
        "{} {} files would be collected.",
        "Summary:".bold(),
        included.to_string().cyan()
    );
    println!("{}", "\n--- End Debug Info ---".green().bold());
    Ok(())
}
