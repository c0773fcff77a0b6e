use crate::cli_args::CollectArgs;
use crate::load_config_for_command;
use crate::output;
use anyhow::{Context, Result};
use codecollect_core as core;
use std::env;

pub fn handle_collect_command(args: CollectArgs, quiet: bool) -> Result<()> {
    let cwd = env::current_dir().context("Failed to determine current directory")?;
    let config = load_config_for_command(&cwd, &args.run)
        .context("Failed to load configuration")?;

    let requested = config.resolve_source_folder(args.run.project_config.source.as_deref())?;
    let source = core::locate_source(&requested)
        .with_context(|| format!("Cannot collect from '{}'", requested.display()))?;
    log::info!("Source folder resolved: {}", source.display());

    let target = config
        .resolve_output_target(&source)
        .context("Failed to resolve output location")?;
    let rules = config.exclusion_rules();
    let options = config.collect_options();

    let summary = core::collect_to_file(&source, &rules, &options, &target.file)
        .with_context(|| format!("Failed to collect '{}'", source.display()))?;

    output::print_collect_report(&target, &summary, quiet);
    Ok(())
}
