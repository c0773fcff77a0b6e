mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::path::Path;
use std::process;

use cli_args::{Cli, Commands, RunOpts};
use codecollect_core::{AppError, Config, EntryOrder, ReadErrorPolicy};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = exit_code_for(&e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::SourceNotFound { .. }) => 2,
        Some(AppError::FileRead { .. }) => 3,
        Some(AppError::FileDecode { .. }) => 3,
        Some(AppError::FileWrite { .. }) => 3,
        Some(AppError::DirCreation { .. }) => 3,
        Some(AppError::WalkDir(_)) => 3,
        Some(AppError::Io(_)) => 3,
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::InvalidArgument(_)) => 1,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Collect(args) => {
                log::debug!("Executing 'collect' command...");
                commands::collect::handle_collect_command(args, quiet)?;
            }
            Commands::Debug(args) => {
                log::debug!("Executing 'debug' command...");
                commands::debug::handle_debug_command(args)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args, quiet)?;
            }
        },
    }
    Ok(())
}

fn merge_config_with_cli_overrides(mut config: Config, opts: &RunOpts) -> Config {
    log::trace!("Applying CLI overrides to config...");

    // Output overrides
    if let Some(name) = &opts.output.output_folder_name {
        config.general.output_folder_name = Some(name.clone());
    }
    if let Some(name) = &opts.output.output_file_name {
        config.general.output_file_name = name.clone();
    }
    if let Some(root) = &opts.output.output_root {
        config.general.output_root = Some(root.clone());
    }

    // Exclusion overrides: replace the configured set unless asked to extend it
    let extend = opts.exclusions.extend_exclusions;
    let extensions: Vec<String> = opts
        .exclusions
        .exclude_ext
        .iter()
        .map(|ext| normalize_extension(ext))
        .collect();
    apply_list(&mut config.exclusions.dirs, &opts.exclusions.exclude_dir, extend);
    apply_list(&mut config.exclusions.files, &opts.exclusions.exclude_file, extend);
    apply_list(&mut config.exclusions.extensions, &extensions, extend);
    apply_list(
        &mut config.exclusions.nested,
        &opts.exclusions.exclude_nested,
        extend,
    );

    // Traversal toggles
    if opts.walk.native_order {
        config.walk.entry_order = EntryOrder::Native;
    }
    if opts.walk.name_order {
        config.walk.entry_order = EntryOrder::Name;
    }
    if opts.walk.follow_symlinks {
        config.walk.follow_symlinks = true;
    }
    if opts.walk.no_follow_symlinks {
        config.walk.follow_symlinks = false;
    }
    if opts.walk.skip_unreadable {
        config.walk.on_read_error = ReadErrorPolicy::Skip;
    }
    if opts.walk.abort_on_unreadable {
        config.walk.on_read_error = ReadErrorPolicy::Abort;
    }

    log::trace!("Config after CLI overrides: {:?}", config);
    config
}

fn apply_list<T: Clone + PartialEq>(target: &mut Vec<T>, values: &[T], extend: bool) {
    if values.is_empty() {
        return;
    }
    if extend {
        for value in values {
            if !target.contains(value) {
                target.push(value.clone());
            }
        }
    } else {
        *target = values.to_vec();
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Loads the config file (if any) relative to `base_dir` and applies CLI overrides.
pub fn load_config_for_command(base_dir: &Path, opts: &RunOpts) -> Result<Config> {
    let config_path = Config::resolve_config_path(
        base_dir,
        opts.project_config.config.as_ref(),
        opts.project_config.no_config,
    )
    .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    Ok(merge_config_with_cli_overrides(config, opts))
}
