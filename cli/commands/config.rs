use crate::cli_args::ConfigArgs;
use crate::output;
use anyhow::{Context, Result};
use codecollect_core::Config;
use codecollect_core::config::DEFAULT_CONFIG_FILENAME;
use colored::*;
use std::env;

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    let content = Config::default()
        .to_toml_string()
        .context("Failed to serialize default configuration")?;

    if !args.save {
        print!("{}", content);
        return Ok(());
    }

    let save_path = env::current_dir()
        .context("Failed to determine current directory")?
        .join(DEFAULT_CONFIG_FILENAME);

    if save_path.exists() && !output::confirm_overwrite(&save_path, quiet)? {
        println!("Save cancelled.");
        return Ok(());
    }

    output::write_to_file(&save_path, &content)?;
    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
