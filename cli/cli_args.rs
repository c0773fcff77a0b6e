use clap::{Args, Parser, Subcommand};
use codecollect_core::NestedPair;
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Default)]
pub struct ProjectConfigOpts {
    #[arg(
        value_name = "SOURCE",
        env = "CODECOLLECT_SOURCE",
        help = "Source folder to collect (overrides `general.source_folder`).",
        help_heading = "Project Setup"
    )]
    pub source: Option<PathBuf>,

    #[arg(
        long,
        help = "Specify path/filename of the TOML config file (default: ./codecollect.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config",
        help_heading = "Project Setup"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "Disable loading any TOML config file.",
        conflicts_with = "config",
        help_heading = "Project Setup"
    )]
    pub no_config: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    #[arg(
        long,
        value_name = "NAME",
        help = "Output folder name (default: derived from the source path).",
        help_heading = "Output Control"
    )]
    pub output_folder_name: Option<String>,

    #[arg(
        long,
        value_name = "FILE_NAME",
        help = "Aggregate file name [default: all_code.txt].",
        help_heading = "Output Control"
    )]
    pub output_file_name: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory the output folder is created in [default: current dir, not the binary's location].",
        help_heading = "Output Control"
    )]
    pub output_root: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ExclusionOverrides {
    #[arg(long = "exclude-dir", value_name = "NAME", action = clap::ArgAction::Append, help = "Directory name to exclude at any depth.", help_heading = "Exclusions")]
    pub exclude_dir: Vec<String>,
    #[arg(long = "exclude-file", value_name = "NAME", action = clap::ArgAction::Append, help = "File basename to exclude.", help_heading = "Exclusions")]
    pub exclude_file: Vec<String>,
    #[arg(long = "exclude-ext", value_name = "EXT", action = clap::ArgAction::Append, help = "File extension to exclude (e.g. '.log' or 'log').", help_heading = "Exclusions")]
    pub exclude_ext: Vec<String>,
    #[arg(long = "exclude-nested", value_name = "PARENT/CHILD", value_parser = parse_nested_pair, action = clap::ArgAction::Append, help = "Exclude CHILD only when it sits directly inside a PARENT directory.", help_heading = "Exclusions")]
    pub exclude_nested: Vec<NestedPair>,

    #[arg(
        long,
        help = "Append the exclusion flags to the configured sets instead of replacing them.",
        help_heading = "Exclusions"
    )]
    pub extend_exclusions: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WalkToggles {
    #[arg(
        long,
        help = "Process entries in directory listing order (filesystem dependent).",
        overrides_with = "name_order",
        help_heading = "Traversal"
    )]
    pub native_order: bool,
    #[arg(
        long,
        help = "Process entries sorted by name [default].",
        overrides_with = "native_order",
        help_heading = "Traversal"
    )]
    pub name_order: bool,

    #[arg(
        long,
        help = "Descend into symlinked directories.",
        overrides_with = "no_follow_symlinks",
        help_heading = "Traversal"
    )]
    pub follow_symlinks: bool,
    #[arg(
        long,
        help = "Do not descend into symlinked directories [default].",
        overrides_with = "follow_symlinks",
        help_heading = "Traversal"
    )]
    pub no_follow_symlinks: bool,

    #[arg(
        long,
        help = "Warn about unreadable or non-UTF-8 files and keep going.",
        overrides_with = "abort_on_unreadable",
        help_heading = "Traversal"
    )]
    pub skip_unreadable: bool,
    #[arg(
        long,
        help = "Stop at the first unreadable file [default].",
        overrides_with = "skip_unreadable",
        help_heading = "Traversal"
    )]
    pub abort_on_unreadable: bool,
}

/// Options shared by every command that walks a source tree.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOpts {
    #[clap(flatten)]
    pub project_config: ProjectConfigOpts,
    #[clap(flatten)]
    pub output: OutputOpts,
    #[clap(flatten)]
    pub exclusions: ExclusionOverrides,
    #[clap(flatten)]
    pub walk: WalkToggles,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Concatenate a source tree into a single annotated text file.",
    long_about = "codecollect walks a source folder depth-first, skips excluded directories, files \nand extensions, and writes every remaining file into one text file, each framed \nby a `FILE: <path>` header.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  codecollect collect ~/work/api/src\n  codecollect collect . --output-folder-name api --exclude-dir target --extend-exclusions\n  codecollect debug ./src -f json",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "c",
        about = "Collect the source tree into the aggregate file."
    )]
    Collect(CollectArgs),

    #[command(
        visible_alias = "d",
        about = "Show effective configuration and planned file inclusions."
    )]
    Debug(DebugArgs),

    #[command(about = "Show or save the default configuration file.")]
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CollectArgs {
    #[clap(flatten)]
    pub run: RunOpts,
}

#[derive(Args, Debug, Clone)]
pub struct DebugArgs {
    #[clap(flatten)]
    pub run: RunOpts,

    #[arg(short = 'f', long, help = "Output format (default: pretty text).", value_name = "FORMAT", value_parser = ["text", "json"], help_heading = "Output Formatting")]
    pub format: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        help = "Save default config to ./codecollect.toml (prompts overwrite)."
    )]
    pub save: bool,
}

fn parse_nested_pair(s: &str) -> std::result::Result<NestedPair, String> {
    s.parse::<NestedPair>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_collect_args_parse() {
        let cli = Cli::try_parse_from([
            "codecollect",
            "-v",
            "collect",
            "/work/api/src",
            "--exclude-dir",
            "target",
            "--exclude-dir",
            "vendor",
            "--exclude-nested",
            "components/ui",
            "--output-folder-name",
            "api",
            "--skip-unreadable",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Some(Commands::Collect(args)) = cli.command else {
            panic!("expected collect command");
        };
        assert_eq!(
            args.run.project_config.source,
            Some(PathBuf::from("/work/api/src"))
        );
        assert_eq!(args.run.exclusions.exclude_dir, vec!["target", "vendor"]);
        assert_eq!(
            args.run.exclusions.exclude_nested,
            vec![NestedPair::new("components", "ui")]
        );
        assert_eq!(args.run.output.output_folder_name.as_deref(), Some("api"));
        assert!(args.run.walk.skip_unreadable);
    }

    #[test]
    fn test_bad_nested_pair_is_rejected() {
        let result = Cli::try_parse_from([
            "codecollect",
            "collect",
            "src",
            "--exclude-nested",
            "justone",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_and_no_config_conflict() {
        let result = Cli::try_parse_from([
            "codecollect",
            "debug",
            "--config",
            "a.toml",
            "--no-config",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommands() {
        let names: Vec<String> = Cli::command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        assert!(names.iter().any(|n| n == "collect"));
        assert!(!names.iter().any(|n| n == "completion"));
        assert!(Cli::try_parse_from(["codecollect", "completion"]).is_err());
    }

    #[test]
    fn test_output_root_help_names_default() {
        let command = Cli::command();
        let collect = command.find_subcommand("collect").unwrap();
        let output_root = collect
            .get_arguments()
            .find(|a| a.get_id() == "output_root")
            .unwrap();
        let help = output_root.get_help().unwrap().to_string();
        assert!(help.contains("current dir"));
    }
}
