pub mod commands;
pub mod render;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One JSON document on stdout, as Ansible expects
    #[default]
    Json,
    /// Colored summary for running the module by hand
    Human,
}

#[derive(Parser)]
#[command(
    name = "uv-pip",
    version,
    about = "Ansible module that manages Python library dependencies with Astral uv",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Module arguments file written by Ansible (JSON)
    pub args_file: Option<PathBuf>,

    #[command(flatten)]
    pub options: ModuleOptions,

    /// Host defaults file (default: $UV_PIP_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone, Copy, Debug, Default)]
pub struct ModuleOptions {
    /// Run in check mode regardless of what the arguments file says
    #[arg(long)]
    pub check: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate module arguments and print the commands that would run
    Plan {
        /// Module arguments file (JSON)
        args_file: PathBuf,

        /// Plan for check mode
        #[arg(long)]
        check: bool,
    },

    /// Check that uv and a Python interpreter can be found
    Doctor,
}

pub async fn run(cli: Cli) -> crate::core::error::Result<()> {
    match (cli.command, cli.args_file) {
        (Some(Commands::Plan { args_file, check }), _) => {
            commands::plan::execute(args_file, check, cli.config).await
        }

        (Some(Commands::Doctor), _) => commands::doctor::execute(cli.config).await,

        (None, Some(args_file)) => commands::module::execute(args_file, cli.options, cli.config).await,

        (None, None) => Err(crate::core::error::UvPipError::ArgsFile(
            "no arguments file given; Ansible runs this module as `uv-pip <ARGS_FILE>`"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ansible_invocation() {
        let cli = Cli::try_parse_from(["uv-pip", "/tmp/args.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.args_file, Some(PathBuf::from("/tmp/args.json")));
        assert_eq!(cli.options.format, OutputFormat::Json);
        assert!(!cli.options.check);
    }

    #[test]
    fn parses_manual_flags() {
        let cli =
            Cli::try_parse_from(["uv-pip", "--check", "--format", "human", "args.json"]).unwrap();
        assert!(cli.options.check);
        assert_eq!(cli.options.format, OutputFormat::Human);
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["uv-pip", "plan", "args.json", "--check"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Plan { check: true, .. })
        ));

        let cli = Cli::try_parse_from(["uv-pip", "doctor", "--config", "/etc/uv-pip.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Doctor)));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/uv-pip.toml")));
    }
}
