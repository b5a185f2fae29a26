//! ClangBuiltLinux CI helper entrypoint.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;


use commands::{Commands, ConfigCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "cbl-ci")]
#[command(author, version, about = "ClangBuiltLinux CI helpers", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the CI repository checkout
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            tree,
            llvm_version,
            stdout,
        } => {
            handlers::generate(&config, &cli.root, &tree, llvm_version, stdout)?;
        }
        Commands::ShouldRun => {
            let outcome = handlers::should_run(&config);
            return Ok(ExitCode::from(outcome.exit_code() as u8));
        }
        Commands::BootTest {
            kernel_url,
            workdir,
        } => handlers::boot_test(&kernel_url, workdir)?,
        Commands::WorkflowRef => handlers::workflow_ref()?,
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config, cli.config.as_deref())?,
            ConfigCommands::Set { key, value } => {
                handlers::set_config(config, cli.config.as_deref(), &key, &value)?
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
