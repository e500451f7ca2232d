mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "restack", about = "Migrate a flat wiki export into a hierarchical book", version)]
struct Cli {
    /// Migration settings file (TOML); defaults describe a standard export
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PolicyArg {
    Shift,
    Reset,
}

impl From<PolicyArg> for restack_lib::HeadingPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Shift => Self::Shift,
            PolicyArg::Reset => Self::Reset,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Migrate an export directory into a new target directory
    Migrate {
        /// Export directory holding index.md and the flat pages
        source: PathBuf,
        /// Directory receiving the hierarchical tree
        target: PathBuf,
    },

    /// Show the page hierarchy described by an export's index
    Tree {
        /// Export directory holding index.md
        source: PathBuf,
    },

    /// Reconcile heading levels of a single markdown file
    Headings {
        /// Markdown file
        file: PathBuf,
        /// What a repeated top-level heading does (default: from config)
        #[arg(long)]
        policy: Option<PolicyArg>,
        /// Rewrite the file instead of printing the result
        #[arg(long)]
        in_place: bool,
    },

    /// Manual replacement files for post-migration edits
    #[command(subcommand)]
    Replacements(ReplacementsCommand),
}

#[derive(Subcommand)]
enum ReplacementsCommand {
    /// Turn grep output (`page.md:text` lines) into a change file
    Generate {
        /// File holding the grep output
        grep_output: PathBuf,
        /// Change file to write (JSON)
        output: PathBuf,
    },

    /// Apply a change file to a migrated tree
    Execute {
        /// Change file (JSON)
        changes: PathBuf,
        /// Root of the migrated tree
        target: PathBuf,
    },

    /// List changes whose new text is missing from a migrated tree
    Check {
        /// Change file (JSON)
        changes: PathBuf,
        /// Root of the migrated tree
        target: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.config.as_deref())?;

    match cli.command {
        Command::Migrate { source, target } => {
            commands::migrate::run(&app, &source, &target, &cli.format, use_color)?;
        }
        Command::Tree { source } => {
            commands::tree::run(&app, &source, &cli.format, use_color)?;
        }
        Command::Headings { file, policy, in_place } => {
            let policy = policy
                .map(Into::into)
                .unwrap_or(app.config.heading_policy);
            commands::headings::run(&file, policy, in_place, use_color)?;
        }
        Command::Replacements(subcmd) => match subcmd {
            ReplacementsCommand::Generate { grep_output, output } => {
                commands::replacements::run_generate(&app, &grep_output, &output)?;
            }
            ReplacementsCommand::Execute { changes, target } => {
                commands::replacements::run_execute(&changes, &target, &cli.format, use_color)?;
            }
            ReplacementsCommand::Check { changes, target } => {
                commands::replacements::run_check(&changes, &target, &cli.format, use_color)?;
            }
        },
    }

    Ok(())
}
