//! selfrun-glue
//!
//! Turns a Lua script into a standalone executable by gluing it onto the
//! `selfrun` launcher, and takes such executables apart again.

use clap::{Parser, Subcommand};
use selfrun_cli::commands::{extract, glue, inspect};
use selfrun_cli::output::{resolve_color_choice, StyledOutput};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "selfrun-glue")]
#[command(about = "Build self-running Lua executables", long_about = None)]
#[command(version)]
struct Cli {
    /// When to use colors (auto, always, never)
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Glue a script onto the launcher
    Glue {
        /// Lua source or precompiled chunk
        script: PathBuf,
        /// Executable to create
        output: PathBuf,
        /// Launcher to use (defaults to the selfrun next to this tool)
        #[arg(short, long)]
        launcher: Option<PathBuf>,
        /// Overwrite an existing output file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the payload layout of a composed executable
    Inspect {
        /// Composed executable
        file: PathBuf,
    },

    /// Write the payload of a composed executable to a file or stdout
    Extract {
        /// Composed executable
        file: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    selfrun_cli::logging::init();
    let cli = Cli::parse();
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    match cli.command {
        Commands::Glue {
            script,
            output,
            launcher,
            force,
        } => glue::execute(&script, &output, launcher.as_deref(), force, &mut out),

        Commands::Inspect { file } => inspect::execute(&file, &mut out),

        Commands::Extract { file, output } => extract::execute(&file, output.as_deref()),
    }
}
