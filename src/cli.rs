use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clipexport")]
#[command(
    author,
    version,
    about = "Rebuild a playable video from a recorded DASH clip directory"
)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Clip directory containing the manifest and chunk files
    #[arg(required = true, value_parser = existing_dir)]
    pub input_dir: Option<PathBuf>,

    /// Output file, or a directory to place <INPUT_DIR name>.mp4 in
    pub output: Option<PathBuf>,

    /// Delete each chunk as soon as it has been joined
    #[arg(short, long)]
    pub compact: bool,

    /// Leave out representations whose init chunk is missing instead of failing
    #[arg(long)]
    pub skip_missing_init: bool,

    /// Show what would be exported without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the representations of a clip and the segments found on disk
    Inspect {
        /// Clip directory to inspect
        #[arg(value_parser = existing_dir)]
        input_dir: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,
}

fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_dir() {
        return Err(format!("'{}' is not an existing directory", value));
    }
    if std::fs::read_dir(&path).is_err() {
        return Err(format!("'{}' is not readable", value));
    }
    Ok(path)
}
