use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vid2aud")]
#[command(author, version, about = "Save the audio of YouTube videos as MP3")]
#[command(propagate_version = true)]
#[command(after_help = "Run without arguments to enter a single URL interactively.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// File with one YouTube URL per line (shorthand for `batch <LIST>`)
    #[arg(value_name = "LIST")]
    pub list: Option<PathBuf>,

    #[command(flatten)]
    pub options: RunOptions,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every URL listed in a file
    Batch {
        /// File containing URLs (one per line)
        #[arg(value_name = "LIST")]
        input: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Check that yt-dlp and FFmpeg are available
    Doctor,

    /// Show configuration
    Config,
}

#[derive(clap::Args, Clone, Debug, Default)]
pub struct RunOptions {
    /// Output directory (defaults to output.directory from the config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON report of every job to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}
