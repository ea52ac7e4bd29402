use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recconv")]
#[command(author, version, about = "Convert recorded MOV files to H.264/AAC M4V")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Queue MOV files and convert them one after another
    Convert {
        /// Files to convert
        files: Vec<PathBuf>,

        /// Keep reading more paths from stdin, one per line
        #[arg(long)]
        stdin: bool,
    },

    /// Check that the transcoding engine is available
    CheckTools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        file: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
