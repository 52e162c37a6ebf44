//! CLI module for tubequery.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// tubequery - ask questions about YouTube videos
///
/// Indexes video transcripts and answers questions about them with
/// timestamped citations back into the video.
#[derive(Parser, Debug)]
#[command(name = "tubequery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "TUBEQUERY_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, chunk, embed, and index a video transcript
    Ingest {
        /// YouTube URL, video ID, or path to a JSON transcript file
        input: String,

        /// Re-index even if the video is already indexed
        #[arg(short, long)]
        force: bool,
    },

    /// Ask a question about an indexed video
    Ask {
        /// Video ID
        video_id: String,

        /// The question to ask
        question: String,

        /// Number of excerpts to retrieve (defaults to retrieval.top_k)
        #[arg(short = 'k', long = "top-k")]
        k: Option<usize>,
    },

    /// Summarize an indexed video
    Summarize {
        /// Video ID
        video_id: String,
    },

    /// Show the transcript around a moment in the video
    Context {
        /// Video ID
        video_id: String,

        /// Position in the video, in seconds
        seconds: f64,

        /// Seconds to include on each side (defaults to retrieval.window_seconds)
        #[arg(short, long)]
        window: Option<f64>,
    },

    /// List indexed videos
    List,

    /// Remove a video from the index
    Remove {
        /// Video ID
        video_id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
