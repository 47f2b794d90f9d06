//! CLI module for Skriv.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Skriv - Chunked Audio Transcription
///
/// Transcribe MP3/WAV voice notes with AssemblyAI. Large files are split into
/// chunks automatically. The name "Skriv" comes from the Norwegian/Scandinavian
/// word for "write."
#[derive(Parser, Debug)]
#[command(name = "skriv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe a local MP3/WAV file
    Transcribe {
        /// Path to the audio file
        file: String,

        /// AssemblyAI API key
        #[arg(long, env = "ASSEMBLYAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Write the transcript as a Word document to this path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Start the web form for uploading and transcribing audio
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
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

    /// Write a default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}
