//! CLI argument parser.
//!
//! Every flag is optional and overrides the matching `TRAKNAB_*` environment
//! variable, which in turn overrides the built-in default.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AcquireConfig;

/// traknab: download the tracks listed in a TOML file as audio files
#[derive(Parser, Debug)]
#[command(name = "traknab")]
#[command(about = "Batch-download audio tracks listed in a TOML tracklist")]
#[command(version)]
pub struct Cli {
    /// Tracklist file (genre tables of artist = [titles])
    #[arg(short, long)]
    pub tracks: Option<PathBuf>,

    /// Existing directory to download into, one subdirectory per genre
    #[arg(short, long)]
    pub download_root: Option<PathBuf>,

    /// Reject tracks longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub max_duration: Option<u64>,

    /// Reject streams smaller than this many megabytes
    #[arg(long, value_name = "MB")]
    pub min_size: Option<f64>,

    /// Download connect/read timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Seconds to sleep after each successful download
    #[arg(short, long, value_name = "SECS")]
    pub sleep: Option<u64>,

    /// Container of the audio stream to download
    #[arg(long)]
    pub container: Option<String>,

    /// Extension of the output audio files
    #[arg(short, long)]
    pub audio_format: Option<String>,

    /// Number of search candidates to request
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=50))]
    pub search_limit: Option<u64>,

    /// Path to the yt-dlp executable
    #[arg(long, value_name = "PATH")]
    pub yt_dlp: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Check tools and configuration, then exit
    #[arg(long)]
    pub check: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Applies the flags that were given on top of `config`.
    pub fn apply(&self, mut config: AcquireConfig) -> AcquireConfig {
        if let Some(ref path) = self.tracks {
            config.tracks_path = path.clone();
        }
        if let Some(ref path) = self.download_root {
            config.download_root = path.clone();
        }
        if let Some(secs) = self.max_duration {
            config.max_duration_secs = secs;
        }
        if let Some(mb) = self.min_size {
            config.min_size_mb = mb;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        if let Some(secs) = self.sleep {
            config.sleep_secs = secs;
        }
        if let Some(ref container) = self.container {
            config.container = container.to_lowercase();
        }
        if let Some(ref format) = self.audio_format {
            config.audio_format = format.to_lowercase();
        }
        if let Some(limit) = self.search_limit {
            config.search_limit = limit as usize;
        }
        if let Some(ref path) = self.yt_dlp {
            config.yt_dlp_path = path.clone();
        }
        if let Some(ref path) = self.ffmpeg {
            config.ffmpeg_path = path.clone();
        }
        config
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "traknab=debug"
        } else {
            "traknab=warn"
        }
    }
}
