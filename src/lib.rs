//! traknab: batch audio track downloader.
//!
//! Reads a TOML tracklist of genre → artist → titles, searches a video
//! platform for each track, downloads the best audio stream and transcodes
//! it into the download root.
//!
//! # Modules
//!
//! - [`types`]: Core data types (TrackRequest, Tracklist, SearchResult, AudioStream)
//! - [`pipeline`]: The acquisition pipeline and batch loop (Acquirer, Outcome)
//! - [`platform`]: Search/download/transcode traits and the yt-dlp, HTTP and ffmpeg backends
//! - [`config`]: Runtime configuration (AcquireConfig)
//! - [`signal`]: Cooperative cancellation (CancelToken)
//! - [`error`]: Error types and codes (TraknabError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use traknab::{
//!     platform::{Ffmpeg, HttpDownloader, YtDlp},
//!     Acquirer, AcquireConfig, CancelToken, Tracklist,
//! };
//!
//! let config = AcquireConfig::from_env();
//! let cancel = CancelToken::new();
//! let acquirer = Acquirer::new(
//!     config.clone(),
//!     YtDlp::new(&config.yt_dlp_path, config.search_limit, config.timeout(), cancel.clone()),
//!     HttpDownloader::new(cancel.clone()),
//!     Ffmpeg::new(&config.ffmpeg_path, cancel.clone()),
//!     cancel,
//! );
//! let summary = acquirer.run_batch(&Tracklist::load(&config.tracks_path)?)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod signal;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use config::AcquireConfig;
pub use error::{ErrorCode, Result, TraknabError};
pub use pipeline::{Acquirer, BatchSummary, Outcome, Rejection};
pub use signal::CancelToken;
pub use types::{AudioStream, MediaInfo, SearchResult, TrackRequest, Tracklist};
