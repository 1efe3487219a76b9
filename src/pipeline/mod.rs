//! Acquisition pipeline.
//!
//! For each track: search, validate duration, pick a stream, validate size,
//! download, transcode, delete the intermediate. Progress lines are printed
//! to stdout as each phase starts; diagnostics go through `tracing`.

mod batch;
#[cfg(test)]
mod fakes;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::AcquireConfig;
use crate::error::{Result, TraknabError};
use crate::platform::{StreamDownloader, Transcoder, VideoSearch};
use crate::signal::CancelToken;
use crate::types::{format_duration, select_audio_stream, TrackRequest};

pub use batch::BatchSummary;

/// Why a track was skipped without stopping the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The top search result is longer than the configured limit.
    TooLong { duration_secs: u64, limit_secs: u64 },
    /// Neither the search listing nor the full extraction reported a length.
    UnknownDuration,
    /// The selected stream is smaller than the configured floor.
    TooSmall { size_mb: f64, limit_mb: f64 },
    /// The search returned nothing.
    NoResults { query: String },
    /// The top result has no audio-only stream in the wanted container.
    NoAudioStream { container: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooLong {
                duration_secs,
                limit_secs,
            } => write!(
                f,
                "Unexpectedly long track ({} > {}). Skipping...",
                format_duration(*duration_secs),
                format_duration(*limit_secs)
            ),
            Rejection::UnknownDuration => {
                write!(f, "Track length unknown. Skipping...")
            }
            Rejection::TooSmall { size_mb, limit_mb } => write!(
                f,
                "Unexpectedly small file size ({}MB < {}MB). Skipping...",
                size_mb, limit_mb
            ),
            Rejection::NoResults { query } => {
                write!(f, "No search results for \"{}\". Skipping...", query)
            }
            Rejection::NoAudioStream { container } => {
                write!(f, "No {} audio stream available. Skipping...", container)
            }
        }
    }
}

/// Result of processing one track that did not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The durable output now exists at `output`.
    Acquired { output: PathBuf },
    /// `output` already existed; nothing was searched or downloaded.
    AlreadyAcquired { output: PathBuf },
    Rejected(Rejection),
}

/// Runs the acquisition pipeline against a set of collaborators.
pub struct Acquirer<S, D, T> {
    config: AcquireConfig,
    search: S,
    downloader: D,
    transcoder: T,
    cancel: CancelToken,
}

impl<S, D, T> Acquirer<S, D, T>
where
    S: VideoSearch,
    D: StreamDownloader,
    T: Transcoder,
{
    pub fn new(
        config: AcquireConfig,
        search: S,
        downloader: D,
        transcoder: T,
        cancel: CancelToken,
    ) -> Self {
        Self {
            config,
            search,
            downloader,
            transcoder,
            cancel,
        }
    }

    /// Processes one track request.
    ///
    /// Rejections and already-acquired tracks are `Ok`; only conditions that
    /// should stop the batch are `Err`. On a transcode failure the
    /// intermediate file is left in place.
    pub fn process(&self, request: &TrackRequest) -> Result<Outcome> {
        let root = self.config.download_root.as_path();
        self.ensure_target_dir(request, root)?;

        let output = request.output_path(root, &self.config.audio_format);
        if output.is_file() {
            debug!(output = %output.display(), "already acquired");
            return Ok(Outcome::AlreadyAcquired { output });
        }

        let query = request.search_term();
        debug!(artist = request.artist(), title = request.title(), %query, "acquiring");
        println!("Searching for \"{}\"...", request.label());
        self.cancel.check()?;

        let Some(top) = self.search.search(&query)?.into_iter().next() else {
            return Ok(Outcome::Rejected(Rejection::NoResults { query }));
        };
        println!("Obtained result: \"{}\"", top.title);
        debug!(id = %top.id, url = %top.url, "top search result");

        // The flat listing's length, when present, rejects before extraction
        if let Some(rejection) = top.duration_secs.and_then(|d| self.check_duration(d)) {
            return Ok(Outcome::Rejected(rejection));
        }

        let info = self.search.media_info(&top)?;
        let Some(duration_secs) = info.duration_secs.or(top.duration_secs) else {
            return Ok(Outcome::Rejected(Rejection::UnknownDuration));
        };
        // The extraction's length wins when it disagrees with the listing
        if Some(duration_secs) != top.duration_secs {
            if let Some(rejection) = self.check_duration(duration_secs) {
                return Ok(Outcome::Rejected(rejection));
            }
        }

        let Some(stream) = select_audio_stream(&info.streams, &self.config.container) else {
            return Ok(Outcome::Rejected(Rejection::NoAudioStream {
                container: self.config.container.clone(),
            }));
        };

        let size_mb = stream.size_mb();
        println!("File size: {}MB", size_mb);

        if size_mb < self.config.min_size_mb {
            return Ok(Outcome::Rejected(Rejection::TooSmall {
                size_mb,
                limit_mb: self.config.min_size_mb,
            }));
        }

        let intermediate = request.intermediate_path(root, &self.config.container);
        println!("Downloading...");
        self.cancel.check()?;
        let bytes = self
            .downloader
            .download(stream, &intermediate, self.config.timeout())?;
        println!("Download complete.");
        info!(format = %stream.format_id, bytes, "stream downloaded");

        self.cancel.check()?;
        self.transcoder.transcode(&intermediate, &output)?;

        fs::remove_file(&intermediate).map_err(|e| {
            TraknabError::io(format!("Failed to delete {}", intermediate.display()), e)
        })?;

        Ok(Outcome::Acquired { output })
    }

    /// Prints the track length and rejects it if over the limit.
    fn check_duration(&self, duration_secs: u64) -> Option<Rejection> {
        println!("Track length: {}", format_duration(duration_secs));
        (duration_secs > self.config.max_duration_secs).then(|| Rejection::TooLong {
            duration_secs,
            limit_secs: self.config.max_duration_secs,
        })
    }

    fn ensure_target_dir(&self, request: &TrackRequest, root: &Path) -> Result<()> {
        let dir = request.target_path(root);
        if dir.is_dir() {
            return Ok(());
        }
        println!(
            "Directory {} does not exist in {}. Creating...",
            request.target_dir(),
            root.display()
        );
        fs::create_dir_all(&dir)
            .map_err(|e| TraknabError::io(format!("Failed to create {}", dir.display()), e))
    }

    /// Best-effort removal of a request's partially downloaded file.
    fn remove_intermediate(&self, request: &TrackRequest) {
        let path = request.intermediate_path(&self.config.download_root, &self.config.container);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed partial download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove partial download"),
        }
    }
}
