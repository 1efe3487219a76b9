//! Error types for traknab.
//!
//! Recoverable per-track conditions (already acquired, rejected) are not
//! errors; they are reported through [`crate::pipeline::Outcome`]. Everything
//! here either stops the whole batch or aborts startup.

use std::fmt;

/// Error codes identifying why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A track request had an empty artist, title or target directory.
    InvalidRequest,

    /// Startup configuration is unusable.
    /// Trigger: missing download root, tracklist not a `.toml` file, bad threshold.
    InvalidConfig,

    /// The tracklist file could not be parsed into genre → artist → titles.
    InvalidTracklist,

    /// The search collaborator failed (yt-dlp missing, non-zero exit, bad JSON).
    SearchFailed,

    /// The stream download failed for a reason other than an interruption.
    /// Trigger: timeout, HTTP error status, disk full.
    DownloadFailed,

    /// The transcoder failed to produce the output file.
    TranscodeFailed,

    /// The user cancelled the run or the connection was reset mid-transfer.
    Interrupted,

    /// Local filesystem error outside of download/transcode.
    Io,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "INVALID_REQUEST",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::InvalidTracklist => "INVALID_TRACKLIST",
            ErrorCode::SearchFailed => "SEARCH_FAILED",
            ErrorCode::DownloadFailed => "DOWNLOAD_FAILED",
            ErrorCode::TranscodeFailed => "TRANSCODE_FAILED",
            ErrorCode::Interrupted => "INTERRUPTED",
            ErrorCode::Io => "IO",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => {
                "Make sure every genre, artist and title in the tracklist is non-empty"
            }
            ErrorCode::InvalidConfig => {
                "Check --download-root points at an existing directory and \
                 --tracks at an existing .toml file"
            }
            ErrorCode::InvalidTracklist => {
                "The tracklist must map genre tables to artist keys holding arrays \
                 of titles (strings or {title, search} tables)"
            }
            ErrorCode::SearchFailed => {
                "Check that yt-dlp is installed and up to date (yt-dlp -U), \
                 or point --yt-dlp at a working binary"
            }
            ErrorCode::DownloadFailed => {
                "Check internet connection and disk space, or raise --timeout"
            }
            ErrorCode::TranscodeFailed => {
                "Check that ffmpeg is installed, or point --ffmpeg at a working binary. \
                 The downloaded file was kept for inspection"
            }
            ErrorCode::Interrupted => "Run again to resume; finished tracks are skipped",
            ErrorCode::Io => "Check permissions on the download root",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for traknab operations.
#[derive(Debug)]
pub struct TraknabError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TraknabError {
    /// Creates a new TraknabError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new TraknabError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, reason)
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfig, reason)
    }

    pub fn invalid_tracklist(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidTracklist,
            format!("Invalid tracklist: {}", reason.into()),
        )
    }

    pub fn search_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SearchFailed,
            format!("Search failed: {}", reason.into()),
        )
    }

    pub fn download_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::DownloadFailed,
            format!("Download failed: {}", reason.into()),
        )
    }

    pub fn transcode_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::TranscodeFailed,
            format!("Transcode failed: {}", reason.into()),
        )
    }

    /// Creates an INTERRUPTED error for a user-initiated cancellation.
    pub fn cancelled() -> Self {
        Self::new(ErrorCode::Interrupted, "Cancelled by user")
    }

    /// Creates an INTERRUPTED error for a connection reset by the remote end.
    pub fn connection_reset(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::with_source(ErrorCode::Interrupted, "Connection reset", source)
    }

    /// Wraps a filesystem error with the path it happened on.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Io, context, source)
    }

    /// Returns true if this error should stop the batch after cleanup.
    pub fn is_interruption(&self) -> bool {
        self.code == ErrorCode::Interrupted
    }
}

impl fmt::Display for TraknabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        write!(f, ". Recovery: {}", self.code.recovery_hint())
    }
}

impl std::error::Error for TraknabError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Returns true if any error in the chain is an I/O connection reset.
///
/// reqwest and hyper bury the `io::Error` a few levels deep, so the whole
/// source chain is walked.
pub fn is_connection_reset(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// Result type alias using TraknabError.
pub type Result<T> = std::result::Result<T, TraknabError>;
