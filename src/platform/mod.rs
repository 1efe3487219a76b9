//! External collaborators: search, download and transcode.
//!
//! The pipeline only talks to these traits. Production implementations shell
//! out to `yt-dlp` and `ffmpeg` and stream media over HTTP with reqwest; tests
//! substitute in-memory fakes.

mod downloader;
mod ffmpeg;
mod ytdlp;

use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::Duration;

use crate::error::Result;
use crate::types::{AudioStream, MediaInfo, SearchResult};

pub use downloader::HttpDownloader;
pub use ffmpeg::Ffmpeg;
pub use ytdlp::YtDlp;

/// Free-text search against the video platform.
pub trait VideoSearch {
    /// Returns candidates in the platform's ranking order. May be empty.
    fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Runs a full extraction of a result: its streams and its length.
    fn media_info(&self, result: &SearchResult) -> Result<MediaInfo>;
}

/// Fetches a stream to disk.
pub trait StreamDownloader {
    /// Writes the stream to `dest`, returning the number of bytes written.
    ///
    /// Connection resets and cancellation must surface as `INTERRUPTED`.
    fn download(&self, stream: &AudioStream, dest: &Path, timeout: Duration) -> Result<u64>;
}

/// Converts a downloaded media file into the durable audio format.
pub trait Transcoder {
    /// Produces `output` from `input`. The input is left untouched.
    fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

impl<T: VideoSearch + ?Sized> VideoSearch for &T {
    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        (**self).search(query)
    }

    fn media_info(&self, result: &SearchResult) -> Result<MediaInfo> {
        (**self).media_info(result)
    }
}

impl<T: StreamDownloader + ?Sized> StreamDownloader for &T {
    fn download(&self, stream: &AudioStream, dest: &Path, timeout: Duration) -> Result<u64> {
        (**self).download(stream, dest, timeout)
    }
}

impl<T: Transcoder + ?Sized> Transcoder for &T {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        (**self).transcode(input, output)
    }
}

/// Returns true if `program --version` runs and exits successfully.
pub fn tool_available(program: &Path, version_flag: &str) -> bool {
    Command::new(program)
        .arg(version_flag)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// True if a child process died from SIGINT or exited with the shell's 130.
///
/// Children share our terminal, so Ctrl+C can kill them before the listener
/// thread has flipped the cancel token.
pub(crate) fn interrupted_exit(status: &ExitStatus) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(2) {
            return true;
        }
    }
    status.code() == Some(130)
}
