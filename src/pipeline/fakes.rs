//! In-memory collaborators for pipeline tests.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TraknabError};
use crate::platform::{StreamDownloader, Transcoder, VideoSearch};
use crate::signal::CancelToken;
use crate::types::{AudioStream, MediaInfo, SearchResult};

/// Search fake returning one result per query with fixed duration and size.
pub struct FakeSearch {
    /// Length in the search listing.
    pub duration_secs: Option<u64>,
    /// Length reported by the full extraction.
    pub extracted_duration_secs: Option<u64>,
    /// Queries whose top result is an hour long.
    pub long_queries: Vec<&'static str>,
    pub size_bytes: u64,
    pub container: String,
    pub empty: bool,
    pub queries: RefCell<Vec<String>>,
    pub stream_calls: Cell<usize>,
}

impl Default for FakeSearch {
    fn default() -> Self {
        Self {
            duration_secs: Some(240),
            extracted_duration_secs: None,
            long_queries: Vec::new(),
            size_bytes: 4_200_000,
            container: "webm".to_string(),
            empty: false,
            queries: RefCell::new(Vec::new()),
            stream_calls: Cell::new(0),
        }
    }
}

impl FakeSearch {
    pub fn calls(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl VideoSearch for FakeSearch {
    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.queries.borrow_mut().push(query.to_string());
        if self.empty {
            return Ok(Vec::new());
        }
        let id = format!("vid{}", self.calls());
        let duration_secs = if self.long_queries.iter().any(|q| *q == query) {
            Some(3600)
        } else {
            self.duration_secs
        };
        Ok(vec![
            SearchResult {
                url: format!("https://video.example/watch?v={}", id),
                id,
                title: format!("{} (Official Audio)", query),
                duration_secs,
            },
            SearchResult {
                id: "runner-up".to_string(),
                title: format!("{} (Live)", query),
                duration_secs: duration_secs.map(|d| d * 2),
                url: "https://video.example/watch?v=runner-up".to_string(),
            },
        ])
    }

    fn media_info(&self, result: &SearchResult) -> Result<MediaInfo> {
        self.stream_calls.set(self.stream_calls.get() + 1);
        let streams = vec![
            AudioStream {
                format_id: "low".to_string(),
                container: self.container.clone(),
                codec: Some("opus".to_string()),
                abr_kbps: Some(48.0),
                filesize_bytes: Some(self.size_bytes / 3),
                url: format!("{}&f=low", result.url),
                audio_only: true,
            },
            AudioStream {
                format_id: "best".to_string(),
                container: self.container.clone(),
                codec: Some("opus".to_string()),
                abr_kbps: Some(160.0),
                filesize_bytes: Some(self.size_bytes),
                url: format!("{}&f=best", result.url),
                audio_only: true,
            },
        ];
        Ok(MediaInfo {
            duration_secs: self.extracted_duration_secs,
            streams,
        })
    }
}

/// How the download fake should behave on the Nth call (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFault {
    /// Writes half the payload, then reports a connection reset.
    ResetOn(usize),
    /// Writes half the payload, cancels the token, then reports cancellation.
    CancelOn(usize),
    /// Fails with a timeout.
    TimeoutOn(usize),
}

/// Download fake writing a small payload to the destination.
#[derive(Default)]
pub struct FakeDownloader {
    pub fault: Option<DownloadFault>,
    pub cancel: CancelToken,
    pub dests: RefCell<Vec<PathBuf>>,
    pub formats: RefCell<Vec<String>>,
}

impl FakeDownloader {
    pub fn calls(&self) -> usize {
        self.dests.borrow().len()
    }
}

impl StreamDownloader for FakeDownloader {
    fn download(&self, stream: &AudioStream, dest: &Path, _timeout: Duration) -> Result<u64> {
        self.dests.borrow_mut().push(dest.to_path_buf());
        self.formats.borrow_mut().push(stream.format_id.clone());
        let call = self.calls();

        match self.fault {
            Some(DownloadFault::ResetOn(n)) if n == call => {
                std::fs::write(dest, b"part").map_err(|e| TraknabError::io("fake", e))?;
                let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
                Err(TraknabError::connection_reset(reset))
            }
            Some(DownloadFault::CancelOn(n)) if n == call => {
                std::fs::write(dest, b"part").map_err(|e| TraknabError::io("fake", e))?;
                self.cancel.cancel();
                Err(TraknabError::cancelled())
            }
            Some(DownloadFault::TimeoutOn(n)) if n == call => {
                Err(TraknabError::download_failed("operation timed out"))
            }
            _ => {
                std::fs::write(dest, b"media").map_err(|e| TraknabError::io("fake", e))?;
                Ok(5)
            }
        }
    }
}

/// Transcode fake copying input to output.
#[derive(Default)]
pub struct FakeTranscoder {
    pub fail: bool,
    pub outputs: RefCell<Vec<PathBuf>>,
}

impl FakeTranscoder {
    pub fn calls(&self) -> usize {
        self.outputs.borrow().len()
    }
}

impl Transcoder for FakeTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        self.outputs.borrow_mut().push(output.to_path_buf());
        if self.fail {
            return Err(TraknabError::transcode_failed("unsupported codec"));
        }
        std::fs::copy(input, output).map_err(|e| TraknabError::io("fake", e))?;
        Ok(())
    }
}
