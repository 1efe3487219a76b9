//! Video platform search through the `yt-dlp` executable.
//!
//! Searching uses the `ytsearchN:` pseudo-URL with `--flat-playlist` so only
//! ids, titles and durations are fetched. Stream enumeration runs a full
//! extraction for the single chosen result.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ErrorCode, Result, TraknabError};
use crate::signal::CancelToken;
use crate::types::{AudioStream, MediaInfo, SearchResult};

use super::{interrupted_exit, VideoSearch};

/// `VideoSearch` backed by yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    search_limit: usize,
    socket_timeout: Duration,
    cancel: CancelToken,
}

impl YtDlp {
    pub fn new(
        program: impl Into<PathBuf>,
        search_limit: usize,
        socket_timeout: Duration,
        cancel: CancelToken,
    ) -> Self {
        Self {
            program: program.into(),
            search_limit: search_limit.max(1),
            socket_timeout,
            cancel,
        }
    }

    /// Runs yt-dlp with `--dump-single-json` and returns stdout.
    fn dump_json(&self, target: &str, extra: &[&str]) -> Result<String> {
        let timeout = self.socket_timeout.as_secs().max(1).to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(["--dump-single-json", "--no-warnings", "--socket-timeout"])
            .arg(&timeout)
            .args(extra)
            .arg(target);

        debug!(program = %self.program.display(), target, "running yt-dlp");

        let output = cmd.output().map_err(|e| {
            TraknabError::with_source(
                ErrorCode::SearchFailed,
                format!("Failed to run {}", self.program.display()),
                e,
            )
        })?;

        if !output.status.success() {
            // yt-dlp shares our terminal, so Ctrl+C reaches it first
            self.cancel.check()?;
            if interrupted_exit(&output.status) {
                return Err(TraknabError::cancelled());
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "yt-dlp exited with failure");
            return Err(TraknabError::search_failed(format!(
                "yt-dlp {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| TraknabError::search_failed(format!("yt-dlp output is not UTF-8: {}", e)))
    }
}

impl VideoSearch for YtDlp {
    fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let target = format!("ytsearch{}:{}", self.search_limit, query);
        let json = self.dump_json(&target, &["--flat-playlist"])?;
        parse_search_results(&json)
    }

    fn media_info(&self, result: &SearchResult) -> Result<MediaInfo> {
        let json = self.dump_json(&result.url, &["--no-playlist"])?;
        parse_media_info(&json, result.duration_secs)
    }
}

#[derive(Deserialize)]
struct Playlist {
    #[serde(default)]
    entries: Vec<FlatEntry>,
}

#[derive(Deserialize)]
struct FlatEntry {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct VideoInfo {
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<Format>,
}

#[derive(Deserialize)]
struct Format {
    format_id: String,
    ext: String,
    #[serde(default)]
    acodec: Option<String>,
    #[serde(default)]
    vcodec: Option<String>,
    #[serde(default)]
    abr: Option<f64>,
    #[serde(default)]
    filesize: Option<f64>,
    #[serde(default)]
    filesize_approx: Option<f64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    protocol: Option<String>,
}

fn parse_search_results(json: &str) -> Result<Vec<SearchResult>> {
    let playlist: Playlist = serde_json::from_str(json)
        .map_err(|e| TraknabError::search_failed(format!("Unexpected search output: {}", e)))?;

    Ok(playlist
        .entries
        .into_iter()
        .map(|entry| {
            let url = entry
                .url
                .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", entry.id));
            SearchResult {
                title: entry.title.unwrap_or_else(|| entry.id.clone()),
                duration_secs: entry.duration.map(round_secs),
                id: entry.id,
                url,
            }
        })
        .collect())
}

fn round_secs(secs: f64) -> u64 {
    secs.max(0.0).round() as u64
}

fn parse_media_info(json: &str, fallback_duration_secs: Option<u64>) -> Result<MediaInfo> {
    let info: VideoInfo = serde_json::from_str(json)
        .map_err(|e| TraknabError::search_failed(format!("Unexpected format output: {}", e)))?;
    let duration_secs = info.duration.map(round_secs).or(fallback_duration_secs);
    let duration = duration_secs.unwrap_or(0) as f64;

    let streams = info
        .formats
        .into_iter()
        // Fragmented protocols (HLS, DASH segments) can't be fetched as one body
        .filter(|f| matches!(f.protocol.as_deref(), None | Some("http") | Some("https")))
        .filter_map(|f| {
            let url = f.url?;
            let has_audio = f.acodec.as_deref().is_some_and(|c| c != "none");
            let has_video = f.vcodec.as_deref().is_some_and(|c| c != "none");
            let estimated = f.abr.map(|abr| (abr * 1000.0 / 8.0 * duration) as u64);
            Some(AudioStream {
                format_id: f.format_id,
                container: f.ext,
                codec: f.acodec.filter(|c| c != "none"),
                abr_kbps: f.abr,
                filesize_bytes: f
                    .filesize
                    .or(f.filesize_approx)
                    .map(|size| size.max(0.0) as u64)
                    .or(estimated),
                url,
                audio_only: has_audio && !has_video,
            })
        })
        .collect();

    Ok(MediaInfo {
        duration_secs,
        streams,
    })
}
