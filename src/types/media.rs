//! Search results and audio stream descriptors returned by the video platform.

/// One candidate from a platform search, in the platform's ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Platform video id.
    pub id: String,
    pub title: String,
    /// Length in whole seconds. Flat search listings sometimes omit it.
    pub duration_secs: Option<u64>,
    /// Page URL, used to enumerate streams.
    pub url: String,
}

/// Full extraction of one search result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Length reported by the full extraction, if any.
    pub duration_secs: Option<u64>,
    pub streams: Vec<AudioStream>,
}

/// A downloadable stream of a search result.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStream {
    pub format_id: String,
    /// Container extension, e.g. "webm" or "m4a".
    pub container: String,
    /// Audio codec, e.g. "opus".
    pub codec: Option<String>,
    /// Average audio bitrate in kbps.
    pub abr_kbps: Option<f64>,
    /// Estimated size in bytes. None if the platform does not report one.
    pub filesize_bytes: Option<u64>,
    /// Direct media URL.
    pub url: String,
    /// False if the stream also carries video.
    pub audio_only: bool,
}

impl AudioStream {
    /// Approximate size in megabytes, rounded to two decimals.
    ///
    /// Unknown sizes count as zero so they fall below any size floor.
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.filesize_bytes.unwrap_or(0))
    }
}

/// Converts bytes to megabytes (1e6), rounded to two decimals.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 * 1e-6 * 100.0).round() / 100.0
}

/// Picks the best audio-only stream in `container`.
///
/// Best means highest average bitrate; streams without a bitrate rank last.
/// Returns None if no audio-only stream uses that container.
pub fn select_audio_stream<'a>(streams: &'a [AudioStream], container: &str) -> Option<&'a AudioStream> {
    streams
        .iter()
        .filter(|s| s.audio_only && s.container.eq_ignore_ascii_case(container))
        .max_by(|a, b| {
            let a = a.abr_kbps.unwrap_or(0.0);
            let b = b.abr_kbps.unwrap_or(0.0);
            a.total_cmp(&b)
        })
}

/// Formats a duration as `"{m}m {s}s"`.
pub fn format_duration(total_secs: u64) -> String {
    format!("{}m {}s", total_secs / 60, total_secs % 60)
}
