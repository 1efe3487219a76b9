//! Runtime configuration.
//!
//! Thresholds, paths and tool locations for an acquisition run. Values come
//! from defaults, then `TRAKNAB_*` environment variables, then CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TraknabError};

/// Tracks longer than this are rejected (15 minutes).
pub const DEFAULT_MAX_DURATION_SECS: u64 = 60 * 15;

/// Streams smaller than this many megabytes are rejected.
pub const DEFAULT_MIN_SIZE_MB: f64 = 2.0;

/// Connect/read timeout for downloads.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for an acquisition run.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquireConfig {
    /// Existing directory under which one folder per genre is created.
    pub download_root: PathBuf,

    /// TOML tracklist (genre → artist → titles).
    pub tracks_path: PathBuf,

    /// Upper bound on the top result's duration.
    pub max_duration_secs: u64,

    /// Lower bound on the selected stream's estimated size.
    pub min_size_mb: f64,

    /// Download connect/read timeout.
    pub timeout_secs: u64,

    /// Pause after each successful download. 0 disables it.
    pub sleep_secs: u64,

    /// Container of the audio stream to download, e.g. "webm".
    pub container: String,

    /// Extension of the durable output, e.g. "mp3". ffmpeg picks the codec from it.
    pub audio_format: String,

    /// Number of search candidates requested from the platform.
    pub search_limit: usize,

    pub yt_dlp_path: PathBuf,
    pub ffmpeg_path: PathBuf,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            download_root: PathBuf::from("downloads"),
            tracks_path: PathBuf::from("tracks.toml"),
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            min_size_mb: DEFAULT_MIN_SIZE_MB,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sleep_secs: 0,
            container: "webm".to_string(),
            audio_format: "mp3".to_string(),
            search_limit: 5,
            yt_dlp_path: PathBuf::from("yt-dlp"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
        }
    }
}

impl AcquireConfig {
    /// Creates an AcquireConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an AcquireConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `TRAKNAB_DOWNLOAD_ROOT` - Download root directory
    /// - `TRAKNAB_TRACKS` - Tracklist file
    /// - `TRAKNAB_MAX_DURATION` - Maximum track length in seconds
    /// - `TRAKNAB_MIN_SIZE_MB` - Minimum stream size in megabytes
    /// - `TRAKNAB_TIMEOUT` - Download timeout in seconds
    /// - `TRAKNAB_SLEEP` - Seconds to sleep after each download
    /// - `TRAKNAB_CONTAINER` - Stream container to download
    /// - `TRAKNAB_AUDIO_FORMAT` - Output audio extension
    /// - `TRAKNAB_SEARCH_LIMIT` - Search candidates to request
    /// - `TRAKNAB_YT_DLP` - Path to yt-dlp
    /// - `TRAKNAB_FFMPEG` - Path to ffmpeg
    ///
    /// Falls back to defaults for unset or unparsable variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("TRAKNAB_DOWNLOAD_ROOT") {
            config.download_root = PathBuf::from(path);
        }

        if let Some(path) = lookup("TRAKNAB_TRACKS") {
            config.tracks_path = PathBuf::from(path);
        }

        if let Some(secs) = lookup("TRAKNAB_MAX_DURATION").and_then(|v| v.parse().ok()) {
            config.max_duration_secs = secs;
        }

        if let Some(mb) = lookup("TRAKNAB_MIN_SIZE_MB").and_then(|v| v.parse::<f64>().ok()) {
            if mb.is_finite() && mb >= 0.0 {
                config.min_size_mb = mb;
            }
        }

        if let Some(secs) = lookup("TRAKNAB_TIMEOUT").and_then(|v| v.parse::<u64>().ok()) {
            if secs > 0 {
                config.timeout_secs = secs;
            }
        }

        if let Some(secs) = lookup("TRAKNAB_SLEEP").and_then(|v| v.parse().ok()) {
            config.sleep_secs = secs;
        }

        if let Some(container) = lookup("TRAKNAB_CONTAINER") {
            config.container = container.to_lowercase();
        }

        if let Some(format) = lookup("TRAKNAB_AUDIO_FORMAT") {
            config.audio_format = format.to_lowercase();
        }

        if let Some(limit) = lookup("TRAKNAB_SEARCH_LIMIT").and_then(|v| v.parse::<usize>().ok()) {
            if limit > 0 {
                config.search_limit = limit;
            }
        }

        if let Some(path) = lookup("TRAKNAB_YT_DLP") {
            config.yt_dlp_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("TRAKNAB_FFMPEG") {
            config.ffmpeg_path = PathBuf::from(path);
        }

        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sleep(&self) -> Option<Duration> {
        (self.sleep_secs > 0).then(|| Duration::from_secs(self.sleep_secs))
    }

    /// Validates the configuration values.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.timeout_secs == 0 {
            return Some("timeout must be > 0".to_string());
        }

        if !self.min_size_mb.is_finite() || self.min_size_mb < 0.0 {
            return Some(format!("min size must be >= 0, got {}", self.min_size_mb));
        }

        if self.search_limit == 0 {
            return Some("search limit must be > 0".to_string());
        }

        for (name, ext) in [("container", &self.container), ("audio format", &self.audio_format)] {
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Some(format!("{} must be a plain file extension, got \"{}\"", name, ext));
            }
        }

        if self.container.eq_ignore_ascii_case(&self.audio_format) {
            return Some(format!(
                "container and audio format are both \"{}\"; the intermediate would overwrite the output",
                self.container
            ));
        }

        None
    }

    /// Checks the startup paths: the download root must be an existing
    /// directory and the tracklist an existing `.toml` file.
    pub fn validate_paths(&self) -> Result<()> {
        if !self.download_root.is_dir() {
            return Err(TraknabError::invalid_config(format!(
                "Download path must lead to a directory. Check the path: {}",
                display_resolved(&self.download_root)
            )));
        }

        let is_toml = self
            .tracks_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if !is_toml {
            return Err(TraknabError::invalid_config(format!(
                "Tracks file must be a TOML. Check the path: {}",
                display_resolved(&self.tracks_path)
            )));
        }

        if !self.tracks_path.is_file() {
            return Err(TraknabError::invalid_config(format!(
                "Tracks path must lead to a file. Check the path: {}",
                display_resolved(&self.tracks_path)
            )));
        }

        Ok(())
    }
}

fn display_resolved(path: &Path) -> String {
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_constants() {
        let config = AcquireConfig::new();
        assert_eq!(config.max_duration_secs, 900);
        assert_eq!(config.min_size_mb, 2.0);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.sleep(), None);
        assert_eq!(config.container, "webm");
        assert_eq!(config.audio_format, "mp3");
        assert!(config.validate().is_none());
    }

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("TRAKNAB_MAX_DURATION", "600"),
            ("TRAKNAB_MIN_SIZE_MB", "-3"),
            ("TRAKNAB_TIMEOUT", "abc"),
            ("TRAKNAB_SLEEP", "2"),
            ("TRAKNAB_AUDIO_FORMAT", "FLAC"),
        ]
        .into_iter()
        .collect();
        let config = AcquireConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.max_duration_secs, 600);
        assert_eq!(config.min_size_mb, DEFAULT_MIN_SIZE_MB);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.sleep(), Some(Duration::from_secs(2)));
        assert_eq!(config.audio_format, "flac");
    }

    #[test]
    fn validation() {
        let mut config = AcquireConfig::new();
        config.timeout_secs = 0;
        assert!(config.validate().is_some());

        let mut config = AcquireConfig::new();
        config.audio_format = "webm".to_string();
        assert!(config.validate().is_some());

        let mut config = AcquireConfig::new();
        config.container = "../x".to_string();
        assert!(config.validate().is_some());
    }

    #[test]
    fn startup_paths() {
        let dir = tempfile::tempdir().unwrap();
        let tracks = dir.path().join("tracks.toml");
        std::fs::write(&tracks, "").unwrap();

        let mut config = AcquireConfig::new();
        config.download_root = dir.path().to_path_buf();
        config.tracks_path = tracks.clone();
        assert!(config.validate_paths().is_ok());

        config.download_root = dir.path().join("missing");
        let err = config.validate_paths().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfig);

        config.download_root = dir.path().to_path_buf();
        config.tracks_path = dir.path().join("tracks.yaml");
        std::fs::write(&config.tracks_path, "").unwrap();
        assert!(config.validate_paths().unwrap_err().message.contains("TOML"));

        config.tracks_path = dir.path().join("absent.toml");
        assert!(config.validate_paths().unwrap_err().message.contains("file"));

        config.tracks_path = dir.path().join("dir.toml");
        std::fs::create_dir(&config.tracks_path).unwrap();
        assert!(config.validate_paths().is_err());
    }
}
