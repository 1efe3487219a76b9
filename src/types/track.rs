//! Track request type.
//!
//! A TrackRequest is one (artist, title, target directory) tuple to acquire.
//! All of its filesystem paths are derived from these fields, so the batch
//! loop can recompute the intermediate path for cleanup without any shared
//! state.

use std::path::{Path, PathBuf};

use crate::error::{Result, TraknabError};

/// A validated request to acquire a single track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    artist: String,
    title: String,
    /// Directory under the download root, usually the genre name.
    target_dir: String,
    /// Replaces the default `"{artist} {title}"` query when set.
    search_term: Option<String>,
}

impl TrackRequest {
    /// Creates a new TrackRequest.
    ///
    /// Fails with `INVALID_REQUEST` if artist, title or target directory is
    /// empty or whitespace-only, or if a search term is given but empty.
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        target_dir: impl Into<String>,
        search_term: Option<String>,
    ) -> Result<Self> {
        let artist = artist.into();
        let title = title.into();
        let target_dir = target_dir.into();

        if artist.trim().is_empty() {
            return Err(TraknabError::invalid_request("Artist cannot be empty"));
        }
        if title.trim().is_empty() {
            return Err(TraknabError::invalid_request(format!(
                "Title cannot be empty (artist \"{}\")",
                artist
            )));
        }
        if target_dir.trim().is_empty() {
            return Err(TraknabError::invalid_request(format!(
                "Target directory cannot be empty for \"{} - {}\"",
                artist, title
            )));
        }
        if matches!(search_term, Some(ref term) if term.trim().is_empty()) {
            return Err(TraknabError::invalid_request(format!(
                "Search term for \"{} - {}\" is empty",
                artist, title
            )));
        }

        Ok(Self {
            artist,
            title,
            target_dir,
            search_term,
        })
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target_dir(&self) -> &str {
        &self.target_dir
    }

    /// Returns the query sent to the search collaborator.
    pub fn search_term(&self) -> String {
        match self.search_term {
            Some(ref term) => term.clone(),
            None => format!("{} {}", self.artist, self.title),
        }
    }

    /// Human-readable label, `"{artist} - {title}"`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// File name without extension.
    ///
    /// Path separators are replaced so a title like "AC/DC" cannot escape
    /// the target directory.
    pub fn file_stem(&self) -> String {
        sanitize_component(&self.label())
    }

    /// Absolute directory the track's files are written to.
    pub fn target_path(&self, download_root: &Path) -> PathBuf {
        download_root.join(sanitize_component(&self.target_dir))
    }

    /// Path of the raw downloaded stream, deleted after transcoding.
    pub fn intermediate_path(&self, download_root: &Path, container: &str) -> PathBuf {
        self.target_path(download_root)
            .join(format!("{}.{}", self.file_stem(), container))
    }

    /// Path of the durable transcoded output.
    pub fn output_path(&self, download_root: &Path, audio_ext: &str) -> PathBuf {
        self.target_path(download_root)
            .join(format!("{}.{}", self.file_stem(), audio_ext))
    }
}

fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}
