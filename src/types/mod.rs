//! Core types for traknab.
//!
//! - [`TrackRequest`]: one validated (artist, title, target directory) tuple
//! - [`Tracklist`]: the genre → artist → titles mapping loaded from TOML
//! - [`SearchResult`] / [`AudioStream`]: what the video platform hands back

mod media;
mod track;
mod tracklist;

pub use media::{
    bytes_to_mb, format_duration, select_audio_stream, AudioStream, MediaInfo, SearchResult,
};
pub use track::TrackRequest;
pub use tracklist::{Artist, Genre, TrackEntry, Tracklist};
