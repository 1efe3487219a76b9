//! Tracklist: the genre → artist → titles mapping loaded from TOML.
//!
//! ```toml
//! [electronic]
//! "Boards of Canada" = ["Roygbiv", { title = "Dayvan Cowboy", search = "boc dayvan cowboy" }]
//!
//! [rock]
//! "The Stooges" = ["Search and Destroy"]
//! ```
//!
//! Document order is kept (toml is built with `preserve_order`), so two runs
//! over the same file always visit tracks in the same sequence.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TraknabError};

use super::TrackRequest;

/// One title under an artist, with an optional custom search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEntry {
    pub title: String,
    pub search: Option<String>,
}

/// An artist and their titles, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
    pub tracks: Vec<TrackEntry>,
}

/// A genre, which doubles as the target directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub name: String,
    pub artists: Vec<Artist>,
}

/// Parsed tracklist. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracklist {
    genres: Vec<Genre>,
}

/// Entry as written in the file: a bare title or `{ title, search }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Title(String),
    Detailed {
        title: String,
        #[serde(default)]
        search: Option<String>,
    },
}

impl From<RawEntry> for TrackEntry {
    fn from(raw: RawEntry) -> Self {
        match raw {
            RawEntry::Title(title) => TrackEntry {
                title,
                search: None,
            },
            RawEntry::Detailed { title, search } => TrackEntry { title, search },
        }
    }
}

impl Tracklist {
    /// Reads and parses a tracklist file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| TraknabError::io(format!("Failed to read {}", path.display()), e))?;
        Self::parse(&text)
    }

    /// Parses tracklist TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        let table: toml::Table = text
            .parse()
            .map_err(|e: toml::de::Error| TraknabError::invalid_tracklist(e.to_string()))?;

        let mut genres = Vec::with_capacity(table.len());
        for (genre_name, value) in table {
            let toml::Value::Table(artists_table) = value else {
                return Err(TraknabError::invalid_tracklist(format!(
                    "\"{}\" must be a table of artists",
                    genre_name
                )));
            };

            let mut artists = Vec::with_capacity(artists_table.len());
            for (artist_name, titles) in artists_table {
                let raw: Vec<RawEntry> = titles.try_into().map_err(|e: toml::de::Error| {
                    TraknabError::invalid_tracklist(format!(
                        "{}.\"{}\" must be an array of titles: {}",
                        genre_name,
                        artist_name,
                        e.message()
                    ))
                })?;
                artists.push(Artist {
                    name: artist_name,
                    tracks: raw.into_iter().map(TrackEntry::from).collect(),
                });
            }

            genres.push(Genre {
                name: genre_name,
                artists,
            });
        }

        Ok(Self { genres })
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    /// Total number of track entries.
    pub fn len(&self) -> usize {
        self.genres
            .iter()
            .flat_map(|g| &g.artists)
            .map(|a| a.tracks.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Yields a request per entry in genre → artist → title order.
    ///
    /// Each item is validated independently; an invalid entry does not stop
    /// iteration, the caller decides what to do with the error.
    pub fn requests(&self) -> impl Iterator<Item = Result<TrackRequest>> + '_ {
        self.genres.iter().flat_map(|genre| {
            genre.artists.iter().flat_map(move |artist| {
                artist.tracks.iter().map(move |entry| {
                    TrackRequest::new(
                        artist.name.as_str(),
                        entry.title.as_str(),
                        genre.name.as_str(),
                        entry.search.clone(),
                    )
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const SAMPLE: &str = r#"
[rock]
"The Stooges" = ["Search and Destroy", "Gimme Danger"]
"Television" = ["Marquee Moon"]

[electronic]
"Boards of Canada" = ["Roygbiv", { title = "Dayvan Cowboy", search = "boc dayvan cowboy" }]
"#;

    #[test]
    fn parses_in_document_order() {
        let list = Tracklist::parse(SAMPLE).unwrap();
        let names: Vec<&str> = list.genres().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["rock", "electronic"]);

        let artists: Vec<&str> = list.genres()[0]
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(artists, ["The Stooges", "Television"]);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn inline_table_entries_carry_search_term() {
        let list = Tracklist::parse(SAMPLE).unwrap();
        let boc = &list.genres()[1].artists[0];
        assert_eq!(boc.tracks[0].search, None);
        assert_eq!(boc.tracks[1].title, "Dayvan Cowboy");
        assert_eq!(boc.tracks[1].search.as_deref(), Some("boc dayvan cowboy"));
    }

    #[test]
    fn requests_follow_mapping_order() {
        let list = Tracklist::parse(SAMPLE).unwrap();
        let labels: Vec<String> = list
            .requests()
            .map(|r| r.unwrap())
            .map(|r| format!("{}/{}", r.target_dir(), r.label()))
            .collect();
        assert_eq!(
            labels,
            [
                "rock/The Stooges - Search and Destroy",
                "rock/The Stooges - Gimme Danger",
                "rock/Television - Marquee Moon",
                "electronic/Boards of Canada - Roygbiv",
                "electronic/Boards of Canada - Dayvan Cowboy",
            ]
        );
    }

    #[test]
    fn genre_must_be_table() {
        let err = Tracklist::parse("rock = [\"x\"]").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTracklist);
        assert!(err.message.contains("rock"));
    }

    #[test]
    fn artist_must_hold_titles() {
        let err = Tracklist::parse("[rock]\nStooges = 3").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTracklist);
        assert!(err.message.contains("Stooges"));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = Tracklist::parse("[rock\n").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTracklist);
    }

    #[test]
    fn empty_file_is_empty_tracklist() {
        let list = Tracklist::parse("").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(Tracklist::load(&path).unwrap().len(), 5);
    }
}
