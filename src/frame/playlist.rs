use crate::frame::FrameError;
use std::fmt::{Display, Formatter};
use tracing::warn;

const IMAGE_EXTENSION: &str = ".raw";

/// Image file names in display order, as listed one per line in the order file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<String>,
}

/// Next playlist position, persisted between wake-ups.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Cursor(pub usize);

/// The image picked for this wake-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    pub path: &'a str,
    pub index: usize,
    pub next: Cursor,
}

impl Playlist {
    pub fn parse(text: &str) -> Self {
        let entries = text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(normalize_entry)
            .collect();
        Playlist { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Wraps the cursor into range and computes the one to store for next time
    pub fn select(&self, cursor: Cursor) -> Result<Selection<'_>, FrameError> {
        if self.entries.is_empty() {
            return Err(FrameError::EmptyPlaylist);
        }
        let index = cursor.0 % self.entries.len();
        Ok(Selection {
            path: &self.entries[index],
            index,
            next: Cursor((index + 1) % self.entries.len()),
        })
    }
}

/// `photo` becomes `/photo.raw`
fn normalize_entry(line: &str) -> String {
    let mut name = line.to_string();
    if !name.ends_with(IMAGE_EXTENSION) {
        name.push_str(IMAGE_EXTENSION);
    }
    if !name.starts_with('/') {
        name.insert(0, '/');
    }
    name
}

impl Cursor {
    /// Reads the first line. Anything that is not a plain index counts as 0.
    pub fn parse(text: &str) -> Self {
        let first = text.lines().next().unwrap_or_default().trim();
        if first.is_empty() {
            return Cursor(0);
        }
        match first.parse() {
            Ok(index) => Cursor(index),
            Err(e) => {
                warn!("Ignoring cursor {:?}: {}", first, e);
                Cursor(0)
            }
        }
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_entries() {
        let playlist = Playlist::parse("beach\n  /cat.raw \r\n\n\nsunset.raw\n/dog");
        assert_eq!(
            playlist.entries(),
            &["/beach.raw", "/cat.raw", "/sunset.raw", "/dog.raw"]
        );
    }

    #[test]
    fn test_parse_has_no_capacity_cap() {
        let text: String = (0..500).map(|i| format!("img{i}\n")).collect();
        assert_eq!(Playlist::parse(&text).len(), 500);
    }

    #[test]
    fn test_select_wraps() {
        let playlist = Playlist::parse("a\nb\nc");
        let selection = playlist.select(Cursor(7)).unwrap();
        assert_eq!(selection.path, "/b.raw");
        assert_eq!(selection.index, 1);
        assert_eq!(selection.next, Cursor(2));

        let last = playlist.select(Cursor(2)).unwrap();
        assert_eq!(last.next, Cursor(0));
    }

    #[test]
    fn test_select_empty_playlist() {
        let playlist = Playlist::parse("\n  \n");
        assert!(playlist.is_empty());
        assert!(matches!(
            playlist.select(Cursor(0)),
            Err(FrameError::EmptyPlaylist)
        ));
    }

    #[test]
    fn test_cursor_parse() {
        assert_eq!(Cursor::parse("4"), Cursor(4));
        assert_eq!(Cursor::parse(" 12 \nrubbish"), Cursor(12));
        assert_eq!(Cursor::parse(""), Cursor(0));
        assert_eq!(Cursor::parse("seven"), Cursor(0));
        assert_eq!(Cursor::parse("-3"), Cursor(0));
        assert_eq!(Cursor(9).to_string(), "9");
    }
}
