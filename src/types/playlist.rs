use crate::types::track::Track;

/// Ordered, cyclic selection over a non-empty list of tracks.
#[derive(Debug, Clone)]
pub struct PlaylistCursor {
    tracks: Vec<Track>,
    current: usize,
}

impl PlaylistCursor {
    /// Returns `None` for an empty playlist: a cursor always has a current track.
    pub fn new(tracks: Vec<Track>) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }
        Some(PlaylistCursor { tracks, current: 0 })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> &Track {
        &self.tracks[self.current]
    }

    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.tracks.len();
        self.current
    }

    pub fn previous(&mut self) -> usize {
        let len = self.tracks.len();
        self.current = (self.current + len - 1) % len;
        self.current
    }

    /// Carousel selection. Out-of-range indices leave the cursor where it is.
    pub fn select_externally(&mut self, index: usize) -> usize {
        if index < self.tracks.len() {
            self.current = index;
        } else {
            log::warn!(
                "ignoring selection of track {} (playlist has {})",
                index,
                self.tracks.len()
            );
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(len: usize) -> PlaylistCursor {
        let tracks = (0..len)
            .map(|i| Track::new(&format!("t{i}"), "a", "", &format!("{i}.mp3")))
            .collect();
        PlaylistCursor::new(tracks).unwrap()
    }

    #[test]
    fn test_empty_playlist_has_no_cursor() {
        assert!(PlaylistCursor::new(Vec::new()).is_none());
    }

    #[test]
    fn test_next_twice_then_wrap() {
        let mut c = cursor(3);
        assert_eq!(c.current(), 0);
        c.next();
        assert_eq!(c.next(), 2);
        assert_eq!(c.next(), 0);
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        for len in 1..6 {
            for start in 0..len {
                let mut c = cursor(len);
                c.select_externally(start);
                for _ in 0..len {
                    c.next();
                }
                assert_eq!(c.current(), start);
            }
        }
    }

    #[test]
    fn test_previous_undoes_next() {
        let mut c = cursor(4);
        for start in 0..4 {
            c.select_externally(start);
            c.next();
            assert_eq!(c.previous(), start);
        }
    }

    #[test]
    fn test_previous_wraps_to_end() {
        let mut c = cursor(5);
        assert_eq!(c.previous(), 4);
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut c = cursor(3);
        c.select_externally(1);
        assert_eq!(c.select_externally(7), 1);
        assert_eq!(c.current_track().title, "t1");
    }
}
