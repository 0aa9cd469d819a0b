//! Canonical names and target paths for the consumer library.
//!
//! Films land at `films/{Title (Year)}/{Title (Year)}{ext}` and episodes at
//! `shows/{Title (Year)}/Season {NN}/{Title (Year)} S{NN}E{NN}{ext}`. The
//! year is dropped when unknown.

use std::path::PathBuf;

use crate::parser::EpisodeNumber;

/// Characters that are invalid in file names on common filesystems.
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a string safe to use as a single path component.
///
/// Removes illegal characters, collapses whitespace, and strips trailing
/// dots and spaces.
pub fn sanitize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| !UNSAFE_CHARS.contains(c) && !c.is_control())
        .collect();

    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches(['.', ' ']).to_string()
}

/// `Title (Year)`, or just `Title` without a year.
pub fn display_name(title: &str, year: Option<u32>) -> String {
    let title = sanitize(title);
    match year {
        Some(year) => format!("{} ({})", title, year),
        None => title,
    }
}

/// `S01E03`, or `S01E03E04` for multi-episode files.
pub fn episode_code(season: u32, episode: &EpisodeNumber) -> String {
    let mut code = format!("S{:02}", season);
    for n in episode.as_slice() {
        code.push_str(&format!("E{:02}", n));
    }
    code
}

/// Builds target paths under the library output root.
#[derive(Debug, Clone)]
pub struct TargetLayout {
    films_root: PathBuf,
    shows_root: PathBuf,
}

impl TargetLayout {
    pub fn new(films_root: impl Into<PathBuf>, shows_root: impl Into<PathBuf>) -> Self {
        Self {
            films_root: films_root.into(),
            shows_root: shows_root.into(),
        }
    }

    /// Target path for a film. `extension` includes the leading dot.
    pub fn film_target(&self, title: &str, year: Option<u32>, extension: &str) -> PathBuf {
        let name = display_name(title, year);
        self.films_root
            .join(&name)
            .join(format!("{}{}", name, extension))
    }

    /// Target path for an episode. `extension` includes the leading dot.
    pub fn episode_target(
        &self,
        title: &str,
        year: Option<u32>,
        season: u32,
        episode: &EpisodeNumber,
        extension: &str,
    ) -> PathBuf {
        let name = display_name(title, year);
        self.shows_root
            .join(&name)
            .join(format!("Season {:02}", season))
            .join(format!(
                "{} {}{}",
                name,
                episode_code(season, episode),
                extension
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_removes_unsafe_chars() {
        assert_eq!(sanitize("What If...?"), "What If");
        assert_eq!(sanitize("Mission: Impossible"), "Mission Impossible");
        assert_eq!(sanitize("AC/DC  Live"), "ACDC Live");
        assert_eq!(sanitize("  spaced   out  "), "spaced out");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let once = sanitize("Star Wars: Episode IV - A New Hope...");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Heat", Some(1995)), "Heat (1995)");
        assert_eq!(display_name("Heat", None), "Heat");
    }

    #[test]
    fn test_episode_code() {
        assert_eq!(episode_code(1, &EpisodeNumber::Single(3)), "S01E03");
        assert_eq!(episode_code(1, &EpisodeNumber::Multi(vec![3, 4])), "S01E03E04");
        assert_eq!(episode_code(12, &EpisodeNumber::Single(105)), "S12E105");
    }

    #[test]
    fn test_film_target() {
        let layout = TargetLayout::new("/media/films", "/media/shows");
        assert_eq!(
            layout.film_target("Movie", Some(2020), ".mkv"),
            PathBuf::from("/media/films/Movie (2020)/Movie (2020).mkv")
        );
        assert_eq!(
            layout.film_target("Movie", None, ".mp4"),
            PathBuf::from("/media/films/Movie/Movie.mp4")
        );
    }

    #[test]
    fn test_episode_target() {
        let layout = TargetLayout::new("/media/films", "/media/shows");
        assert_eq!(
            layout.episode_target("Show", None, 2, &EpisodeNumber::Single(5), ".mkv"),
            PathBuf::from("/media/shows/Show/Season 02/Show S02E05.mkv")
        );
        assert_eq!(
            layout.episode_target(
                "Show",
                Some(2019),
                1,
                &EpisodeNumber::Multi(vec![3, 4]),
                ".mkv"
            ),
            PathBuf::from("/media/shows/Show (2019)/Season 01/Show (2019) S01E03E04.mkv")
        );
    }
}
