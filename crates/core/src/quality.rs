//! Release quality scoring.
//!
//! A score is the sum of a resolution, source and video codec component plus
//! flat bonuses for remuxes, HDR, immersive audio and lossless audio. Higher
//! is better; the absolute value only matters relative to other releases of
//! the same item.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::{MediaKind, NameParser, ParsedName, RuleParser};

/// Bonus for untouched disc remuxes.
pub const REMUX_BONUS: u32 = 25;
/// Bonus for any HDR format.
pub const HDR_BONUS: u32 = 15;
/// Bonus for object-based audio (Atmos, DTS:X).
pub const IMMERSIVE_AUDIO_BONUS: u32 = 10;
/// Bonus for lossless audio tracks.
pub const LOSSLESS_AUDIO_BONUS: u32 = 8;

const HDR_MARKERS: &[&str] = &["HDR", "HDR10", "HDR10+", "Dolby Vision", "HLG"];
const IMMERSIVE_AUDIO: &[&str] = &["Atmos", "DTS:X"];
const LOSSLESS_AUDIO: &[&str] = &["DTS-HD MA", "DTS-HD", "TrueHD", "FLAC", "LPCM", "PCM"];

/// Points for a screen size.
pub fn resolution_points(screen_size: &str) -> u32 {
    match screen_size {
        "4320p" => 100,
        "2160p" => 90,
        "1080p" => 70,
        "1080i" => 65,
        "720p" => 50,
        "576p" => 30,
        "480p" => 20,
        "360p" => 10,
        _ => 0,
    }
}

/// Points for a release source.
pub fn source_points(source: &str) -> u32 {
    match source {
        "Ultra HD Blu-ray" => 65,
        "Blu-ray" => 60,
        "HD-DVD" => 55,
        "Web" => 40,
        "HDTV" => 35,
        "DVD" => 30,
        "PDTV" => 25,
        "SDTV" => 20,
        "Telecine" => 10,
        "Telesync" => 8,
        "VHS" => 5,
        "Workprint" => 3,
        "Camera" => 1,
        _ => 0,
    }
}

/// Points for a video codec.
pub fn codec_points(codec: &str) -> u32 {
    match codec {
        "AV1" => 35,
        "H.265" => 30,
        "H.264" => 20,
        "VP9" => 18,
        "MPEG-2" => 5,
        "XviD" | "DivX" => 3,
        _ => 0,
    }
}

/// Score already-parsed metadata.
///
/// `raw_name` is also checked for a literal "REMUX" so remuxes are rewarded
/// even when the parser did not tag them.
pub fn score(parsed: &ParsedName, raw_name: &str) -> u32 {
    let mut total = 0;

    total += parsed.screen_size.as_deref().map_or(0, resolution_points);
    total += parsed.source.as_deref().map_or(0, source_points);
    total += parsed.video_codec.as_deref().map_or(0, codec_points);

    if parsed.has_marker("Remux") || raw_name.to_uppercase().contains("REMUX") {
        total += REMUX_BONUS;
    }
    if HDR_MARKERS.iter().any(|m| parsed.has_marker(m)) {
        total += HDR_BONUS;
    }
    if IMMERSIVE_AUDIO.iter().any(|a| parsed.has_audio(a)) {
        total += IMMERSIVE_AUDIO_BONUS;
    }
    if LOSSLESS_AUDIO.iter().any(|a| parsed.has_audio(a)) {
        total += LOSSLESS_AUDIO_BONUS;
    }

    total
}

/// Parse and score a raw release name.
pub fn score_name(raw_name: &str) -> u32 {
    let parsed = RuleParser::new().parse(raw_name, MediaKind::Film);
    score(&parsed, raw_name)
}

/// Coarse quality band used for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Poor,
    Low,
    Fair,
    Good,
    Excellent,
}

impl QualityTier {
    pub fn from_score(score: u32) -> Self {
        match score {
            200.. => Self::Excellent,
            150..=199 => Self::Good,
            100..=149 => Self::Fair,
            50..=99 => Self::Low,
            _ => Self::Poor,
        }
    }

    /// Number of filled stars out of five.
    pub fn stars(&self) -> usize {
        match self {
            Self::Excellent => 5,
            Self::Good => 4,
            Self::Fair => 3,
            Self::Low => 2,
            Self::Poor => 1,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = self.stars();
        write!(f, "{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

/// Render a score for logs, e.g. `★★★★☆ (150)`.
pub fn format_score(score: u32) -> String {
    format!("{} ({})", QualityTier::from_score(score), score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bluray_1080p() {
        assert_eq!(score_name("Movie.2020.1080p.BluRay.x264.mkv"), 150);
    }

    #[test]
    fn test_score_web_2160p_beats_bluray_1080p() {
        let web = score_name("Movie.2020.2160p.WEB-DL.HEVC.mkv");
        assert_eq!(web, 160);
        assert!(web > score_name("Movie.2020.1080p.BluRay.x264.mkv"));
    }

    #[test]
    fn test_score_remux_with_bonuses() {
        // 90 + 65 + 30 + remux 25 + hdr 15 + atmos 10 + lossless 8
        let name = "Movie.2021.2160p.UHD.BluRay.REMUX.HDR.HEVC.TrueHD.Atmos.7.1-GRP";
        assert_eq!(score_name(name), 243);
    }

    #[test]
    fn test_score_remux_literal_without_marker() {
        let parsed = ParsedName {
            screen_size: Some("1080p".to_string()),
            ..Default::default()
        };
        assert_eq!(score(&parsed, "something-remux"), 70 + REMUX_BONUS);
    }

    #[test]
    fn test_score_unknown_is_zero() {
        assert_eq!(score_name("home_video.mkv"), 0);
    }

    #[test]
    fn test_score_dvd_not_hdr() {
        // DVD 30 + XviD 3, no Dolby Vision bonus from "DVD"
        assert_eq!(score_name("Old.Movie.1998.DVDRip.XviD.avi"), 33);
    }

    #[test]
    fn test_quality_tier_thresholds() {
        assert_eq!(QualityTier::from_score(0), QualityTier::Poor);
        assert_eq!(QualityTier::from_score(49), QualityTier::Poor);
        assert_eq!(QualityTier::from_score(50), QualityTier::Low);
        assert_eq!(QualityTier::from_score(100), QualityTier::Fair);
        assert_eq!(QualityTier::from_score(150), QualityTier::Good);
        assert_eq!(QualityTier::from_score(200), QualityTier::Excellent);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(150), "★★★★☆ (150)");
        assert_eq!(format_score(243), "★★★★★ (243)");
        assert_eq!(format_score(0), "★☆☆☆☆ (0)");
    }
}
