//! Regex heuristics for release names.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::{EpisodeNumber, MediaKind, ParsedName};
use super::NameParser;

/// A single pattern that maps to a canonical marker value.
struct Rule {
    pattern: Regex,
    value: &'static str,
    /// Also an ordinary word, so only trusted past the end of the title.
    ambiguous: bool,
}

fn rule(pattern: &str, value: &'static str) -> Rule {
    Rule {
        pattern: Regex::new(pattern).unwrap(),
        value,
        ambiguous: false,
    }
}

fn loose_rule(pattern: &str, value: &'static str) -> Rule {
    Rule {
        ambiguous: true,
        ..rule(pattern, value)
    }
}

// ============================================================================
// Patterns
// ============================================================================

// Names are normalized before matching: dots and underscores become spaces.

static VIDEO_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(mkv|mp4|avi|mov|wmv|flv|webm|m4v|mpg|mpeg|ts|m2ts|vob|iso)$").unwrap()
});

static LEADING_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[[^\]]*\]\s*").unwrap());

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

static EPISODE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bs(\d{1,2}) ?e(\d{1,3})((?:(?:-| )?e\d{1,3}|-\d{1,3}\b)*)").unwrap()
});

static CROSS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b").unwrap());

static SEASON_EPISODE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bseason ?(\d{1,2}) ?(?:-|,)? ?episode ?(\d{1,3})\b").unwrap()
});

static SEASON_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:season ?(\d{1,2})|s(\d{1,2}))\b").unwrap());

static EPISODE_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:episode ?|ep ?|e)(\d{1,3})\b").unwrap());

static ABSOLUTE_EPISODE: Lazy<Regex> = Lazy::new(|| Regex::new(r" - (\d{1,3})\b").unwrap());

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

static RESOLUTIONS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"(?i)\b4320p\b", "4320p"),
        rule(r"(?i)\b(?:2160p|4k|uhd)\b", "2160p"),
        rule(r"(?i)\b1080p\b", "1080p"),
        rule(r"(?i)\b1080i\b", "1080i"),
        rule(r"(?i)\b720p\b", "720p"),
        rule(r"(?i)\b576p\b", "576p"),
        rule(r"(?i)\b480p\b", "480p"),
        rule(r"(?i)\b360p\b", "360p"),
    ]
});

static SOURCES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            r"(?i)\b(?:uhd ?blu-?ray|blu-?ray ?uhd|uhd ?bd(?:rip|remux)?)\b",
            "Ultra HD Blu-ray",
        ),
        rule(r"(?i)\bhd-?dvd\b", "HD-DVD"),
        rule(
            r"(?i)\b(?:blu-?ray|bdrip|brrip|bdremux|bd25|bd50|bdmv)\b",
            "Blu-ray",
        ),
        rule(r"(?i)\b(?:web-?dl|web-?rip|amzn|dsnp|hmax|atvp)\b", "Web"),
        loose_rule(r"(?i)\b(?:web|nf)\b", "Web"),
        rule(r"(?i)\bhdtv\b", "HDTV"),
        rule(r"(?i)\bpdtv\b", "PDTV"),
        rule(r"(?i)\bsdtv\b", "SDTV"),
        rule(r"(?i)\b(?:dvd-?rip|dvd[59r]?)\b", "DVD"),
        rule(r"(?i)\bvhs\b", "VHS"),
        rule(r"(?i)\btelecine\b", "Telecine"),
        loose_rule(r"(?i)\btc\b", "Telecine"),
        rule(r"(?i)\b(?:telesync|hdts)\b", "Telesync"),
        loose_rule(r"(?i)\bts\b", "Telesync"),
        rule(r"(?i)\bworkprint\b", "Workprint"),
        loose_rule(r"(?i)\bwp\b", "Workprint"),
        rule(r"(?i)\b(?:camrip|hdcam)\b", "Camera"),
        loose_rule(r"(?i)\bcam\b", "Camera"),
    ]
});

static VIDEO_CODECS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"(?i)\bav1\b", "AV1"),
        rule(r"(?i)\b(?:x ?265|h ?265|hevc)\b", "H.265"),
        rule(r"(?i)\b(?:x ?264|h ?264|avc)\b", "H.264"),
        rule(r"(?i)\bvp9\b", "VP9"),
        rule(r"(?i)\bmpeg-?2\b", "MPEG-2"),
        rule(r"(?i)\bxvid\b", "XviD"),
        rule(r"(?i)\bdivx\b", "DivX"),
    ]
});

// Order matters: the plain "DTS" rule only applies when no DTS variant did.
static AUDIO_CODECS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"(?i)\bdts-?hd ?ma\b", "DTS-HD MA"),
        rule(r"(?i)\bdts-?hd\b", "DTS-HD"),
        rule(r"(?i)\bdts(?::| |-)?x\b", "DTS:X"),
        rule(r"(?i)\btrue ?hd\b", "TrueHD"),
        rule(r"(?i)\batmos\b", "Atmos"),
        rule(r"(?i)\bflac\b", "FLAC"),
        rule(r"(?i)\blpcm\b", "LPCM"),
        rule(r"(?i)\bpcm\b", "PCM"),
        rule(r"(?i)\bdts\b", "DTS"),
        rule(r"(?i)\b(?:ddp[257]?|eac3|e-ac-3|dd\+)", "Dolby Digital Plus"),
        rule(r"(?i)\b(?:dd[257]?|ac-?3)\b", "Dolby Digital"),
        rule(r"(?i)\baac[257]?\b", "AAC"),
    ]
});

static OTHER_MARKERS: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"(?i)remux\b", "Remux"),
        rule(r"(?i)\bhdr10(?:\+|plus)", "HDR10+"),
        rule(r"(?i)\bhdr10\b", "HDR10"),
        rule(r"(?i)\bhdr\b", "HDR"),
        rule(r"(?i)\b(?:dolby ?vision|dovi|dv)\b", "Dolby Vision"),
        rule(r"(?i)\bhlg\b", "HLG"),
        rule(r"(?i)\bproper\b", "Proper"),
        rule(r"(?i)\brepack\b", "Repack"),
    ]
});

// Tokens that end a title without carrying scoring information. Only a run
// of them directly in front of the year or a quality marker counts, so
// "Uncut Gems" keeps its first word.
static EDITION_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:extended|remastered|unrated|uncut|directors? cut|theatrical|limited|internal|complete|multi|dubbed|subbed)\b",
    )
    .unwrap()
});

// ============================================================================
// Parser
// ============================================================================

/// Heuristic release-name parser built from regular expressions.
#[derive(Debug, Clone, Default)]
pub struct RuleParser;

impl RuleParser {
    pub fn new() -> Self {
        Self
    }
}

impl NameParser for RuleParser {
    fn parse(&self, name: &str, kind: MediaKind) -> ParsedName {
        let stem = VIDEO_EXTENSION.replace(name.trim(), "");
        let stem = LEADING_GROUP.replace(&stem, "");
        let text = normalize(&stem);

        let mut parsed = ParsedName::default();
        // Byte offsets where non-title tokens start.
        let mut cuts: Vec<usize> = Vec::new();

        if kind == MediaKind::Episode {
            if let Some(marker) = find_episode(&text) {
                parsed.season = marker.season;
                parsed.episode = EpisodeNumber::from_numbers(marker.episodes);
                cuts.extend(marker.starts);
            }
        }

        parsed.screen_size = first_rule(&text, &RESOLUTIONS, &mut cuts);
        parsed.video_codec = first_rule(&text, &VIDEO_CODECS, &mut cuts);
        parsed.audio_codec = audio_codecs(&text, &mut cuts);
        parsed.other = all_rules(&text, &OTHER_MARKERS, &mut cuts);
        source_cuts(&text, &mut cuts);
        cuts.extend(text.find(['[', '(', '{']));

        let first_marker = cuts.iter().min().copied().unwrap_or(text.len());
        if let Some((start, year)) = pick_year(&text, first_marker) {
            parsed.year = Some(year);
            cuts.push(start);
        }

        let boundary = cuts.into_iter().min().unwrap_or(text.len());
        parsed.source = pick_source(&text, boundary);
        parsed.title = clean_title(&text[..edition_edge(&text, boundary)]);

        parsed
    }
}

/// Episode information found in a name.
struct EpisodeMarker {
    season: Option<u32>,
    episodes: Vec<u32>,
    starts: Vec<usize>,
}

fn find_episode(text: &str) -> Option<EpisodeMarker> {
    // Season-only tokens are title terminators even when a full marker exists
    // elsewhere, e.g. "Show S01 1080p Show S01E02".
    let season_starts: Vec<usize> = SEASON_ONLY.find_iter(text).map(|m| m.start()).collect();

    if let Some(caps) = EPISODE_MARKER.captures(text) {
        let season = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let mut episodes: Vec<u32> = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .into_iter()
            .collect();

        if let Some(rest) = caps.get(3) {
            for n in DIGITS.find_iter(rest.as_str()) {
                let Ok(n) = n.as_str().parse::<u32>() else {
                    break;
                };
                if episodes.last().is_some_and(|last| n <= *last) {
                    break;
                }
                episodes.push(n);
            }
        }

        let mut starts = season_starts;
        starts.extend(caps.get(0).map(|m| m.start()));
        return Some(EpisodeMarker {
            season,
            episodes,
            starts,
        });
    }

    for pattern in [&*CROSS_MARKER, &*SEASON_EPISODE_WORDS] {
        if let Some(caps) = pattern.captures(text) {
            let mut starts = season_starts;
            starts.extend(caps.get(0).map(|m| m.start()));
            return Some(EpisodeMarker {
                season: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                episodes: caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .into_iter()
                    .collect(),
                starts,
            });
        }
    }

    let season = SEASON_ONLY.captures(text).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok())
    });

    let episode = EPISODE_ONLY
        .captures(text)
        .or_else(|| ABSOLUTE_EPISODE.captures(text));
    let mut starts = season_starts;
    let mut episodes = Vec::new();
    if let Some(caps) = episode {
        starts.extend(caps.get(0).map(|m| m.start()));
        episodes.extend(caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()));
    }

    if season.is_none() && episodes.is_empty() {
        return None;
    }

    Some(EpisodeMarker {
        season,
        episodes,
        starts,
    })
}

/// Pick the release year.
///
/// A year at the very start of the name is part of the title ("1917",
/// "2001 A Space Odyssey"). Otherwise the last year before the first quality
/// marker wins, so "Blade Runner 2049 2017" resolves to 2017.
fn pick_year(text: &str, first_marker: usize) -> Option<(usize, u32)> {
    let candidates: Vec<(usize, u32)> = YEAR
        .find_iter(text)
        .filter(|m| !text[..m.start()].trim().is_empty())
        .filter_map(|m| m.as_str().parse().ok().map(|y| (m.start(), y)))
        .collect();

    candidates
        .iter()
        .filter(|(start, _)| *start < first_marker)
        .last()
        .or_else(|| candidates.first())
        .copied()
}

fn first_rule(text: &str, rules: &[Rule], cuts: &mut Vec<usize>) -> Option<String> {
    rules.iter().find_map(|r| {
        r.pattern.find(text).map(|m| {
            cuts.push(m.start());
            r.value.to_string()
        })
    })
}

/// Record where unambiguous source tokens start.
fn source_cuts(text: &str, cuts: &mut Vec<usize>) {
    cuts.extend(
        SOURCES
            .iter()
            .filter(|r| !r.ambiguous)
            .filter_map(|r| r.pattern.find(text).map(|m| m.start())),
    );
}

/// First source rule that applies. Ambiguous words only count past the
/// title `boundary`.
fn pick_source(text: &str, boundary: usize) -> Option<String> {
    SOURCES.iter().find_map(|r| {
        let hit = if r.ambiguous {
            r.pattern
                .find_iter(text)
                .any(|m| m.start() > 0 && m.start() >= boundary)
        } else {
            r.pattern.is_match(text)
        };
        hit.then(|| r.value.to_string())
    })
}

/// Pull the title end back over edition markers that sit right before
/// `boundary`. A marker at the very start is always title.
fn edition_edge(text: &str, boundary: usize) -> usize {
    let markers: Vec<_> = EDITION_MARKERS
        .find_iter(text)
        .filter(|m| m.start() > 0 && m.end() <= boundary)
        .collect();

    let mut edge = boundary;
    for m in markers.iter().rev() {
        if !text[m.end()..edge].trim().is_empty() {
            break;
        }
        edge = m.start();
    }
    edge
}

fn all_rules(text: &str, rules: &[Rule], cuts: &mut Vec<usize>) -> Vec<String> {
    let mut found = Vec::new();
    for r in rules {
        if let Some(m) = r.pattern.find(text) {
            cuts.push(m.start());
            if !found.iter().any(|v| v == r.value) {
                found.push(r.value.to_string());
            }
        }
    }
    found
}

fn audio_codecs(text: &str, cuts: &mut Vec<usize>) -> Vec<String> {
    let mut found = all_rules(text, &AUDIO_CODECS, cuts);
    let has_dts_variant = found
        .iter()
        .any(|c| c.starts_with("DTS-") || c == "DTS:X");
    if has_dts_variant {
        found.retain(|c| c != "DTS");
    }
    found
}

fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| if c == '.' || c == '_' { ' ' } else { c })
        .collect()
}

fn clean_title(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let title = collapsed.trim_end_matches([' ', '-', '–', ',', '+']).trim();

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
