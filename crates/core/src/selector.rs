//! Duplicate detection and winner selection.
//!
//! Candidates that map to the same target path are duplicates of one
//! library item. Exactly one of them, the highest scoring, gets linked.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::info;

use crate::quality::format_score;
use crate::resolver::ResolvedMedia;
use crate::scanner::SourceFile;

/// A resolved file together with the target path it would occupy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: SourceFile,
    pub media: ResolvedMedia,
    pub target: PathBuf,
}

impl Candidate {
    /// Key identifying the library slot this candidate competes for.
    pub fn target_key(&self) -> String {
        self.target.to_string_lossy().into_owned()
    }

    /// Key identifying the source file.
    pub fn source_key(&self) -> String {
        self.source.path.to_string_lossy().into_owned()
    }
}

/// All candidates competing for one target, in discovery order.
#[derive(Debug, Clone)]
pub struct CandidateGroup {
    pub target_key: String,
    pub members: Vec<Candidate>,
}

/// The outcome of selecting within a group.
#[derive(Debug, Clone)]
pub struct Selection {
    pub winner: Candidate,
    pub losers: Vec<Candidate>,
}

impl Selection {
    pub fn is_duplicate(&self) -> bool {
        !self.losers.is_empty()
    }
}

/// Group candidates by target key, preserving first-seen order of groups
/// and of members within each group.
pub fn group_by_target(candidates: Vec<Candidate>) -> Vec<CandidateGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CandidateGroup> = Vec::new();

    for candidate in candidates {
        let key = candidate.target_key();
        match index.get(&key) {
            Some(&i) => groups[i].members.push(candidate),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(CandidateGroup {
                    target_key: key,
                    members: vec![candidate],
                });
            }
        }
    }

    groups
}

impl CandidateGroup {
    /// Pick the highest score. Ties keep the earliest member, so the result
    /// is stable across scans with the same discovery order.
    ///
    /// Returns `None` only for an empty group.
    pub fn select(self) -> Option<Selection> {
        let mut members = self.members.into_iter();
        let mut winner = members.next()?;
        let mut losers = Vec::new();

        for candidate in members {
            if candidate.media.score > winner.media.score {
                losers.push(std::mem::replace(&mut winner, candidate));
            } else {
                losers.push(candidate);
            }
        }

        Some(Selection { winner, losers })
    }
}

/// Group candidates and select one winner per target.
///
/// Every duplicate group is logged with the winner and each loser.
pub fn select_winners(candidates: Vec<Candidate>) -> Vec<Selection> {
    let selections: Vec<Selection> = group_by_target(candidates)
        .into_iter()
        .filter_map(CandidateGroup::select)
        .collect();

    for selection in selections.iter().filter(|s| s.is_duplicate()) {
        info!(
            "Duplicate: {} candidates for {}",
            selection.losers.len() + 1,
            selection.winner.target.display()
        );
        info!(
            "  kept    {} {}",
            format_score(selection.winner.media.score),
            selection.winner.source.file_name
        );
        for loser in &selection.losers {
            info!(
                "  skipped {} {}",
                format_score(loser.media.score),
                loser.source.file_name
            );
        }
    }

    selections
}
