//! Chapter setup assist.
//!
//! Ranks the characters, locations and foreshadowing threads an author is
//! likely to need for a chapter. Three sources contribute, each with a fixed
//! confidence:
//!
//! | source             | confidence |
//! |--------------------|------------|
//! | outline mention    | 0.9        |
//! | previous chapter   | 0.7        |
//! | arc roster         | 0.5        |
//!
//! A candidate reached through several sources is reported once, with the
//! highest confidence. Everything here is pure; the caller loads the data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::text::mentions;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIDENCE_OUTLINE: f64 = 0.9;
pub const CONFIDENCE_PREVIOUS_CHAPTER: f64 = 0.7;
pub const CONFIDENCE_ARC_ROSTER: f64 = 0.5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a candidate was suggested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionSource {
    Outline,
    PreviousChapter,
    ArcRoster,
}

impl SuggestionSource {
    pub fn confidence(self) -> f64 {
        match self {
            Self::Outline => CONFIDENCE_OUTLINE,
            Self::PreviousChapter => CONFIDENCE_PREVIOUS_CHAPTER,
            Self::ArcRoster => CONFIDENCE_ARC_ROSTER,
        }
    }
}

/// Something that can be suggested: an id plus the text shown to the author.
///
/// For characters and locations the label is the name; for foreshadowing it
/// is the thread's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: DbId,
    pub label: String,
}

impl Candidate {
    pub fn new(id: DbId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: DbId,
    pub label: String,
    pub confidence: f64,
    pub source: SuggestionSource,
}

/// Roster of the chapter preceding the one being set up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviousChapterRoster {
    pub characters: Vec<DbId>,
    pub locations: Vec<DbId>,
    pub foreshadowing: Vec<DbId>,
}

/// Everything the assist needs, already materialized in memory.
#[derive(Debug, Clone, Default)]
pub struct ChapterSetupInput {
    pub outline: String,
    pub previous_chapter: Option<PreviousChapterRoster>,
    /// `main_characters` of the chapter's arc.
    pub arc_roster: Vec<DbId>,
    pub characters: Vec<Candidate>,
    pub locations: Vec<Candidate>,
    /// Only active threads; resolved or abandoned ones must not be passed.
    pub active_foreshadowing: Vec<Candidate>,
}

/// Ranked suggestions per entity kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterSetupSuggestions {
    pub characters: Vec<Suggestion>,
    pub locations: Vec<Suggestion>,
    pub foreshadowing: Vec<Suggestion>,
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Accumulates suggestions for one entity kind, keeping the best per id.
struct Ranker<'a> {
    candidates: HashMap<DbId, &'a Candidate>,
    best: HashMap<DbId, Suggestion>,
}

impl<'a> Ranker<'a> {
    fn new(candidates: &'a [Candidate]) -> Self {
        Self {
            candidates: candidates.iter().map(|c| (c.id, c)).collect(),
            best: HashMap::new(),
        }
    }

    /// Record `source` for `id`. Unknown ids are ignored.
    fn offer(&mut self, id: DbId, source: SuggestionSource) {
        let Some(candidate) = self.candidates.get(&id) else {
            return;
        };
        let confidence = source.confidence();
        match self.best.get(&id) {
            Some(existing) if existing.confidence >= confidence => {}
            _ => {
                self.best.insert(
                    id,
                    Suggestion {
                        id,
                        label: candidate.label.clone(),
                        confidence,
                        source,
                    },
                );
            }
        }
    }

    fn offer_mentions(&mut self, outline: &str, candidates: &[Candidate]) {
        for candidate in candidates {
            if mentions(outline, &candidate.label) {
                self.offer(candidate.id, SuggestionSource::Outline);
            }
        }
    }

    fn offer_all(&mut self, ids: &[DbId], source: SuggestionSource) {
        for &id in ids {
            self.offer(id, source);
        }
    }

    fn finish(self) -> Vec<Suggestion> {
        let mut out: Vec<Suggestion> = self.best.into_values().collect();
        out.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.label.cmp(&b.label))
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }
}

/// Rank candidates for a chapter.
pub fn suggest(input: &ChapterSetupInput) -> ChapterSetupSuggestions {
    let previous = input.previous_chapter.as_ref();

    let mut characters = Ranker::new(&input.characters);
    characters.offer_mentions(&input.outline, &input.characters);
    if let Some(prev) = previous {
        characters.offer_all(&prev.characters, SuggestionSource::PreviousChapter);
    }
    characters.offer_all(&input.arc_roster, SuggestionSource::ArcRoster);

    let mut locations = Ranker::new(&input.locations);
    locations.offer_mentions(&input.outline, &input.locations);
    if let Some(prev) = previous {
        locations.offer_all(&prev.locations, SuggestionSource::PreviousChapter);
    }

    let mut foreshadowing = Ranker::new(&input.active_foreshadowing);
    foreshadowing.offer_mentions(&input.outline, &input.active_foreshadowing);
    if let Some(prev) = previous {
        foreshadowing.offer_all(&prev.foreshadowing, SuggestionSource::PreviousChapter);
    }

    ChapterSetupSuggestions {
        characters: characters.finish(),
        locations: locations.finish(),
        foreshadowing: foreshadowing.finish(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cast() -> Vec<Candidate> {
        vec![
            Candidate::new(1, "Lin Feng"),
            Candidate::new(2, "Elder Mo"),
            Candidate::new(3, "Su Yan"),
            Candidate::new(4, "Bai Qi"),
        ]
    }

    #[test]
    fn outline_mention_scores_highest() {
        let input = ChapterSetupInput {
            outline: "Lin Feng confronts the sect at dawn.".into(),
            characters: cast(),
            ..Default::default()
        };
        let out = suggest(&input);
        assert_eq!(out.characters.len(), 1);
        assert_eq!(out.characters[0].id, 1);
        assert_eq!(out.characters[0].confidence, CONFIDENCE_OUTLINE);
        assert_eq!(out.characters[0].source, SuggestionSource::Outline);
    }

    #[test]
    fn duplicates_keep_highest_confidence() {
        let input = ChapterSetupInput {
            outline: "elder mo reveals the map".into(),
            previous_chapter: Some(PreviousChapterRoster {
                characters: vec![2, 3],
                ..Default::default()
            }),
            arc_roster: vec![2, 3, 4],
            characters: cast(),
            ..Default::default()
        };
        let out = suggest(&input);
        let ids: Vec<DbId> = out.characters.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);

        assert_eq!(out.characters[0].source, SuggestionSource::Outline);
        assert_eq!(out.characters[1].source, SuggestionSource::PreviousChapter);
        assert_eq!(out.characters[1].confidence, CONFIDENCE_PREVIOUS_CHAPTER);
        assert_eq!(out.characters[2].source, SuggestionSource::ArcRoster);
        assert_eq!(out.characters[2].confidence, CONFIDENCE_ARC_ROSTER);
    }

    #[test]
    fn source_order_does_not_change_winner() {
        // The arc roster is offered last; a weaker later source must not
        // overwrite a stronger earlier one.
        let input = ChapterSetupInput {
            previous_chapter: Some(PreviousChapterRoster {
                characters: vec![3],
                ..Default::default()
            }),
            arc_roster: vec![3],
            characters: cast(),
            ..Default::default()
        };
        let out = suggest(&input);
        assert_eq!(out.characters.len(), 1);
        assert_eq!(out.characters[0].source, SuggestionSource::PreviousChapter);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let input = ChapterSetupInput {
            previous_chapter: Some(PreviousChapterRoster {
                characters: vec![99],
                locations: vec![42],
                foreshadowing: vec![7],
            }),
            arc_roster: vec![100],
            characters: cast(),
            ..Default::default()
        };
        let out = suggest(&input);
        assert!(out.characters.is_empty());
        assert!(out.locations.is_empty());
        assert!(out.foreshadowing.is_empty());
    }

    #[test]
    fn ties_sort_by_label_then_id() {
        let input = ChapterSetupInput {
            arc_roster: vec![4, 3, 2, 1],
            characters: cast(),
            ..Default::default()
        };
        let out = suggest(&input);
        let labels: Vec<&str> = out.characters.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Bai Qi", "Elder Mo", "Lin Feng", "Su Yan"]);
    }

    #[test]
    fn locations_use_outline_and_previous_chapter() {
        let input = ChapterSetupInput {
            outline: "They flee to the Jade Pavilion.".into(),
            previous_chapter: Some(PreviousChapterRoster {
                locations: vec![11],
                ..Default::default()
            }),
            locations: vec![
                Candidate::new(10, "Jade Pavilion"),
                Candidate::new(11, "Outer Gate"),
                Candidate::new(12, "Library"),
            ],
            ..Default::default()
        };
        let out = suggest(&input);
        let ids: Vec<DbId> = out.locations.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn foreshadowing_limited_to_active_candidates() {
        // Thread 21 was hinted last chapter but is no longer active, so the
        // caller did not pass it as a candidate.
        let input = ChapterSetupInput {
            outline: "The broken sword glows again.".into(),
            previous_chapter: Some(PreviousChapterRoster {
                foreshadowing: vec![20, 21],
                ..Default::default()
            }),
            active_foreshadowing: vec![
                Candidate::new(20, "a stranger's debt"),
                Candidate::new(22, "broken sword"),
            ],
            ..Default::default()
        };
        let out = suggest(&input);
        let ids: Vec<DbId> = out.foreshadowing.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![22, 20]);
        assert_eq!(out.foreshadowing[0].source, SuggestionSource::Outline);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let out = suggest(&ChapterSetupInput::default());
        assert_eq!(out, ChapterSetupSuggestions::default());
    }
}
