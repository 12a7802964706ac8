//! Structured story-bible values.
//!
//! Two groups of types live here:
//!
//! - JSON column payloads (motivation layers, facets, power system, arc
//!   sections, outline...) shared by the db models and the API.
//! - [`BibleSnapshot`], a name-keyed, id-free rendition of the whole bible
//!   used for JSON export, Markdown export and seed files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::story::{
    ArcStatus, ArcType, CharacterRole, ConflictType, FactionStance, ForeshadowingStatus,
    ForeshadowingTerm, HookStyle, HookType, RelationshipType,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// JSON column payloads
// ---------------------------------------------------------------------------

/// Layered motivation: what the character says, hides, and truly needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Motivation {
    pub surface: Option<String>,
    pub hidden: Option<String>,
    pub core: Option<String>,
}

/// How a character presents in different settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Facets {
    pub public: Option<String>,
    pub private: Option<String>,
    pub hidden: Option<String>,
    pub under_pressure: Option<String>,
}

/// A character's personal arc summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterArc {
    pub arc_type: Option<String>,
    pub start_state: Option<String>,
    pub end_state: Option<String>,
    pub phases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSystem {
    pub name: Option<String>,
    pub levels: Vec<String>,
    pub core_rules: Vec<String>,
    pub constraints: Vec<String>,
}

/// Free-form named rules of the setting ("inheritance" -> "eldest son").
pub type SocialRules = BTreeMap<String, String>;

/// A named slice of an arc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcSection {
    pub name: String,
    pub chapters: Vec<DbId>,
    pub section_type: Option<String>,
    pub status: Option<String>,
}

/// A reinforcement of a foreshadowing thread in a later chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeshadowingHint {
    pub chapter: DbId,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterOutline {
    pub goal: Option<String>,
    pub scenes: Vec<String>,
    pub hook_ending: Option<String>,
}

impl ChapterOutline {
    /// Flatten the outline into one block of text for mention matching.
    pub fn to_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(goal) = self.goal.as_deref() {
            parts.push(goal);
        }
        parts.extend(self.scenes.iter().map(String::as_str));
        if let Some(hook) = self.hook_ending.as_deref() {
            parts.push(hook);
        }
        parts.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSection {
    pub power_system: Option<PowerSystem>,
    pub social_rules: SocialRules,
}

impl WorldSection {
    pub fn is_empty(&self) -> bool {
        self.power_system.is_none() && self.social_rules.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterEntry {
    pub name: String,
    pub role: Option<CharacterRole>,
    pub appearance: Option<String>,
    pub voice_samples: Vec<String>,
    pub motivation: Option<Motivation>,
    pub conflict_type: Option<ConflictType>,
    pub template: Option<String>,
    pub facets: Option<Facets>,
    pub arc: Option<CharacterArc>,
}

/// Endpoints are character names, not ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEntry {
    pub source: String,
    pub target: String,
    pub rel_type: RelationshipType,
    #[serde(default)]
    pub join_reason: Option<String>,
    #[serde(default)]
    pub independent_goal: Option<String>,
    #[serde(default)]
    pub appeal: Option<String>,
    #[serde(default)]
    pub evolution: Option<String>,
    #[serde(default)]
    pub disagree_scenarios: Vec<String>,
    #[serde(default)]
    pub leave_scenarios: Vec<String>,
    #[serde(default)]
    pub mc_needs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationEntry {
    pub name: String,
    pub location_type: Option<String>,
    pub significance: Option<String>,
    pub atmosphere: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionEntry {
    pub name: String,
    pub faction_type: Option<String>,
    pub status_in_story: Option<String>,
    /// Leader's character name.
    pub leader: Option<String>,
    pub stance_to_mc: Option<FactionStance>,
    pub goals: Vec<String>,
    pub resources: Vec<String>,
    pub internal_conflict: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub event_date: Option<String>,
    pub description: String,
    /// Character names.
    pub related_characters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcEntry {
    pub name: String,
    pub arc_type: Option<ArcType>,
    pub status: Option<ArcStatus>,
    pub progress: Option<i64>,
    /// Character names.
    pub main_characters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeshadowingEntry {
    pub content: String,
    pub planted_text: Option<String>,
    pub planned_payoff: Option<String>,
    pub term: Option<ForeshadowingTerm>,
    pub status: Option<ForeshadowingStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookEntry {
    pub hook_type: HookType,
    pub content: String,
    #[serde(default)]
    pub style: Option<HookStyle>,
    #[serde(default)]
    pub strength: Option<i64>,
}

/// The whole story bible, keyed by names so it survives a round trip
/// through a fresh database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibleSnapshot {
    pub world: Option<WorldSection>,
    pub characters: Vec<CharacterEntry>,
    pub relationships: Vec<RelationshipEntry>,
    pub locations: Vec<LocationEntry>,
    pub factions: Vec<FactionEntry>,
    pub timeline: Vec<TimelineEntry>,
    pub arcs: Vec<ArcEntry>,
    pub foreshadowing: Vec<ForeshadowingEntry>,
    pub hooks: Vec<HookEntry>,
}
