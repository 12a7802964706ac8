//! AI-assisted intake: decomposing free prose into story-bible drafts.
//!
//! The flow is:
//!
//! 1. [`build_decompose_prompt`] produces the prompt sent to the text model.
//! 2. [`parse_decompose_response`] turns the model's reply into a
//!    [`DecomposeResult`], discarding anything unusable.
//! 3. [`annotate_existing`] wraps each draft in a [`CommitItem`] proposal,
//!    defaulting to *merge* when an entity with the same name already exists.
//! 4. The author edits the proposals and sends them back as a
//!    [`CommitRequest`]; the service layer applies them and reports a
//!    [`CommitReport`].
//!
//! Enum-like draft fields are kept as strings: models are sloppy, and one bad
//! role value should not cost the author the whole character.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bible::{Facets, Motivation};
use crate::error::CoreError;
use crate::story::{CharacterRole, ConflictType, FactionStance, ForeshadowingTerm, RelationshipType};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest input accepted for a single decompose call, in characters.
pub const MAX_INTAKE_TEXT_CHARS: usize = 60_000;

pub const KIND_CHARACTER: &str = "character";
pub const KIND_RELATIONSHIP: &str = "relationship";
pub const KIND_LOCATION: &str = "location";
pub const KIND_FACTION: &str = "faction";
pub const KIND_TIMELINE: &str = "timeline_event";
pub const KIND_FORESHADOWING: &str = "foreshadowing";

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDraft {
    pub name: String,
    pub role: Option<String>,
    pub appearance: Option<String>,
    pub motivation: Option<Motivation>,
    pub conflict_type: Option<String>,
    pub facets: Option<Facets>,
    pub voice_samples: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipDraft {
    pub source_name: String,
    pub target_name: String,
    pub rel_type: String,
    pub join_reason: Option<String>,
    pub independent_goal: Option<String>,
    pub evolution: Option<String>,
    pub mc_needs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDraft {
    pub name: String,
    pub location_type: Option<String>,
    pub significance: Option<String>,
    pub atmosphere: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactionDraft {
    pub name: String,
    pub faction_type: Option<String>,
    pub leader_name: Option<String>,
    pub stance_to_mc: Option<String>,
    pub goals: Vec<String>,
    pub resources: Vec<String>,
    pub internal_conflict: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDraft {
    pub event_date: Option<String>,
    pub description: String,
    pub related_characters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeshadowingDraft {
    pub content: String,
    pub planted_text: Option<String>,
    pub planned_payoff: Option<String>,
    pub term: Option<String>,
}

/// Everything extracted from one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeResult {
    pub characters: Vec<CharacterDraft>,
    pub relationships: Vec<RelationshipDraft>,
    pub locations: Vec<LocationDraft>,
    pub factions: Vec<FactionDraft>,
    pub timeline: Vec<TimelineDraft>,
    pub foreshadowing: Vec<ForeshadowingDraft>,
}

impl DecomposeResult {
    pub fn total(&self) -> usize {
        self.characters.len()
            + self.relationships.len()
            + self.locations.len()
            + self.factions.len()
            + self.timeline.len()
            + self.foreshadowing.len()
    }
}

// ---------------------------------------------------------------------------
// Commit model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitAction {
    Create,
    Merge,
    Skip,
}

/// One draft plus what to do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitItem<T> {
    pub action: CommitAction,
    /// Target of a merge.
    #[serde(default)]
    pub existing_id: Option<DbId>,
    pub draft: T,
}

impl<T> CommitItem<T> {
    pub fn create(draft: T) -> Self {
        Self {
            action: CommitAction::Create,
            existing_id: None,
            draft,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRequest {
    pub characters: Vec<CommitItem<CharacterDraft>>,
    pub relationships: Vec<CommitItem<RelationshipDraft>>,
    pub locations: Vec<CommitItem<LocationDraft>>,
    pub factions: Vec<CommitItem<FactionDraft>>,
    pub timeline: Vec<CommitItem<TimelineDraft>>,
    pub foreshadowing: Vec<CommitItem<ForeshadowingDraft>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedEntity {
    pub kind: String,
    pub id: DbId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntity {
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitFailure {
    pub kind: String,
    pub name: String,
    pub message: String,
}

/// Outcome of a commit. Individual failures never abort the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub created: Vec<CommittedEntity>,
    pub merged: Vec<CommittedEntity>,
    pub skipped: Vec<SkippedEntity>,
    pub errors: Vec<CommitFailure>,
}

impl CommitReport {
    pub fn record(&mut self, action: CommitAction, kind: &str, id: DbId, name: &str) {
        let entry = CommittedEntity {
            kind: kind.to_string(),
            id,
            name: name.to_string(),
        };
        match action {
            CommitAction::Create => self.created.push(entry),
            CommitAction::Merge => self.merged.push(entry),
            CommitAction::Skip => self.skipped.push(SkippedEntity {
                kind: entry.kind,
                name: entry.name,
            }),
        }
    }

    pub fn skip(&mut self, kind: &str, name: &str) {
        self.skipped.push(SkippedEntity {
            kind: kind.to_string(),
            name: name.to_string(),
        });
    }

    pub fn fail(&mut self, kind: &str, name: &str, message: impl Into<String>) {
        self.errors.push(CommitFailure {
            kind: kind.to_string(),
            name: name.to_string(),
            message: message.into(),
        });
    }
}

// ---------------------------------------------------------------------------
// Name resolution
// ---------------------------------------------------------------------------

/// Normalize a name for matching: trimmed, lowercased, inner whitespace
/// collapsed.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive name to id lookup.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    ids: HashMap<String, DbId>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (DbId, &'a str)>) -> Self {
        let mut index = Self::new();
        for (id, name) in pairs {
            index.insert(name, id);
        }
        index
    }

    /// Later inserts win, so freshly created entities shadow older ones.
    pub fn insert(&mut self, name: &str, id: DbId) {
        let key = normalize_name(name);
        if !key.is_empty() {
            self.ids.insert(key, id);
        }
    }

    pub fn get(&self, name: &str) -> Option<DbId> {
        self.ids.get(&normalize_name(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Names already in the story bible, per kind.
#[derive(Debug, Clone, Default)]
pub struct ExistingNames {
    pub characters: NameIndex,
    pub locations: NameIndex,
    pub factions: NameIndex,
}

/// Turn raw drafts into commit proposals. Drafts whose name matches an
/// existing entity of the same kind default to merging into it.
pub fn annotate_existing(result: DecomposeResult, existing: &ExistingNames) -> CommitRequest {
    fn propose<T>(draft: T, existing_id: Option<DbId>) -> CommitItem<T> {
        match existing_id {
            Some(id) => CommitItem {
                action: CommitAction::Merge,
                existing_id: Some(id),
                draft,
            },
            None => CommitItem::create(draft),
        }
    }

    CommitRequest {
        characters: result
            .characters
            .into_iter()
            .map(|d| {
                let id = existing.characters.get(&d.name);
                propose(d, id)
            })
            .collect(),
        locations: result
            .locations
            .into_iter()
            .map(|d| {
                let id = existing.locations.get(&d.name);
                propose(d, id)
            })
            .collect(),
        factions: result
            .factions
            .into_iter()
            .map(|d| {
                let id = existing.factions.get(&d.name);
                propose(d, id)
            })
            .collect(),
        relationships: result.relationships.into_iter().map(CommitItem::create).collect(),
        timeline: result.timeline.into_iter().map(CommitItem::create).collect(),
        foreshadowing: result.foreshadowing.into_iter().map(CommitItem::create).collect(),
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

const SYSTEM_PROMPT: &str = "You are a meticulous story-bible editor. You read fiction and extract \
structured reference data for the author. Only extract what the text supports. Answer with a \
single JSON object and nothing else.";

/// Build the `(system, user)` prompt pair for a decompose call.
pub fn build_decompose_prompt(text: &str, hints: Option<&str>) -> (String, String) {
    let roles = CharacterRole::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join("|");
    let conflicts = ConflictType::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join("|");
    let rel_types = RelationshipType::ALL.iter().map(|r| r.as_str()).collect::<Vec<_>>().join("|");
    let stances = FactionStance::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join("|");
    let terms = ForeshadowingTerm::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join("|");

    let mut user = format!(
        "Extract story-bible entities from the text below.\n\n\
         Respond with JSON of this shape (omit unknown fields, use empty arrays for empty sections):\n\
         {{\n\
           \"characters\": [{{\"name\": \"\", \"role\": \"{roles}\", \"appearance\": \"\", \
         \"motivation\": {{\"surface\": \"\", \"hidden\": \"\", \"core\": \"\"}}, \
         \"conflict_type\": \"{conflicts}\", \"voice_samples\": [\"\"]}}],\n\
           \"relationships\": [{{\"source_name\": \"\", \"target_name\": \"\", \"rel_type\": \"{rel_types}\", \
         \"join_reason\": \"\", \"independent_goal\": \"\", \"evolution\": \"\"}}],\n\
           \"locations\": [{{\"name\": \"\", \"location_type\": \"\", \"significance\": \"\", \"atmosphere\": \"\"}}],\n\
           \"factions\": [{{\"name\": \"\", \"faction_type\": \"\", \"leader_name\": \"\", \"stance_to_mc\": \"{stances}\", \
         \"goals\": [\"\"], \"resources\": [\"\"]}}],\n\
           \"timeline\": [{{\"event_date\": \"\", \"description\": \"\", \"related_characters\": [\"\"]}}],\n\
           \"foreshadowing\": [{{\"content\": \"\", \"planted_text\": \"\", \"planned_payoff\": \"\", \"term\": \"{terms}\"}}]\n\
         }}\n"
    );

    if let Some(hints) = hints.map(str::trim).filter(|h| !h.is_empty()) {
        user.push_str("\nAuthor notes: ");
        user.push_str(hints);
        user.push('\n');
    }

    user.push_str("\n<text>\n");
    user.push_str(text);
    user.push_str("\n</text>\n");

    (SYSTEM_PROMPT.to_string(), user)
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Slice the outermost `{ ... }` out of a model reply. Code fences and
/// chatter around the object are ignored.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Keep `value` only if it parses as a known enum value after normalizing
/// case, spaces and hyphens.
fn normalize_enum<T>(value: Option<String>, parse: fn(&str) -> Result<T, String>) -> Option<String> {
    let normalized = value?.trim().to_lowercase().replace([' ', '-'], "_");
    parse(&normalized).ok().map(|_| normalized)
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Parse one section leniently: entries that fail to deserialize are dropped
/// rather than failing the whole reply.
fn section<T: serde::de::DeserializeOwned>(object: &serde_json::Value, key: &str) -> Vec<T> {
    object
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse and clean a model reply.
pub fn parse_decompose_response(raw: &str) -> Result<DecomposeResult, CoreError> {
    let json = extract_json_object(raw).ok_or_else(|| {
        CoreError::Validation("Model response did not contain a JSON object".to_string())
    })?;
    let object: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("Model response is not valid JSON: {e}")))?;

    let characters = section::<CharacterDraft>(&object, "characters")
        .into_iter()
        .filter(|d| !d.name.trim().is_empty())
        .map(|d| CharacterDraft {
            name: d.name.trim().to_string(),
            role: normalize_enum(d.role, CharacterRole::from_str_value),
            appearance: clean(d.appearance),
            motivation: d.motivation,
            conflict_type: normalize_enum(d.conflict_type, ConflictType::from_str_value),
            facets: d.facets,
            voice_samples: clean_list(d.voice_samples),
        })
        .collect();

    let relationships = section::<RelationshipDraft>(&object, "relationships")
        .into_iter()
        .filter(|d| !d.source_name.trim().is_empty() && !d.target_name.trim().is_empty())
        .filter_map(|d| {
            let rel_type =
                normalize_enum(Some(d.rel_type), RelationshipType::from_str_value)?;
            Some(RelationshipDraft {
                source_name: d.source_name.trim().to_string(),
                target_name: d.target_name.trim().to_string(),
                rel_type,
                join_reason: clean(d.join_reason),
                independent_goal: clean(d.independent_goal),
                evolution: clean(d.evolution),
                mc_needs: clean(d.mc_needs),
            })
        })
        .collect();

    let locations = section::<LocationDraft>(&object, "locations")
        .into_iter()
        .filter(|d| !d.name.trim().is_empty())
        .map(|d| LocationDraft {
            name: d.name.trim().to_string(),
            location_type: clean(d.location_type),
            significance: clean(d.significance),
            atmosphere: clean(d.atmosphere),
        })
        .collect();

    let factions = section::<FactionDraft>(&object, "factions")
        .into_iter()
        .filter(|d| !d.name.trim().is_empty())
        .map(|d| FactionDraft {
            name: d.name.trim().to_string(),
            faction_type: clean(d.faction_type),
            leader_name: clean(d.leader_name),
            stance_to_mc: normalize_enum(d.stance_to_mc, FactionStance::from_str_value),
            goals: clean_list(d.goals),
            resources: clean_list(d.resources),
            internal_conflict: clean(d.internal_conflict),
        })
        .collect();

    let timeline = section::<TimelineDraft>(&object, "timeline")
        .into_iter()
        .filter(|d| !d.description.trim().is_empty())
        .map(|d| TimelineDraft {
            event_date: clean(d.event_date),
            description: d.description.trim().to_string(),
            related_characters: clean_list(d.related_characters),
        })
        .collect();

    let foreshadowing = section::<ForeshadowingDraft>(&object, "foreshadowing")
        .into_iter()
        .filter(|d| !d.content.trim().is_empty())
        .map(|d| ForeshadowingDraft {
            content: d.content.trim().to_string(),
            planted_text: clean(d.planted_text),
            planned_payoff: clean(d.planned_payoff),
            term: normalize_enum(d.term, ForeshadowingTerm::from_str_value),
        })
        .collect();

    Ok(DecomposeResult {
        characters,
        relationships,
        locations,
        factions,
        timeline,
        foreshadowing,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"Here is the extraction:
```json
{
  "characters": [
    {"name": "  Lin Feng ", "role": "Main", "conflict_type": "duty vs desire",
     "voice_samples": ["I don't bow.", "  "]},
    {"name": "", "role": "supporting"},
    {"name": "Elder Mo", "role": "wise old man"}
  ],
  "relationships": [
    {"source_name": "Lin Feng", "target_name": "Elder Mo", "rel_type": "Mentor"},
    {"source_name": "Lin Feng", "target_name": "Su Yan", "rel_type": "frenemy"}
  ],
  "locations": [{"name": "Jade Pavilion", "atmosphere": " quiet "}],
  "factions": [{"name": "Azure Sect", "leader_name": "Elder Mo", "stance_to_mc": "HOSTILE"}],
  "timeline": [{"description": "The sect burns", "event_date": "Year 3"}],
  "foreshadowing": [{"content": "broken sword", "term": "long"}]
}
```"#;

    #[test]
    fn parses_fenced_reply() {
        let result = parse_decompose_response(REPLY).unwrap();
        assert_eq!(result.characters.len(), 2);
        let lin = &result.characters[0];
        assert_eq!(lin.name, "Lin Feng");
        assert_eq!(lin.role.as_deref(), Some("main"));
        assert_eq!(lin.conflict_type.as_deref(), Some("duty_vs_desire"));
        assert_eq!(lin.voice_samples, vec!["I don't bow."]);

        // Unknown role is dropped, the character is kept.
        assert_eq!(result.characters[1].name, "Elder Mo");
        assert_eq!(result.characters[1].role, None);
    }

    #[test]
    fn drops_relationships_with_unknown_type() {
        let result = parse_decompose_response(REPLY).unwrap();
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].rel_type, "mentor");
    }

    #[test]
    fn cleans_other_sections() {
        let result = parse_decompose_response(REPLY).unwrap();
        assert_eq!(result.locations[0].atmosphere.as_deref(), Some("quiet"));
        assert_eq!(result.factions[0].stance_to_mc.as_deref(), Some("hostile"));
        assert_eq!(result.timeline[0].event_date.as_deref(), Some("Year 3"));
        assert_eq!(result.foreshadowing[0].term.as_deref(), Some("long"));
        assert_eq!(result.total(), 7);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let result = parse_decompose_response(r#"{"locations": [{"name": "Cave"}]}"#).unwrap();
        assert_eq!(result.locations.len(), 1);
        assert!(result.characters.is_empty());
        assert!(result.foreshadowing.is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let result =
            parse_decompose_response(r#"{"characters": [42, {"name": "Su Yan"}, "x"]}"#).unwrap();
        assert_eq!(result.characters.len(), 1);
        assert_eq!(result.characters[0].name, "Su Yan");
    }

    #[test]
    fn reply_without_json_is_an_error() {
        let err = parse_decompose_response("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        let err = parse_decompose_response("{ not json }").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn name_index_is_case_and_space_insensitive() {
        let mut index = NameIndex::from_pairs([(1, "Lin Feng"), (2, "Elder Mo")]);
        assert_eq!(index.get("lin   feng"), Some(1));
        assert_eq!(index.get(" ELDER MO "), Some(2));
        assert_eq!(index.get("Su Yan"), None);

        index.insert("lin feng", 9);
        assert_eq!(index.get("Lin Feng"), Some(9));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn annotate_defaults_to_merge_for_known_names() {
        let result = parse_decompose_response(REPLY).unwrap();
        let existing = ExistingNames {
            characters: NameIndex::from_pairs([(5, "elder mo")]),
            locations: NameIndex::from_pairs([(8, "JADE PAVILION")]),
            factions: NameIndex::new(),
        };
        let proposals = annotate_existing(result, &existing);

        assert_eq!(proposals.characters[0].action, CommitAction::Create);
        assert_eq!(proposals.characters[1].action, CommitAction::Merge);
        assert_eq!(proposals.characters[1].existing_id, Some(5));
        assert_eq!(proposals.locations[0].existing_id, Some(8));
        assert_eq!(proposals.factions[0].action, CommitAction::Create);
        assert_eq!(proposals.relationships[0].action, CommitAction::Create);
    }

    #[test]
    fn prompt_includes_text_hints_and_vocabulary() {
        let (system, user) = build_decompose_prompt("Lin Feng wept.", Some("focus on factions"));
        assert!(system.contains("JSON"));
        assert!(user.contains("<text>\nLin Feng wept.\n</text>"));
        assert!(user.contains("Author notes: focus on factions"));
        assert!(user.contains("companion|rival|enemy|mentor|confidant|lover"));

        let (_, without_hints) = build_decompose_prompt("x", Some("   "));
        assert!(!without_hints.contains("Author notes"));
    }

    #[test]
    fn commit_request_deserializes_with_missing_sections() {
        let request: CommitRequest = serde_json::from_str(
            r#"{"characters": [{"action": "skip", "draft": {"name": "Lin Feng"}}]}"#,
        )
        .unwrap();
        assert_eq!(request.characters[0].action, CommitAction::Skip);
        assert!(request.relationships.is_empty());
    }
}
