//! Import a story-bible seed file into an empty database.

use std::path::Path;

use lorekeeper_core::bible::BibleSnapshot;
use lorekeeper_core::intake::NameIndex;
use lorekeeper_core::story::ForeshadowingStatus;
use lorekeeper_core::types::DbId;
use lorekeeper_core::validation::{validate_name, validate_no_self_reference};
use lorekeeper_db::models::arc::CreateArc;
use lorekeeper_db::models::character::CreateCharacter;
use lorekeeper_db::models::faction::CreateFaction;
use lorekeeper_db::models::foreshadowing::CreateForeshadowing;
use lorekeeper_db::models::hook::CreateHook;
use lorekeeper_db::models::location::CreateLocation;
use lorekeeper_db::models::relationship::CreateRelationship;
use lorekeeper_db::models::timeline::CreateTimelineEvent;
use lorekeeper_db::models::world::UpdateWorld;
use lorekeeper_db::repositories::CharacterRepo;
use lorekeeper_db::DbPool;
use lorekeeper_events::EventBus;
use serde::Serialize;

use super::story_bible::StoryBibleService;
use crate::error::{AppError, AppResult};

/// What a seed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// `true` when the database already had characters and nothing was
    /// imported.
    pub skipped: bool,
    pub characters: usize,
    pub relationships: usize,
    pub locations: usize,
    pub factions: usize,
    pub timeline: usize,
    pub arcs: usize,
    pub foreshadowing: usize,
    pub hooks: usize,
}

/// Read a JSON [`BibleSnapshot`] from `path` and import it when the
/// characters table is empty.
pub async fn load_seed(pool: &DbPool, events: &EventBus, path: &Path) -> AppResult<SeedReport> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::InternalError(format!("cannot read seed file {}: {e}", path.display()))
    })?;
    let snapshot: BibleSnapshot = serde_json::from_str(&raw).map_err(|e| {
        AppError::BadRequest(format!("invalid seed file {}: {e}", path.display()))
    })?;

    if CharacterRepo::count(pool).await? > 0 {
        tracing::info!(path = %path.display(), "Database already has characters, seed skipped");
        return Ok(SeedReport {
            skipped: true,
            ..Default::default()
        });
    }

    let report = import_snapshot(&StoryBibleService::new(pool, events), &snapshot).await?;
    tracing::info!(path = %path.display(), ?report, "Seed imported");
    Ok(report)
}

/// Import every section through the service layer, so seeds are validated
/// like any other input. Names are resolved to ids in dependency order.
///
/// Character names and every name reference are checked before the first
/// write, so a seed with a dangling reference leaves the database empty.
pub async fn import_snapshot(
    bible: &StoryBibleService<'_>,
    snapshot: &BibleSnapshot,
) -> AppResult<SeedReport> {
    check_references(snapshot)?;
    let mut report = SeedReport::default();

    if let Some(world) = &snapshot.world {
        bible
            .update_world(&UpdateWorld {
                power_system: world.power_system.clone(),
                social_rules: Some(world.social_rules.clone()),
            })
            .await?;
    }

    let mut characters = NameIndex::new();
    for entry in &snapshot.characters {
        let character = bible
            .create_character(&CreateCharacter {
                name: entry.name.clone(),
                role: entry.role.map(|r| r.as_str().to_string()),
                appearance: entry.appearance.clone(),
                voice_samples: Some(entry.voice_samples.clone()),
                motivation: entry.motivation.clone(),
                conflict_type: entry.conflict_type.map(|c| c.as_str().to_string()),
                template: entry.template.clone(),
                facets: entry.facets.clone(),
                arc: entry.arc.clone(),
                first_appearance: None,
            })
            .await?;
        characters.insert(&character.name, character.id);
        report.characters += 1;
    }

    let resolve = |name: &str| -> AppResult<DbId> {
        characters
            .get(name)
            .ok_or_else(|| AppError::validation(format!("seed references unknown character '{name}'")))
    };

    for entry in &snapshot.relationships {
        bible
            .create_relationship(&CreateRelationship {
                source_id: resolve(&entry.source)?,
                target_id: resolve(&entry.target)?,
                rel_type: entry.rel_type.as_str().to_string(),
                join_reason: entry.join_reason.clone(),
                independent_goal: entry.independent_goal.clone(),
                appeal: entry.appeal.clone(),
                evolution: entry.evolution.clone(),
                disagree_scenarios: Some(entry.disagree_scenarios.clone()),
                leave_scenarios: Some(entry.leave_scenarios.clone()),
                mc_needs: entry.mc_needs.clone(),
            })
            .await?;
        report.relationships += 1;
    }

    for entry in &snapshot.locations {
        bible
            .create_location(&CreateLocation {
                name: entry.name.clone(),
                location_type: entry.location_type.clone(),
                significance: entry.significance.clone(),
                atmosphere: entry.atmosphere.clone(),
                connections: None,
            })
            .await?;
        report.locations += 1;
    }

    for entry in &snapshot.factions {
        let leader_id = match entry.leader.as_deref() {
            Some(name) => Some(resolve(name)?),
            None => None,
        };
        bible
            .create_faction(&CreateFaction {
                name: entry.name.clone(),
                faction_type: entry.faction_type.clone(),
                status_in_story: entry.status_in_story.clone(),
                leader_id,
                stance_to_mc: entry.stance_to_mc.map(|s| s.as_str().to_string()),
                goals: Some(entry.goals.clone()),
                resources: Some(entry.resources.clone()),
                internal_conflict: entry.internal_conflict.clone(),
            })
            .await?;
        report.factions += 1;
    }

    for entry in &snapshot.timeline {
        let related = entry
            .related_characters
            .iter()
            .map(|n| resolve(n))
            .collect::<AppResult<Vec<_>>>()?;
        bible
            .create_timeline_event(&CreateTimelineEvent {
                event_date: entry.event_date.clone(),
                description: entry.description.clone(),
                related_characters: Some(related),
                related_locations: None,
            })
            .await?;
        report.timeline += 1;
    }

    for entry in &snapshot.arcs {
        let roster = entry
            .main_characters
            .iter()
            .map(|n| resolve(n))
            .collect::<AppResult<Vec<_>>>()?;
        bible
            .create_arc(&CreateArc {
                name: entry.name.clone(),
                arc_type: entry.arc_type.map(|t| t.as_str().to_string()),
                status: entry.status.map(|s| s.as_str().to_string()),
                progress: entry.progress,
                main_characters: Some(roster),
                ..Default::default()
            })
            .await?;
        report.arcs += 1;
    }

    for entry in &snapshot.foreshadowing {
        let thread = bible
            .create_foreshadowing(&CreateForeshadowing {
                content: entry.content.clone(),
                planted_text: entry.planted_text.clone(),
                planned_payoff: entry.planned_payoff.clone(),
                term: entry.term.map(|t| t.as_str().to_string()),
                planted_chapter: None,
            })
            .await?;
        match entry.status {
            Some(ForeshadowingStatus::Abandoned) => {
                bible.abandon_foreshadowing(thread.id).await?;
            }
            Some(ForeshadowingStatus::Resolved) => {
                tracing::warn!(
                    foreshadowing_id = thread.id,
                    "Seeded thread marked resolved has no chapter to resolve in, left active"
                );
            }
            Some(ForeshadowingStatus::Active) | None => {}
        }
        report.foreshadowing += 1;
    }

    for entry in &snapshot.hooks {
        bible
            .create_hook(&CreateHook {
                hook_type: entry.hook_type.as_str().to_string(),
                chapter_id: None,
                content: entry.content.clone(),
                style: entry.style.map(|s| s.as_str().to_string()),
                strength: entry.strength,
            })
            .await?;
        report.hooks += 1;
    }

    Ok(report)
}

/// Resolve every character reference against the snapshot's own roster.
fn check_references(snapshot: &BibleSnapshot) -> AppResult<()> {
    for entry in &snapshot.characters {
        validate_name("name", &entry.name)?;
    }
    let roster = NameIndex::from_pairs(
        snapshot
            .characters
            .iter()
            .enumerate()
            .map(|(position, entry)| (position as DbId, entry.name.as_str())),
    );
    let resolve = |name: &str| -> AppResult<DbId> {
        roster
            .get(name)
            .ok_or_else(|| AppError::validation(format!("seed references unknown character '{name}'")))
    };

    for entry in &snapshot.relationships {
        validate_no_self_reference(resolve(&entry.source)?, resolve(&entry.target)?)?;
    }
    let mentioned = snapshot
        .factions
        .iter()
        .filter_map(|f| f.leader.as_deref())
        .chain(
            snapshot
                .timeline
                .iter()
                .flat_map(|t| t.related_characters.iter().map(String::as_str)),
        )
        .chain(
            snapshot
                .arcs
                .iter()
                .flat_map(|a| a.main_characters.iter().map(String::as_str)),
        );
    for name in mentioned {
        resolve(name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(json: &str) -> BibleSnapshot {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn references_resolve_case_insensitively() {
        let seed = snapshot(
            r#"{"characters": [{"name": "Lin Feng"}, {"name": "Elder Mo"}],
                "relationships": [{"source": "lin  feng", "target": "ELDER MO", "rel_type": "enemy"}],
                "factions": [{"name": "Blood Sect", "leader": "Elder Mo"}],
                "arcs": [{"name": "Exile", "main_characters": ["Lin Feng"]}]}"#,
        );
        assert!(check_references(&seed).is_ok());
    }

    #[test]
    fn dangling_references_are_reported_by_name() {
        let seed = snapshot(
            r#"{"characters": [{"name": "Lin Feng"}],
                "timeline": [{"event_date": "Year 1", "description": "Fall", "related_characters": ["Ghost"]}]}"#,
        );
        let err = check_references(&seed).unwrap_err();
        assert!(err.to_string().contains("Ghost"));
    }

    #[test]
    fn self_relationships_and_blank_names_are_rejected() {
        let seed = snapshot(
            r#"{"characters": [{"name": "Lin Feng"}],
                "relationships": [{"source": "Lin Feng", "target": "lin feng", "rel_type": "rival"}]}"#,
        );
        assert!(check_references(&seed).is_err());

        let seed = snapshot(r#"{"characters": [{"name": "  "}]}"#);
        assert!(check_references(&seed).is_err());
    }
}
