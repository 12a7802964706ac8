//! Chapter and story-bible export.

use std::collections::HashMap;

use lorekeeper_core::bible::{
    ArcEntry, BibleSnapshot, CharacterEntry, FactionEntry, ForeshadowingEntry, HookEntry,
    LocationEntry, RelationshipEntry, TimelineEntry, WorldSection,
};
use lorekeeper_core::error::CoreError;
use lorekeeper_core::export::{render_bible_markdown, render_chapters, ExportChapter, ExportFormat};
use lorekeeper_core::story::{
    ArcStatus, ArcType, CharacterRole, ConflictType, FactionStance, ForeshadowingStatus,
    ForeshadowingTerm, HookStyle, HookType, RelationshipType,
};
use lorekeeper_core::text::slugify;
use lorekeeper_core::types::DbId;
use lorekeeper_core::validation::parse_enum;
use lorekeeper_db::models::chapter::Chapter;
use lorekeeper_db::repositories::{
    ArcRepo, ChapterRepo, CharacterRepo, FactionRepo, ForeshadowingRepo, HookRepo, LocationRepo,
    RelationshipRepo, TimelineRepo, VolumeRepo, WorldRepo,
};
use lorekeeper_db::DbPool;

use crate::error::{AppError, AppResult};

const BIBLE_FILE_STEM: &str = "story-bible";

/// A rendered export ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct ExportService<'a> {
    pool: &'a DbPool,
}

impl<'a> ExportService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Export chapters in reading order.
    ///
    /// `chapter_ids` wins over `volume_id`; with neither, every chapter is
    /// exported. An empty selection is rejected.
    pub async fn export_chapters(
        &self,
        format: &str,
        volume_id: Option<DbId>,
        chapter_ids: &[DbId],
    ) -> AppResult<ExportedFile> {
        let format = parse_enum("format", format, ExportFormat::from_str_value)?;
        if format == ExportFormat::Json {
            return Err(AppError::validation(
                "format: json is only available for the story bible",
            ));
        }

        let (chapters, stem) = if !chapter_ids.is_empty() {
            let chapters = ChapterRepo::find_many(self.pool, chapter_ids).await?;
            let mut missing: Vec<DbId> = chapter_ids
                .iter()
                .copied()
                .filter(|id| !chapters.iter().any(|c| c.id == *id))
                .collect();
            missing.sort_unstable();
            missing.dedup();
            super::check_missing("ids", "chapter", &missing)?;
            (chapters, "chapters".to_string())
        } else if let Some(volume_id) = volume_id {
            let volume = VolumeRepo::find_by_id(self.pool, volume_id)
                .await?
                .ok_or_else(|| AppError::not_found("Volume", volume_id))?;
            let chapters = ChapterRepo::list_by_volume(self.pool, volume_id).await?;
            let stem = match volume.name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => slugify(name),
                _ => format!("volume-{volume_id}"),
            };
            (chapters, stem)
        } else {
            (ChapterRepo::list_all(self.pool).await?, "chapters".to_string())
        };

        if chapters.is_empty() {
            return Err(AppError::validation("No chapters to export"));
        }

        let export: Vec<ExportChapter> = chapters.into_iter().map(to_export_chapter).collect();
        let bytes = render_chapters(format, &export)?;
        tracing::info!(format = ?format, chapters = export.len(), bytes = bytes.len(), "Chapters exported");

        Ok(ExportedFile {
            filename: format!("{stem}.{}", format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }

    /// Export the whole bible as Markdown or a JSON snapshot.
    pub async fn export_bible(&self, format: &str) -> AppResult<ExportedFile> {
        let format = parse_enum("format", format, ExportFormat::from_str_value)?;
        let snapshot = self.snapshot().await?;

        let bytes = match format {
            ExportFormat::Markdown => render_bible_markdown(&snapshot).into_bytes(),
            ExportFormat::Json => serde_json::to_vec_pretty(&snapshot)
                .map_err(|e| CoreError::Internal(format!("cannot serialize bible: {e}")))?,
            ExportFormat::Text | ExportFormat::Docx => {
                return Err(AppError::validation(
                    "format: the story bible exports as markdown or json",
                ))
            }
        };

        Ok(ExportedFile {
            filename: format!("{BIBLE_FILE_STEM}.{}", format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }

    /// Name-keyed snapshot of the whole bible. Ids are replaced by names;
    /// references to rows that no longer exist are dropped.
    pub async fn snapshot(&self) -> AppResult<BibleSnapshot> {
        let characters = CharacterRepo::list(self.pool, i64::MAX, 0).await?;
        let names: HashMap<DbId, String> =
            characters.iter().map(|c| (c.id, c.name.clone())).collect();
        let name_of = |id: DbId| names.get(&id).cloned();

        let world = WorldRepo::get(self.pool).await?.map(|w| WorldSection {
            power_system: w.power_system.map(|p| p.0),
            social_rules: w.social_rules.0,
        });

        let relationships = RelationshipRepo::list(self.pool)
            .await?
            .into_iter()
            .filter_map(|r| {
                Some(RelationshipEntry {
                    source: name_of(r.source_id)?,
                    target: name_of(r.target_id)?,
                    rel_type: RelationshipType::from_str_value(&r.rel_type).ok()?,
                    join_reason: r.join_reason,
                    independent_goal: r.independent_goal,
                    appeal: r.appeal,
                    evolution: r.evolution,
                    disagree_scenarios: r.disagree_scenarios.0,
                    leave_scenarios: r.leave_scenarios.0,
                    mc_needs: r.mc_needs,
                })
            })
            .collect();

        let locations = LocationRepo::list(self.pool, i64::MAX, 0)
            .await?
            .into_iter()
            .map(|l| LocationEntry {
                name: l.name,
                location_type: l.location_type,
                significance: l.significance,
                atmosphere: l.atmosphere,
            })
            .collect();

        let factions = FactionRepo::list(self.pool, i64::MAX, 0)
            .await?
            .into_iter()
            .map(|f| FactionEntry {
                name: f.name,
                faction_type: f.faction_type,
                status_in_story: f.status_in_story,
                leader: f.leader_id.and_then(name_of),
                stance_to_mc: f
                    .stance_to_mc
                    .as_deref()
                    .and_then(|s| FactionStance::from_str_value(s).ok()),
                goals: f.goals.0,
                resources: f.resources.0,
                internal_conflict: f.internal_conflict,
            })
            .collect();

        let timeline = TimelineRepo::list(self.pool)
            .await?
            .into_iter()
            .map(|t| TimelineEntry {
                event_date: t.event_date,
                description: t.description,
                related_characters: t.related_characters.0.into_iter().filter_map(name_of).collect(),
            })
            .collect();

        let arcs = ArcRepo::list(self.pool)
            .await?
            .into_iter()
            .map(|a| ArcEntry {
                name: a.name,
                arc_type: a.arc_type.as_deref().and_then(|s| ArcType::from_str_value(s).ok()),
                status: ArcStatus::from_str_value(&a.status).ok(),
                progress: Some(a.progress),
                main_characters: a.main_characters.0.into_iter().filter_map(name_of).collect(),
            })
            .collect();

        let foreshadowing = ForeshadowingRepo::list(self.pool)
            .await?
            .into_iter()
            .map(|f| ForeshadowingEntry {
                content: f.content,
                planted_text: f.planted_text,
                planned_payoff: f.planned_payoff,
                term: f
                    .term
                    .as_deref()
                    .and_then(|s| ForeshadowingTerm::from_str_value(s).ok()),
                status: ForeshadowingStatus::from_str_value(&f.status).ok(),
            })
            .collect();

        let hooks = HookRepo::list(self.pool)
            .await?
            .into_iter()
            .filter_map(|h| {
                Some(HookEntry {
                    hook_type: HookType::from_str_value(&h.hook_type).ok()?,
                    content: h.content,
                    style: h.style.as_deref().and_then(|s| HookStyle::from_str_value(s).ok()),
                    strength: h.strength,
                })
            })
            .collect();

        let characters = characters
            .into_iter()
            .map(|c| CharacterEntry {
                name: c.name,
                role: c.role.as_deref().and_then(|s| CharacterRole::from_str_value(s).ok()),
                appearance: c.appearance,
                voice_samples: c.voice_samples.0,
                motivation: c.motivation.map(|m| m.0),
                conflict_type: c
                    .conflict_type
                    .as_deref()
                    .and_then(|s| ConflictType::from_str_value(s).ok()),
                template: c.template,
                facets: c.facets.map(|f| f.0),
                arc: c.arc.map(|a| a.0),
            })
            .collect();

        Ok(BibleSnapshot {
            world,
            characters,
            relationships,
            locations,
            factions,
            timeline,
            arcs,
            foreshadowing,
            hooks,
        })
    }
}

fn to_export_chapter(chapter: Chapter) -> ExportChapter {
    ExportChapter {
        title: chapter.title,
        content: chapter.content,
    }
}
