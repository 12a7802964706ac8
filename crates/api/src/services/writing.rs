//! Volumes and chapters.

use lorekeeper_core::story::{ChapterStatus, Tension, VolumeStatus};
use lorekeeper_core::text::count_words;
use lorekeeper_core::types::DbId;
use lorekeeper_core::validation::{validate_chapter_range, validate_optional_name};
use lorekeeper_db::models::chapter::{Chapter, ChapterSummary, CreateChapter, UpdateChapter};
use lorekeeper_db::models::volume::{CreateVolume, UpdateVolume, Volume};
use lorekeeper_db::repositories::{
    ArcRepo, ChapterRepo, CharacterRepo, ForeshadowingRepo, LocationRepo, VolumeRepo,
};
use lorekeeper_db::DbPool;
use lorekeeper_events::{EventBus, EventType};
use serde_json::json;

use super::{check_enum, check_missing, check_reference, publish};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Ids a chapter refers to, checked together on create and update.
struct ChapterRefs<'r> {
    volume_id: Option<DbId>,
    arc_id: Option<DbId>,
    characters: Option<&'r [DbId]>,
    locations: Option<&'r [DbId]>,
    foreshadowing_hinted: Option<&'r [DbId]>,
}

pub struct WritingService<'a> {
    pool: &'a DbPool,
    events: &'a EventBus,
}

impl<'a> WritingService<'a> {
    pub fn new(pool: &'a DbPool, events: &'a EventBus) -> Self {
        Self { pool, events }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pool, &state.event_bus)
    }

    // -----------------------------------------------------------------------
    // Volumes
    // -----------------------------------------------------------------------

    pub async fn create_volume(&self, input: &CreateVolume) -> AppResult<Volume> {
        validate_optional_name("name", input.name.as_deref())?;
        check_enum("status", input.status.as_deref(), VolumeStatus::from_str_value)?;
        validate_chapter_range(input.chapter_start, input.chapter_end)?;

        let volume = VolumeRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::VolumeCreated,
            "volume",
            volume.id,
            json!({ "name": volume.name }),
        );
        Ok(volume)
    }

    pub async fn get_volume(&self, id: DbId) -> AppResult<Volume> {
        VolumeRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Volume", id))
    }

    pub async fn list_volumes(&self) -> AppResult<Vec<Volume>> {
        Ok(VolumeRepo::list(self.pool).await?)
    }

    pub async fn update_volume(&self, id: DbId, input: &UpdateVolume) -> AppResult<Volume> {
        validate_optional_name("name", input.name.as_deref())?;
        check_enum("status", input.status.as_deref(), VolumeStatus::from_str_value)?;
        let existing = self.get_volume(id).await?;
        validate_chapter_range(
            input.chapter_start.or(existing.chapter_start),
            input.chapter_end.or(existing.chapter_end),
        )?;

        let volume = VolumeRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Volume", id))?;
        publish(
            self.events,
            EventType::VolumeUpdated,
            "volume",
            id,
            json!({ "status": volume.status }),
        );
        Ok(volume)
    }

    /// Chapters of the volume stay, detached from it.
    pub async fn delete_volume(&self, id: DbId) -> AppResult<()> {
        if !VolumeRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Volume", id));
        }
        publish(self.events, EventType::VolumeDeleted, "volume", id, json!({}));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Chapters
    // -----------------------------------------------------------------------

    async fn check_chapter_refs(&self, refs: ChapterRefs<'_>) -> AppResult<()> {
        if let Some(id) = refs.volume_id {
            let exists = VolumeRepo::exists(self.pool, id).await?;
            check_reference("volume_id", "volume", id, exists)?;
        }
        if let Some(id) = refs.arc_id {
            let exists = ArcRepo::exists(self.pool, id).await?;
            check_reference("arc_id", "arc", id, exists)?;
        }
        if let Some(ids) = refs.characters {
            let missing = CharacterRepo::missing_ids(self.pool, ids).await?;
            check_missing("characters", "character", &missing)?;
        }
        if let Some(ids) = refs.locations {
            let missing = LocationRepo::missing_ids(self.pool, ids).await?;
            check_missing("locations", "location", &missing)?;
        }
        if let Some(ids) = refs.foreshadowing_hinted {
            let missing = ForeshadowingRepo::missing_ids(self.pool, ids).await?;
            check_missing("foreshadowing_hinted", "foreshadowing", &missing)?;
        }
        Ok(())
    }

    pub async fn create_chapter(&self, input: &CreateChapter) -> AppResult<Chapter> {
        validate_optional_name("title", input.title.as_deref())?;
        check_enum("status", input.status.as_deref(), ChapterStatus::from_str_value)?;
        check_enum("tension", input.tension.as_deref(), Tension::from_str_value)?;
        self.check_chapter_refs(ChapterRefs {
            volume_id: input.volume_id,
            arc_id: input.arc_id,
            characters: input.characters.as_deref(),
            locations: input.locations.as_deref(),
            foreshadowing_hinted: input.foreshadowing_hinted.as_deref(),
        })
        .await?;

        let word_count = input.content.as_deref().map(count_words).unwrap_or(0);
        let chapter = ChapterRepo::create(self.pool, input, word_count).await?;
        tracing::info!(chapter_id = chapter.id, word_count, "Chapter created");
        publish(
            self.events,
            EventType::ChapterCreated,
            "chapter",
            chapter.id,
            json!({ "title": chapter.title, "volume_id": chapter.volume_id }),
        );
        Ok(chapter)
    }

    pub async fn get_chapter(&self, id: DbId) -> AppResult<Chapter> {
        ChapterRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Chapter", id))
    }

    /// Summaries without content, ordered by `sort_order`, then id.
    pub async fn list_chapters(&self, volume_id: Option<DbId>) -> AppResult<Vec<ChapterSummary>> {
        Ok(ChapterRepo::list_summaries(self.pool, volume_id).await?)
    }

    /// Update metadata. Content goes through [`save_content`](Self::save_content).
    pub async fn update_chapter(&self, id: DbId, input: &UpdateChapter) -> AppResult<Chapter> {
        validate_optional_name("title", input.title.as_deref())?;
        check_enum("status", input.status.as_deref(), ChapterStatus::from_str_value)?;
        check_enum("tension", input.tension.as_deref(), Tension::from_str_value)?;
        self.check_chapter_refs(ChapterRefs {
            volume_id: input.volume_id,
            arc_id: input.arc_id,
            characters: input.characters.as_deref(),
            locations: input.locations.as_deref(),
            foreshadowing_hinted: input.foreshadowing_hinted.as_deref(),
        })
        .await?;

        let chapter = ChapterRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Chapter", id))?;
        publish(
            self.events,
            EventType::ChapterUpdated,
            "chapter",
            id,
            json!({ "status": chapter.status }),
        );
        Ok(chapter)
    }

    /// Replace the chapter body and recompute its word count.
    pub async fn save_content(&self, id: DbId, content: &str) -> AppResult<Chapter> {
        let word_count = count_words(content);
        let chapter = ChapterRepo::save_content(self.pool, id, content, word_count)
            .await?
            .ok_or_else(|| AppError::not_found("Chapter", id))?;
        tracing::debug!(chapter_id = id, word_count, "Chapter content saved");
        publish(
            self.events,
            EventType::ChapterContentSaved,
            "chapter",
            id,
            json!({ "word_count": word_count }),
        );
        Ok(chapter)
    }

    pub async fn delete_chapter(&self, id: DbId) -> AppResult<()> {
        if !ChapterRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Chapter", id));
        }
        publish(self.events, EventType::ChapterDeleted, "chapter", id, json!({}));
        Ok(())
    }
}
