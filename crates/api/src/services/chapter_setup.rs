//! Loads everything [`lorekeeper_core::chapter_setup::suggest`] needs for
//! one chapter and runs it.

use lorekeeper_core::chapter_setup::{
    suggest, Candidate, ChapterSetupInput, ChapterSetupSuggestions, PreviousChapterRoster,
};
use lorekeeper_core::story::ForeshadowingStatus;
use lorekeeper_core::types::DbId;
use lorekeeper_db::models::chapter::Chapter;
use lorekeeper_db::repositories::{
    ArcRepo, ChapterRepo, CharacterRepo, ForeshadowingRepo, LocationRepo,
};
use lorekeeper_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Body of `POST /chapters/setup-suggestions`.
///
/// Explicit fields override what is derived from `chapter_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetupRequest {
    pub chapter_id: Option<DbId>,
    pub outline: Option<String>,
    pub arc_id: Option<DbId>,
    pub previous_chapter_id: Option<DbId>,
}

pub struct ChapterSetupService<'a> {
    pool: &'a DbPool,
}

impl<'a> ChapterSetupService<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    pub async fn suggest(&self, request: &SetupRequest) -> AppResult<ChapterSetupSuggestions> {
        let chapter = match request.chapter_id {
            Some(id) => Some(self.find_chapter(id).await?),
            None => None,
        };

        let outline = match (&request.outline, &chapter) {
            (Some(outline), _) => outline.clone(),
            (None, Some(chapter)) => chapter
                .outline
                .as_ref()
                .map(|o| o.to_text())
                .unwrap_or_default(),
            (None, None) => String::new(),
        };

        let previous = match (request.previous_chapter_id, &chapter) {
            (Some(id), _) => Some(self.find_chapter(id).await?),
            (None, Some(chapter)) => ChapterRepo::find_previous(self.pool, chapter).await?,
            (None, None) => None,
        };

        let arc_roster = match request.arc_id.or(chapter.as_ref().and_then(|c| c.arc_id)) {
            Some(arc_id) => {
                ArcRepo::find_by_id(self.pool, arc_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Arc", arc_id))?
                    .main_characters
                    .0
            }
            None => Vec::new(),
        };

        let characters = CharacterRepo::list_names(self.pool)
            .await?
            .into_iter()
            .map(|n| Candidate::new(n.id, n.name))
            .collect();
        let locations = LocationRepo::list_names(self.pool)
            .await?
            .into_iter()
            .map(|n| Candidate::new(n.id, n.name))
            .collect();
        let active_foreshadowing =
            ForeshadowingRepo::list_by_status(self.pool, ForeshadowingStatus::Active.as_str())
                .await?
                .into_iter()
                .map(|f| Candidate::new(f.id, f.content))
                .collect();

        let input = ChapterSetupInput {
            outline,
            previous_chapter: previous.map(roster_of),
            arc_roster,
            characters,
            locations,
            active_foreshadowing,
        };

        let suggestions = suggest(&input);
        tracing::debug!(
            chapter_id = ?request.chapter_id,
            characters = suggestions.characters.len(),
            locations = suggestions.locations.len(),
            foreshadowing = suggestions.foreshadowing.len(),
            "Chapter setup suggestions computed"
        );
        Ok(suggestions)
    }

    async fn find_chapter(&self, id: DbId) -> AppResult<Chapter> {
        ChapterRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Chapter", id))
    }
}

fn roster_of(chapter: Chapter) -> PreviousChapterRoster {
    PreviousChapterRoster {
        characters: chapter.characters.0,
        locations: chapter.locations.0,
        foreshadowing: chapter.foreshadowing_hinted.0,
    }
}
