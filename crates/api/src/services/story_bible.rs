//! Story-bible entities: characters, relationships, world, locations,
//! factions, timeline, arcs, foreshadowing and hooks.

use lorekeeper_core::bible::{ForeshadowingHint, PowerSystem, SocialRules};
use lorekeeper_core::error::CoreError;
use lorekeeper_core::search::{
    clamp_limit, clamp_offset, like_pattern, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
use lorekeeper_core::story::{
    ArcStatus, ArcType, CharacterRole, ConflictType, FactionStance, ForeshadowingStatus,
    ForeshadowingTerm, HookStyle, HookType, RelationshipType,
};
use lorekeeper_core::types::{DbId, Timestamp};
use lorekeeper_core::validation::{
    parse_enum, require_non_empty, validate_chapter_range, validate_name,
    validate_no_self_reference, validate_optional_name, validate_percentage,
};
use lorekeeper_db::models::arc::{CreateArc, StoryArc, UpdateArc};
use lorekeeper_db::models::character::{Character, CreateCharacter, UpdateCharacter};
use lorekeeper_db::models::faction::{CreateFaction, Faction, UpdateFaction};
use lorekeeper_db::models::foreshadowing::{
    AddHint, CreateForeshadowing, Foreshadowing, UpdateForeshadowing,
};
use lorekeeper_db::models::hook::{CreateHook, Hook, UpdateHook};
use lorekeeper_db::models::location::{CreateLocation, Location, UpdateLocation};
use lorekeeper_db::models::relationship::{
    CreateRelationship, Relationship, UpdateRelationship,
};
use lorekeeper_db::models::timeline::{CreateTimelineEvent, TimelineEvent, UpdateTimelineEvent};
use lorekeeper_db::models::world::{UpdateWorld, World};
use lorekeeper_db::repositories::{
    ArcRepo, ChapterRepo, CharacterRepo, FactionRepo, ForeshadowingRepo, HookRepo, LocationRepo,
    RelationshipRepo, TimelineRepo, WorldRepo,
};
use lorekeeper_db::DbPool;
use lorekeeper_events::{EventBus, EventType};
use serde::Serialize;
use serde_json::json;

use super::{check_enum, check_missing, check_reference, publish};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// World settings as served to clients. `updated_at` is `None` until the
/// world has been saved once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldSettings {
    pub power_system: Option<PowerSystem>,
    pub social_rules: SocialRules,
    pub updated_at: Option<Timestamp>,
}

impl From<World> for WorldSettings {
    fn from(world: World) -> Self {
        Self {
            power_system: world.power_system.map(|p| p.0),
            social_rules: world.social_rules.0,
            updated_at: Some(world.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: DbId,
    pub name: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub id: DbId,
    pub source: DbId,
    pub target: DbId,
    pub rel_type: String,
    pub evolution: Option<String>,
}

/// Characters as nodes and relationships as edges, for the force-directed
/// relationship view.
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub struct StoryBibleService<'a> {
    pool: &'a DbPool,
    events: &'a EventBus,
}

impl<'a> StoryBibleService<'a> {
    pub fn new(pool: &'a DbPool, events: &'a EventBus) -> Self {
        Self { pool, events }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pool, &state.event_bus)
    }

    async fn check_chapter(&self, field: &str, chapter_id: Option<DbId>) -> AppResult<()> {
        if let Some(id) = chapter_id {
            let exists = ChapterRepo::exists(self.pool, id).await?;
            check_reference(field, "chapter", id, exists)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    pub async fn create_character(&self, input: &CreateCharacter) -> AppResult<Character> {
        validate_name("name", &input.name)?;
        check_enum("role", input.role.as_deref(), CharacterRole::from_str_value)?;
        check_enum(
            "conflict_type",
            input.conflict_type.as_deref(),
            ConflictType::from_str_value,
        )?;
        self.check_chapter("first_appearance", input.first_appearance)
            .await?;

        let character = CharacterRepo::create(self.pool, input).await?;
        tracing::info!(character_id = character.id, name = %character.name, "Character created");
        publish(
            self.events,
            EventType::CharacterCreated,
            "character",
            character.id,
            json!({ "name": character.name }),
        );
        Ok(character)
    }

    pub async fn get_character(&self, id: DbId) -> AppResult<Character> {
        CharacterRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Character", id))
    }

    /// List characters by name, or search them when `q` is non-blank.
    pub async fn list_characters(
        &self,
        q: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<Character>> {
        match q.and_then(like_pattern) {
            Some(pattern) => self.search_characters(&pattern, limit).await,
            None => {
                let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
                Ok(CharacterRepo::list(self.pool, limit, clamp_offset(offset)).await?)
            }
        }
    }

    /// `pattern` is a LIKE pattern from [`like_pattern`].
    pub async fn search_characters(
        &self,
        pattern: &str,
        limit: Option<i64>,
    ) -> AppResult<Vec<Character>> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        Ok(CharacterRepo::search(self.pool, pattern, limit).await?)
    }

    pub async fn update_character(
        &self,
        id: DbId,
        input: &UpdateCharacter,
    ) -> AppResult<Character> {
        validate_optional_name("name", input.name.as_deref())?;
        check_enum("role", input.role.as_deref(), CharacterRole::from_str_value)?;
        check_enum(
            "conflict_type",
            input.conflict_type.as_deref(),
            ConflictType::from_str_value,
        )?;
        self.check_chapter("first_appearance", input.first_appearance)
            .await?;

        let character = CharacterRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Character", id))?;
        publish(
            self.events,
            EventType::CharacterUpdated,
            "character",
            id,
            json!({ "name": character.name }),
        );
        Ok(character)
    }

    /// Relationships of the character go with it; factions it leads lose
    /// their leader.
    pub async fn delete_character(&self, id: DbId) -> AppResult<()> {
        if !CharacterRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Character", id));
        }
        tracing::info!(character_id = id, "Character deleted");
        publish(
            self.events,
            EventType::CharacterDeleted,
            "character",
            id,
            json!({}),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Relationships
    // -----------------------------------------------------------------------

    pub async fn create_relationship(
        &self,
        input: &CreateRelationship,
    ) -> AppResult<Relationship> {
        validate_no_self_reference(input.source_id, input.target_id)?;
        require_non_empty("rel_type", &input.rel_type)?;
        parse_enum("rel_type", &input.rel_type, RelationshipType::from_str_value)?;

        for (field, id) in [("source_id", input.source_id), ("target_id", input.target_id)] {
            let exists = CharacterRepo::exists(self.pool, id).await?;
            check_reference(field, "character", id, exists)?;
        }

        let relationship = RelationshipRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::RelationshipCreated,
            "relationship",
            relationship.id,
            json!({
                "source_id": relationship.source_id,
                "target_id": relationship.target_id,
                "rel_type": relationship.rel_type,
            }),
        );
        Ok(relationship)
    }

    pub async fn get_relationship(&self, id: DbId) -> AppResult<Relationship> {
        RelationshipRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Relationship", id))
    }

    pub async fn list_relationships(&self) -> AppResult<Vec<Relationship>> {
        Ok(RelationshipRepo::list(self.pool).await?)
    }

    /// Relationships in which the character is either endpoint.
    pub async fn list_relationships_for_character(
        &self,
        character_id: DbId,
    ) -> AppResult<Vec<Relationship>> {
        if !CharacterRepo::exists(self.pool, character_id).await? {
            return Err(AppError::not_found("Character", character_id));
        }
        Ok(RelationshipRepo::list_for_character(self.pool, character_id).await?)
    }

    pub async fn update_relationship(
        &self,
        id: DbId,
        input: &UpdateRelationship,
    ) -> AppResult<Relationship> {
        check_enum(
            "rel_type",
            input.rel_type.as_deref(),
            RelationshipType::from_str_value,
        )?;

        let relationship = RelationshipRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Relationship", id))?;
        publish(
            self.events,
            EventType::RelationshipUpdated,
            "relationship",
            id,
            json!({ "rel_type": relationship.rel_type }),
        );
        Ok(relationship)
    }

    pub async fn delete_relationship(&self, id: DbId) -> AppResult<()> {
        if !RelationshipRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Relationship", id));
        }
        publish(
            self.events,
            EventType::RelationshipDeleted,
            "relationship",
            id,
            json!({}),
        );
        Ok(())
    }

    pub async fn graph(&self) -> AppResult<RelationshipGraph> {
        let characters = CharacterRepo::list(self.pool, i64::MAX, 0).await?;
        let relationships = RelationshipRepo::list(self.pool).await?;

        let nodes = characters
            .into_iter()
            .map(|c| GraphNode {
                id: c.id,
                name: c.name,
                role: c.role,
            })
            .collect();
        let edges = relationships
            .into_iter()
            .map(|r| GraphEdge {
                id: r.id,
                source: r.source_id,
                target: r.target_id,
                rel_type: r.rel_type,
                evolution: r.evolution,
            })
            .collect();

        Ok(RelationshipGraph { nodes, edges })
    }

    // -----------------------------------------------------------------------
    // World
    // -----------------------------------------------------------------------

    pub async fn get_world(&self) -> AppResult<WorldSettings> {
        Ok(WorldRepo::get(self.pool)
            .await?
            .map(WorldSettings::from)
            .unwrap_or_default())
    }

    pub async fn update_world(&self, input: &UpdateWorld) -> AppResult<WorldSettings> {
        let world = WorldRepo::upsert(self.pool, input).await?;
        publish(self.events, EventType::WorldUpdated, "world", world.id, json!({}));
        Ok(world.into())
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    pub async fn create_location(&self, input: &CreateLocation) -> AppResult<Location> {
        validate_name("name", &input.name)?;
        if let Some(connections) = &input.connections {
            let missing = LocationRepo::missing_ids(self.pool, connections).await?;
            check_missing("connections", "location", &missing)?;
        }

        let location = LocationRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::LocationCreated,
            "location",
            location.id,
            json!({ "name": location.name }),
        );
        Ok(location)
    }

    pub async fn get_location(&self, id: DbId) -> AppResult<Location> {
        LocationRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Location", id))
    }

    pub async fn list_locations(
        &self,
        q: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<Location>> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        match q.and_then(like_pattern) {
            Some(pattern) => Ok(LocationRepo::search(self.pool, &pattern, limit).await?),
            None => Ok(LocationRepo::list(self.pool, limit, clamp_offset(offset)).await?),
        }
    }

    pub async fn update_location(&self, id: DbId, input: &UpdateLocation) -> AppResult<Location> {
        validate_optional_name("name", input.name.as_deref())?;
        if let Some(connections) = &input.connections {
            if connections.contains(&id) {
                return Err(AppError::validation(
                    "connections: a location cannot connect to itself",
                ));
            }
            let missing = LocationRepo::missing_ids(self.pool, connections).await?;
            check_missing("connections", "location", &missing)?;
        }

        let location = LocationRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Location", id))?;
        publish(
            self.events,
            EventType::LocationUpdated,
            "location",
            id,
            json!({ "name": location.name }),
        );
        Ok(location)
    }

    pub async fn delete_location(&self, id: DbId) -> AppResult<()> {
        if !LocationRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Location", id));
        }
        publish(self.events, EventType::LocationDeleted, "location", id, json!({}));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Factions
    // -----------------------------------------------------------------------

    async fn check_leader(&self, leader_id: Option<DbId>) -> AppResult<()> {
        if let Some(id) = leader_id {
            let exists = CharacterRepo::exists(self.pool, id).await?;
            check_reference("leader_id", "character", id, exists)?;
        }
        Ok(())
    }

    pub async fn create_faction(&self, input: &CreateFaction) -> AppResult<Faction> {
        validate_name("name", &input.name)?;
        check_enum(
            "stance_to_mc",
            input.stance_to_mc.as_deref(),
            FactionStance::from_str_value,
        )?;
        self.check_leader(input.leader_id).await?;

        let faction = FactionRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::FactionCreated,
            "faction",
            faction.id,
            json!({ "name": faction.name }),
        );
        Ok(faction)
    }

    pub async fn get_faction(&self, id: DbId) -> AppResult<Faction> {
        FactionRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Faction", id))
    }

    pub async fn list_factions(
        &self,
        q: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> AppResult<Vec<Faction>> {
        let limit = clamp_limit(limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        match q.and_then(like_pattern) {
            Some(pattern) => Ok(FactionRepo::search(self.pool, &pattern, limit).await?),
            None => Ok(FactionRepo::list(self.pool, limit, clamp_offset(offset)).await?),
        }
    }

    pub async fn update_faction(&self, id: DbId, input: &UpdateFaction) -> AppResult<Faction> {
        validate_optional_name("name", input.name.as_deref())?;
        check_enum(
            "stance_to_mc",
            input.stance_to_mc.as_deref(),
            FactionStance::from_str_value,
        )?;
        self.check_leader(input.leader_id).await?;

        let faction = FactionRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Faction", id))?;
        publish(
            self.events,
            EventType::FactionUpdated,
            "faction",
            id,
            json!({ "name": faction.name }),
        );
        Ok(faction)
    }

    pub async fn delete_faction(&self, id: DbId) -> AppResult<()> {
        if !FactionRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Faction", id));
        }
        publish(self.events, EventType::FactionDeleted, "faction", id, json!({}));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Timeline
    // -----------------------------------------------------------------------

    async fn check_timeline_refs(
        &self,
        characters: Option<&[DbId]>,
        locations: Option<&[DbId]>,
    ) -> AppResult<()> {
        if let Some(ids) = characters {
            let missing = CharacterRepo::missing_ids(self.pool, ids).await?;
            check_missing("related_characters", "character", &missing)?;
        }
        if let Some(ids) = locations {
            let missing = LocationRepo::missing_ids(self.pool, ids).await?;
            check_missing("related_locations", "location", &missing)?;
        }
        Ok(())
    }

    pub async fn create_timeline_event(
        &self,
        input: &CreateTimelineEvent,
    ) -> AppResult<TimelineEvent> {
        require_non_empty("description", &input.description)?;
        self.check_timeline_refs(
            input.related_characters.as_deref(),
            input.related_locations.as_deref(),
        )
        .await?;

        let event = TimelineRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::TimelineEventCreated,
            "timeline_event",
            event.id,
            json!({ "event_date": event.event_date }),
        );
        Ok(event)
    }

    pub async fn get_timeline_event(&self, id: DbId) -> AppResult<TimelineEvent> {
        TimelineRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("TimelineEvent", id))
    }

    /// Ordered by `event_date`, then id.
    pub async fn list_timeline(&self) -> AppResult<Vec<TimelineEvent>> {
        Ok(TimelineRepo::list(self.pool).await?)
    }

    pub async fn update_timeline_event(
        &self,
        id: DbId,
        input: &UpdateTimelineEvent,
    ) -> AppResult<TimelineEvent> {
        if let Some(description) = input.description.as_deref() {
            require_non_empty("description", description)?;
        }
        self.check_timeline_refs(
            input.related_characters.as_deref(),
            input.related_locations.as_deref(),
        )
        .await?;

        let event = TimelineRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("TimelineEvent", id))?;
        publish(
            self.events,
            EventType::TimelineEventUpdated,
            "timeline_event",
            id,
            json!({ "event_date": event.event_date }),
        );
        Ok(event)
    }

    pub async fn delete_timeline_event(&self, id: DbId) -> AppResult<()> {
        if !TimelineRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("TimelineEvent", id));
        }
        publish(
            self.events,
            EventType::TimelineEventDeleted,
            "timeline_event",
            id,
            json!({}),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Arcs
    // -----------------------------------------------------------------------

    async fn check_arc_fields(
        &self,
        arc_type: Option<&str>,
        status: Option<&str>,
        progress: Option<i64>,
        main_characters: Option<&[DbId]>,
    ) -> AppResult<()> {
        check_enum("arc_type", arc_type, ArcType::from_str_value)?;
        check_enum("status", status, ArcStatus::from_str_value)?;
        if let Some(progress) = progress {
            validate_percentage("progress", progress)?;
        }
        if let Some(ids) = main_characters {
            let missing = CharacterRepo::missing_ids(self.pool, ids).await?;
            check_missing("main_characters", "character", &missing)?;
        }
        Ok(())
    }

    pub async fn create_arc(&self, input: &CreateArc) -> AppResult<StoryArc> {
        validate_name("name", &input.name)?;
        validate_chapter_range(input.chapter_start, input.chapter_end)?;
        self.check_arc_fields(
            input.arc_type.as_deref(),
            input.status.as_deref(),
            input.progress,
            input.main_characters.as_deref(),
        )
        .await?;

        let arc = ArcRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::ArcCreated,
            "arc",
            arc.id,
            json!({ "name": arc.name }),
        );
        Ok(arc)
    }

    pub async fn get_arc(&self, id: DbId) -> AppResult<StoryArc> {
        ArcRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Arc", id))
    }

    pub async fn list_arcs(&self) -> AppResult<Vec<StoryArc>> {
        Ok(ArcRepo::list(self.pool).await?)
    }

    /// The chapter range is checked against the stored bound when only one
    /// side is updated.
    pub async fn update_arc(&self, id: DbId, input: &UpdateArc) -> AppResult<StoryArc> {
        validate_optional_name("name", input.name.as_deref())?;
        let existing = self.get_arc(id).await?;
        validate_chapter_range(
            input.chapter_start.or(existing.chapter_start),
            input.chapter_end.or(existing.chapter_end),
        )?;
        self.check_arc_fields(
            input.arc_type.as_deref(),
            input.status.as_deref(),
            input.progress,
            input.main_characters.as_deref(),
        )
        .await?;

        let arc = ArcRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Arc", id))?;
        publish(
            self.events,
            EventType::ArcUpdated,
            "arc",
            id,
            json!({ "status": arc.status, "progress": arc.progress }),
        );
        Ok(arc)
    }

    pub async fn delete_arc(&self, id: DbId) -> AppResult<()> {
        if !ArcRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Arc", id));
        }
        publish(self.events, EventType::ArcDeleted, "arc", id, json!({}));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Foreshadowing
    // -----------------------------------------------------------------------

    pub async fn create_foreshadowing(
        &self,
        input: &CreateForeshadowing,
    ) -> AppResult<Foreshadowing> {
        require_non_empty("content", &input.content)?;
        check_enum("term", input.term.as_deref(), ForeshadowingTerm::from_str_value)?;
        self.check_chapter("planted_chapter", input.planted_chapter)
            .await?;

        let thread = ForeshadowingRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::ForeshadowingCreated,
            "foreshadowing",
            thread.id,
            json!({ "term": thread.term }),
        );
        Ok(thread)
    }

    pub async fn get_foreshadowing(&self, id: DbId) -> AppResult<Foreshadowing> {
        ForeshadowingRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Foreshadowing", id))
    }

    pub async fn list_foreshadowing(&self, status: Option<&str>) -> AppResult<Vec<Foreshadowing>> {
        match status.map(str::trim).filter(|s| !s.is_empty()) {
            Some(status) => {
                let status = parse_enum("status", status, ForeshadowingStatus::from_str_value)?;
                Ok(ForeshadowingRepo::list_by_status(self.pool, status.as_str()).await?)
            }
            None => Ok(ForeshadowingRepo::list(self.pool).await?),
        }
    }

    pub async fn update_foreshadowing(
        &self,
        id: DbId,
        input: &UpdateForeshadowing,
    ) -> AppResult<Foreshadowing> {
        if let Some(content) = input.content.as_deref() {
            require_non_empty("content", content)?;
        }
        check_enum("term", input.term.as_deref(), ForeshadowingTerm::from_str_value)?;
        self.check_chapter("planted_chapter", input.planted_chapter)
            .await?;

        let thread = ForeshadowingRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Foreshadowing", id))?;
        publish(
            self.events,
            EventType::ForeshadowingUpdated,
            "foreshadowing",
            id,
            json!({}),
        );
        Ok(thread)
    }

    pub async fn delete_foreshadowing(&self, id: DbId) -> AppResult<()> {
        if !ForeshadowingRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Foreshadowing", id));
        }
        publish(
            self.events,
            EventType::ForeshadowingDeleted,
            "foreshadowing",
            id,
            json!({}),
        );
        Ok(())
    }

    /// Record a reinforcement in a later chapter. Only active threads take
    /// hints.
    pub async fn add_hint(&self, id: DbId, input: &AddHint) -> AppResult<Foreshadowing> {
        require_non_empty("text", &input.text)?;
        let thread = self.get_foreshadowing(id).await?;
        let status = stored_status(&thread)?;
        if status != ForeshadowingStatus::Active {
            return Err(AppError::conflict(format!(
                "Foreshadowing {id} is {status}; hints can only be added to active threads"
            )));
        }
        self.check_chapter("chapter", Some(input.chapter)).await?;

        let hint = ForeshadowingHint {
            chapter: input.chapter,
            text: input.text.trim().to_string(),
        };
        let thread = match ForeshadowingRepo::add_hint(self.pool, id, &hint).await? {
            Some(thread) => thread,
            None => return Err(self.closed_thread(id).await),
        };
        publish(
            self.events,
            EventType::ForeshadowingHintAdded,
            "foreshadowing",
            id,
            json!({ "chapter": hint.chapter }),
        );
        Ok(thread)
    }

    pub async fn resolve_foreshadowing(&self, id: DbId, chapter: DbId) -> AppResult<Foreshadowing> {
        self.transition(id, ForeshadowingStatus::Resolved, Some(chapter))
            .await
    }

    pub async fn abandon_foreshadowing(&self, id: DbId) -> AppResult<Foreshadowing> {
        self.transition(id, ForeshadowingStatus::Abandoned, None)
            .await
    }

    async fn transition(
        &self,
        id: DbId,
        next: ForeshadowingStatus,
        resolved_chapter: Option<DbId>,
    ) -> AppResult<Foreshadowing> {
        let thread = self.get_foreshadowing(id).await?;
        let current = stored_status(&thread)?;
        if current.is_terminal() {
            return Err(already_closed(id, current));
        }
        if !current.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Foreshadowing {id} cannot move from {current} to {next}"
            )));
        }
        self.check_chapter("chapter", resolved_chapter).await?;

        let thread =
            match ForeshadowingRepo::set_status(self.pool, id, next.as_str(), resolved_chapter)
                .await?
            {
                Some(thread) => thread,
                None => return Err(self.closed_thread(id).await),
            };

        let event_type = match next {
            ForeshadowingStatus::Resolved => EventType::ForeshadowingResolved,
            ForeshadowingStatus::Abandoned => EventType::ForeshadowingAbandoned,
            ForeshadowingStatus::Active => EventType::ForeshadowingUpdated,
        };
        tracing::info!(foreshadowing_id = id, from = %current, to = %next, "Foreshadowing status changed");
        publish(
            self.events,
            event_type,
            "foreshadowing",
            id,
            json!({ "from": current, "to": next, "resolved_chapter": resolved_chapter }),
        );
        Ok(thread)
    }

    /// Explain a guarded foreshadowing update that matched no row: the thread
    /// was either deleted or closed by a concurrent request.
    async fn closed_thread(&self, id: DbId) -> AppError {
        let thread = match self.get_foreshadowing(id).await {
            Ok(thread) => thread,
            Err(e) => return e,
        };
        match stored_status(&thread) {
            Ok(status) => already_closed(id, status),
            Err(e) => e.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Hooks
    // -----------------------------------------------------------------------

    pub async fn create_hook(&self, input: &CreateHook) -> AppResult<Hook> {
        require_non_empty("hook_type", &input.hook_type)?;
        parse_enum("hook_type", &input.hook_type, HookType::from_str_value)?;
        require_non_empty("content", &input.content)?;
        check_enum("style", input.style.as_deref(), HookStyle::from_str_value)?;
        if let Some(strength) = input.strength {
            validate_percentage("strength", strength)?;
        }
        self.check_chapter("chapter_id", input.chapter_id).await?;

        let hook = HookRepo::create(self.pool, input).await?;
        publish(
            self.events,
            EventType::HookCreated,
            "hook",
            hook.id,
            json!({ "hook_type": hook.hook_type, "chapter_id": hook.chapter_id }),
        );
        Ok(hook)
    }

    pub async fn get_hook(&self, id: DbId) -> AppResult<Hook> {
        HookRepo::find_by_id(self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Hook", id))
    }

    pub async fn list_hooks(&self, chapter_id: Option<DbId>) -> AppResult<Vec<Hook>> {
        match chapter_id {
            Some(chapter_id) => Ok(HookRepo::list_by_chapter(self.pool, chapter_id).await?),
            None => Ok(HookRepo::list(self.pool).await?),
        }
    }

    pub async fn update_hook(&self, id: DbId, input: &UpdateHook) -> AppResult<Hook> {
        check_enum("hook_type", input.hook_type.as_deref(), HookType::from_str_value)?;
        if let Some(content) = input.content.as_deref() {
            require_non_empty("content", content)?;
        }
        check_enum("style", input.style.as_deref(), HookStyle::from_str_value)?;
        if let Some(strength) = input.strength {
            validate_percentage("strength", strength)?;
        }
        self.check_chapter("chapter_id", input.chapter_id).await?;

        let hook = HookRepo::update(self.pool, id, input)
            .await?
            .ok_or_else(|| AppError::not_found("Hook", id))?;
        publish(self.events, EventType::HookUpdated, "hook", id, json!({}));
        Ok(hook)
    }

    pub async fn delete_hook(&self, id: DbId) -> AppResult<()> {
        if !HookRepo::delete(self.pool, id).await? {
            return Err(AppError::not_found("Hook", id));
        }
        publish(self.events, EventType::HookDeleted, "hook", id, json!({}));
        Ok(())
    }
}

fn already_closed(id: DbId, status: ForeshadowingStatus) -> AppError {
    AppError::conflict(format!(
        "Foreshadowing {id} is already {status}; only active threads can change"
    ))
}

fn stored_status(thread: &Foreshadowing) -> Result<ForeshadowingStatus, CoreError> {
    ForeshadowingStatus::from_str_value(&thread.status).map_err(|e| {
        CoreError::Internal(format!(
            "foreshadowing {} has an unreadable status: {e}",
            thread.id
        ))
    })
}
