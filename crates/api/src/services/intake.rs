//! AI-assisted intake: decompose free prose into entity drafts, then commit
//! the drafts the author accepted.

use std::sync::Arc;

use futures::StreamExt;
use lorekeeper_core::error::CoreError;
use lorekeeper_core::intake::{
    annotate_existing, build_decompose_prompt, parse_decompose_response, CharacterDraft,
    CommitAction, CommitItem, CommitReport, CommitRequest, ExistingNames, FactionDraft,
    ForeshadowingDraft, LocationDraft, NameIndex, RelationshipDraft, TimelineDraft,
    KIND_CHARACTER, KIND_FACTION, KIND_FORESHADOWING, KIND_LOCATION, KIND_RELATIONSHIP,
    KIND_TIMELINE, MAX_INTAKE_TEXT_CHARS,
};
use lorekeeper_core::types::DbId;
use lorekeeper_core::validation::require_non_empty;
use lorekeeper_db::models::character::{CreateCharacter, UpdateCharacter};
use lorekeeper_db::models::faction::{CreateFaction, UpdateFaction};
use lorekeeper_db::models::foreshadowing::{CreateForeshadowing, UpdateForeshadowing};
use lorekeeper_db::models::location::{CreateLocation, UpdateLocation};
use lorekeeper_db::models::relationship::{CreateRelationship, UpdateRelationship};
use lorekeeper_db::models::timeline::{CreateTimelineEvent, UpdateTimelineEvent};
use lorekeeper_db::repositories::{CharacterRepo, FactionRepo, LocationRepo};
use lorekeeper_db::DbPool;
use lorekeeper_events::{DomainEvent, EventBus, EventType};
use lorekeeper_llm::{CompletionRequest, TextModel};
use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::story_bible::StoryBibleService;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const DECOMPOSE_TEMPERATURE: f32 = 0.2;
const EVENT_BUFFER: usize = 64;

/// One server-sent event of a decompose run. The stream always ends with
/// [`IntakeEvent::Done`].
#[derive(Debug, Clone)]
pub enum IntakeEvent {
    /// Raw text delta from the model.
    Chunk(String),
    /// Parsed drafts annotated against the existing bible, already
    /// serialized. Build with [`IntakeEvent::result`].
    Result(serde_json::Value),
    Error(String),
    Done,
}

impl IntakeEvent {
    /// Serialize a proposal into a `result` event, or an `error` event when
    /// it cannot be represented as JSON.
    pub fn result<T: Serialize>(proposal: &T) -> Self {
        match serde_json::to_value(proposal) {
            Ok(value) => IntakeEvent::Result(value),
            Err(e) => {
                tracing::error!(error = %e, "Cannot serialize intake proposal");
                IntakeEvent::Error(format!("Failed to serialize intake result: {e}"))
            }
        }
    }

    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            IntakeEvent::Chunk(_) => "chunk",
            IntakeEvent::Result(_) => "result",
            IntakeEvent::Error(_) => "error",
            IntakeEvent::Done => "done",
        }
    }

    /// SSE data payload (JSON).
    pub fn data(&self) -> serde_json::Value {
        match self {
            IntakeEvent::Chunk(text) => json!({ "text": text }),
            IntakeEvent::Result(proposal) => proposal.clone(),
            IntakeEvent::Error(message) => json!({ "message": message }),
            IntakeEvent::Done => json!({}),
        }
    }
}

pub type IntakeStream = ReceiverStream<IntakeEvent>;

pub struct IntakeService<'a> {
    pool: &'a DbPool,
    events: &'a EventBus,
    model: Option<&'a Arc<dyn TextModel>>,
}

impl<'a> IntakeService<'a> {
    pub fn new(
        pool: &'a DbPool,
        events: &'a EventBus,
        model: Option<&'a Arc<dyn TextModel>>,
    ) -> Self {
        Self {
            pool,
            events,
            model,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.pool, &state.event_bus, state.text_model.as_ref())
    }

    /// Validate the input and start streaming a decomposition.
    ///
    /// Input errors and a missing model are reported before any event is
    /// sent; everything after that arrives as an `error` event.
    pub fn decompose(&self, text: &str, hints: Option<&str>) -> AppResult<IntakeStream> {
        require_non_empty("text", text)?;
        let chars = text.chars().count();
        if chars > MAX_INTAKE_TEXT_CHARS {
            return Err(AppError::validation(format!(
                "text exceeds maximum length of {MAX_INTAKE_TEXT_CHARS} characters ({chars})"
            )));
        }
        let model = self.model.cloned().ok_or_else(|| {
            CoreError::Unavailable("No text model is configured for intake".to_string())
        })?;

        let (system, user) = build_decompose_prompt(text, hints);
        let request = CompletionRequest::new(user)
            .with_system(system)
            .with_temperature(DECOMPOSE_TEMPERATURE);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let pool = self.pool.clone();
        tracing::info!(model = model.model_name(), chars, "Starting intake decomposition");

        tokio::spawn(async move {
            run_decompose(model, pool, request, &tx).await;
            let _ = tx.send(IntakeEvent::Done).await;
        });

        Ok(ReceiverStream::new(rx))
    }

    /// Apply the author's decisions. Per-item failures are collected in the
    /// report and never abort the batch.
    pub async fn commit(&self, request: CommitRequest) -> AppResult<CommitReport> {
        let bible = StoryBibleService::new(self.pool, self.events);
        let mut report = CommitReport::default();

        let mut characters = NameIndex::from_pairs(
            CharacterRepo::list_names(self.pool)
                .await?
                .iter()
                .map(|n| (n.id, n.name.as_str())),
        );

        for item in request.characters {
            let name = item.draft.name.clone();
            if let Some(id) = commit_character(&bible, item, &mut report).await {
                characters.insert(&name, id);
            }
        }
        for item in request.locations {
            commit_location(&bible, item, &mut report).await;
        }
        for item in request.factions {
            commit_faction(&bible, item, &characters, &mut report).await;
        }
        for item in request.relationships {
            commit_relationship(&bible, item, &characters, &mut report).await;
        }
        for item in request.timeline {
            commit_timeline(&bible, item, &characters, &mut report).await;
        }
        for item in request.foreshadowing {
            commit_foreshadowing(&bible, item, &mut report).await;
        }

        tracing::info!(
            created = report.created.len(),
            merged = report.merged.len(),
            skipped = report.skipped.len(),
            errors = report.errors.len(),
            "Intake committed"
        );
        self.events.publish(DomainEvent::new(EventType::IntakeCommitted).with_payload(json!({
            "created": report.created.len(),
            "merged": report.merged.len(),
            "skipped": report.skipped.len(),
            "errors": report.errors.len(),
        })));
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Decompose
// ---------------------------------------------------------------------------

async fn run_decompose(
    model: Arc<dyn TextModel>,
    pool: DbPool,
    request: CompletionRequest,
    tx: &mpsc::Sender<IntakeEvent>,
) {
    let mut stream = match model.stream(request).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "Intake model request failed");
            let _ = tx.send(IntakeEvent::Error(e.to_string())).await;
            return;
        }
    };

    let mut answer = String::new();
    while let Some(delta) = stream.next().await {
        match delta {
            Ok(text) => {
                answer.push_str(&text);
                if tx.send(IntakeEvent::Chunk(text)).await.is_err() {
                    tracing::debug!("Intake client disconnected, stopping decomposition");
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intake stream failed");
                let _ = tx.send(IntakeEvent::Error(e.to_string())).await;
                return;
            }
        }
    }

    let event = match parse_decompose_response(&answer) {
        Ok(result) => match existing_names(&pool).await {
            Ok(existing) => {
                tracing::info!(drafts = result.total(), "Intake decomposition parsed");
                IntakeEvent::result(&annotate_existing(result, &existing))
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot load existing names for intake");
                IntakeEvent::Error("Failed to load existing entities".to_string())
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, answer_len = answer.len(), "Unparseable intake answer");
            IntakeEvent::Error(e.to_string())
        }
    };
    let _ = tx.send(event).await;
}

async fn existing_names(pool: &DbPool) -> Result<ExistingNames, sqlx::Error> {
    let index = |names: Vec<lorekeeper_db::models::EntityName>| {
        NameIndex::from_pairs(names.iter().map(|n| (n.id, n.name.as_str())))
    };
    Ok(ExistingNames {
        characters: index(CharacterRepo::list_names(pool).await?),
        locations: index(LocationRepo::list_names(pool).await?),
        factions: index(FactionRepo::list_names(pool).await?),
    })
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_empty_list(values: Vec<String>) -> Option<Vec<String>> {
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then_some(values)
}

/// Message recorded for a failed item.
fn failure_message(err: &AppError) -> String {
    err.classify().2
}

/// Shared create / merge / skip dispatch. Returns the id of the created or
/// merged entity.
async fn apply<C, M>(
    report: &mut CommitReport,
    kind: &str,
    name: &str,
    action: CommitAction,
    existing_id: Option<DbId>,
    create: C,
    merge: impl FnOnce(DbId) -> M,
) -> Option<DbId>
where
    C: std::future::Future<Output = AppResult<DbId>>,
    M: std::future::Future<Output = AppResult<DbId>>,
{
    let result = match action {
        CommitAction::Skip => {
            report.skip(kind, name);
            return None;
        }
        CommitAction::Create => create.await,
        CommitAction::Merge => match existing_id {
            Some(id) => merge(id).await,
            None => Err(AppError::validation("merge requires existing_id")),
        },
    };

    match result {
        Ok(id) => {
            report.record(action, kind, id, name);
            Some(id)
        }
        Err(e) => {
            report.fail(kind, name, failure_message(&e));
            None
        }
    }
}

async fn commit_character(
    bible: &StoryBibleService<'_>,
    item: CommitItem<CharacterDraft>,
    report: &mut CommitReport,
) -> Option<DbId> {
    let CommitItem {
        action,
        existing_id,
        draft,
    } = item;
    let name = draft.name.trim().to_string();

    let create = CreateCharacter {
        name: name.clone(),
        role: non_blank(draft.role.clone()),
        appearance: non_blank(draft.appearance.clone()),
        voice_samples: non_empty_list(draft.voice_samples.clone()),
        motivation: draft.motivation.clone(),
        conflict_type: non_blank(draft.conflict_type.clone()),
        facets: draft.facets.clone(),
        ..Default::default()
    };
    let update = UpdateCharacter {
        role: create.role.clone(),
        appearance: create.appearance.clone(),
        voice_samples: create.voice_samples.clone(),
        motivation: create.motivation.clone(),
        conflict_type: create.conflict_type.clone(),
        facets: create.facets.clone(),
        ..Default::default()
    };

    apply(
        report,
        KIND_CHARACTER,
        &name,
        action,
        existing_id,
        async { bible.create_character(&create).await.map(|c| c.id) },
        |id| async move { bible.update_character(id, &update).await.map(|c| c.id) },
    )
    .await
}

async fn commit_location(
    bible: &StoryBibleService<'_>,
    item: CommitItem<LocationDraft>,
    report: &mut CommitReport,
) {
    let CommitItem {
        action,
        existing_id,
        draft,
    } = item;
    let name = draft.name.trim().to_string();

    let create = CreateLocation {
        name: name.clone(),
        location_type: non_blank(draft.location_type),
        significance: non_blank(draft.significance),
        atmosphere: non_blank(draft.atmosphere),
        connections: None,
    };
    let update = UpdateLocation {
        location_type: create.location_type.clone(),
        significance: create.significance.clone(),
        atmosphere: create.atmosphere.clone(),
        ..Default::default()
    };

    apply(
        report,
        KIND_LOCATION,
        &name,
        action,
        existing_id,
        async { bible.create_location(&create).await.map(|l| l.id) },
        |id| async move { bible.update_location(id, &update).await.map(|l| l.id) },
    )
    .await;
}

async fn commit_faction(
    bible: &StoryBibleService<'_>,
    item: CommitItem<FactionDraft>,
    characters: &NameIndex,
    report: &mut CommitReport,
) {
    let CommitItem {
        action,
        existing_id,
        draft,
    } = item;
    let name = draft.name.trim().to_string();
    let leader_id = draft.leader_name.as_deref().and_then(|n| characters.get(n));
    if leader_id.is_none() {
        if let Some(leader) = non_blank(draft.leader_name.clone()) {
            tracing::debug!(faction = %name, leader = %leader, "Faction leader not found, left unset");
        }
    }

    let create = CreateFaction {
        name: name.clone(),
        faction_type: non_blank(draft.faction_type),
        leader_id,
        stance_to_mc: non_blank(draft.stance_to_mc),
        goals: non_empty_list(draft.goals),
        resources: non_empty_list(draft.resources),
        internal_conflict: non_blank(draft.internal_conflict),
        ..Default::default()
    };
    let update = UpdateFaction {
        faction_type: create.faction_type.clone(),
        leader_id: create.leader_id,
        stance_to_mc: create.stance_to_mc.clone(),
        goals: create.goals.clone(),
        resources: create.resources.clone(),
        internal_conflict: create.internal_conflict.clone(),
        ..Default::default()
    };

    apply(
        report,
        KIND_FACTION,
        &name,
        action,
        existing_id,
        async { bible.create_faction(&create).await.map(|f| f.id) },
        |id| async move { bible.update_faction(id, &update).await.map(|f| f.id) },
    )
    .await;
}

async fn commit_relationship(
    bible: &StoryBibleService<'_>,
    item: CommitItem<RelationshipDraft>,
    characters: &NameIndex,
    report: &mut CommitReport,
) {
    let CommitItem {
        action,
        existing_id,
        draft,
    } = item;
    let name = format!("{} -> {}", draft.source_name.trim(), draft.target_name.trim());

    let endpoints = (
        characters.get(&draft.source_name),
        characters.get(&draft.target_name),
    );
    let (source_id, target_id) = match (action, endpoints) {
        (_, (Some(source), Some(target))) => (source, target),
        (CommitAction::Create, (source, _)) => {
            let missing = if source.is_none() {
                &draft.source_name
            } else {
                &draft.target_name
            };
            report.fail(
                KIND_RELATIONSHIP,
                &name,
                format!("unknown character '{}'", missing.trim()),
            );
            return;
        }
        // Merges and skips do not need endpoints.
        _ => (0, 0),
    };

    let create = CreateRelationship {
        source_id,
        target_id,
        rel_type: draft.rel_type.clone(),
        join_reason: non_blank(draft.join_reason.clone()),
        independent_goal: non_blank(draft.independent_goal.clone()),
        evolution: non_blank(draft.evolution.clone()),
        mc_needs: non_blank(draft.mc_needs.clone()),
        ..Default::default()
    };
    let update = UpdateRelationship {
        rel_type: non_blank(Some(draft.rel_type)),
        join_reason: create.join_reason.clone(),
        independent_goal: create.independent_goal.clone(),
        evolution: create.evolution.clone(),
        mc_needs: create.mc_needs.clone(),
        ..Default::default()
    };

    apply(
        report,
        KIND_RELATIONSHIP,
        &name,
        action,
        existing_id,
        async { bible.create_relationship(&create).await.map(|r| r.id) },
        |id| async move { bible.update_relationship(id, &update).await.map(|r| r.id) },
    )
    .await;
}

async fn commit_timeline(
    bible: &StoryBibleService<'_>,
    item: CommitItem<TimelineDraft>,
    characters: &NameIndex,
    report: &mut CommitReport,
) {
    let CommitItem {
        action,
        existing_id,
        draft,
    } = item;
    let name = draft.description.trim().to_string();
    let related: Vec<DbId> = draft
        .related_characters
        .iter()
        .filter_map(|n| characters.get(n))
        .collect();

    let create = CreateTimelineEvent {
        event_date: non_blank(draft.event_date),
        description: name.clone(),
        related_characters: (!related.is_empty()).then_some(related),
        related_locations: None,
    };
    let update = UpdateTimelineEvent {
        event_date: create.event_date.clone(),
        description: Some(name.clone()),
        related_characters: create.related_characters.clone(),
        related_locations: None,
    };

    apply(
        report,
        KIND_TIMELINE,
        &name,
        action,
        existing_id,
        async { bible.create_timeline_event(&create).await.map(|t| t.id) },
        |id| async move { bible.update_timeline_event(id, &update).await.map(|t| t.id) },
    )
    .await;
}

async fn commit_foreshadowing(
    bible: &StoryBibleService<'_>,
    item: CommitItem<ForeshadowingDraft>,
    report: &mut CommitReport,
) {
    let CommitItem {
        action,
        existing_id,
        draft,
    } = item;
    let name = draft.content.trim().to_string();

    let create = CreateForeshadowing {
        content: name.clone(),
        planted_text: non_blank(draft.planted_text),
        planned_payoff: non_blank(draft.planned_payoff),
        term: non_blank(draft.term),
        planted_chapter: None,
    };
    let update = UpdateForeshadowing {
        content: Some(name.clone()),
        planted_text: create.planted_text.clone(),
        planned_payoff: create.planned_payoff.clone(),
        term: create.term.clone(),
        planted_chapter: None,
    };

    apply(
        report,
        KIND_FORESHADOWING,
        &name,
        action,
        existing_id,
        async { bible.create_foreshadowing(&create).await.map(|f| f.id) },
        |id| async move { bible.update_foreshadowing(id, &update).await.map(|f| f.id) },
    )
    .await;
}
