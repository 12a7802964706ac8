//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Services publish a [`DomainEvent`] after every successful mutation. The
//! bus is shared via `Arc<EventBus>` in the application state.

use chrono::{DateTime, Utc};
use lorekeeper_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

macro_rules! event_types {
    ( $( $variant:ident => $val:literal ),+ $(,)? ) => {
        /// Every kind of change the story bible emits.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum EventType {
            $( #[serde(rename = $val)] $variant ),+
        }

        impl EventType {
            pub const ALL: &'static [EventType] = &[$( EventType::$variant ),+];

            /// Wire name, e.g. `"CHARACTER_CREATED"`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( EventType::$variant => $val ),+
                }
            }
        }
    };
}

event_types! {
    CharacterCreated => "CHARACTER_CREATED",
    CharacterUpdated => "CHARACTER_UPDATED",
    CharacterDeleted => "CHARACTER_DELETED",
    RelationshipCreated => "RELATIONSHIP_CREATED",
    RelationshipUpdated => "RELATIONSHIP_UPDATED",
    RelationshipDeleted => "RELATIONSHIP_DELETED",
    WorldUpdated => "WORLD_UPDATED",
    LocationCreated => "LOCATION_CREATED",
    LocationUpdated => "LOCATION_UPDATED",
    LocationDeleted => "LOCATION_DELETED",
    FactionCreated => "FACTION_CREATED",
    FactionUpdated => "FACTION_UPDATED",
    FactionDeleted => "FACTION_DELETED",
    TimelineEventCreated => "TIMELINE_EVENT_CREATED",
    TimelineEventUpdated => "TIMELINE_EVENT_UPDATED",
    TimelineEventDeleted => "TIMELINE_EVENT_DELETED",
    ArcCreated => "ARC_CREATED",
    ArcUpdated => "ARC_UPDATED",
    ArcDeleted => "ARC_DELETED",
    ForeshadowingCreated => "FORESHADOWING_CREATED",
    ForeshadowingUpdated => "FORESHADOWING_UPDATED",
    ForeshadowingHintAdded => "FORESHADOWING_HINT_ADDED",
    ForeshadowingResolved => "FORESHADOWING_RESOLVED",
    ForeshadowingAbandoned => "FORESHADOWING_ABANDONED",
    ForeshadowingDeleted => "FORESHADOWING_DELETED",
    HookCreated => "HOOK_CREATED",
    HookUpdated => "HOOK_UPDATED",
    HookDeleted => "HOOK_DELETED",
    VolumeCreated => "VOLUME_CREATED",
    VolumeUpdated => "VOLUME_UPDATED",
    VolumeDeleted => "VOLUME_DELETED",
    ChapterCreated => "CHAPTER_CREATED",
    ChapterUpdated => "CHAPTER_UPDATED",
    ChapterContentSaved => "CHAPTER_CONTENT_SAVED",
    ChapterDeleted => "CHAPTER_DELETED",
    IntakeCommitted => "INTAKE_COMMITTED",
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A change to the story bible.
///
/// Constructed via [`DomainEvent::new`] and enriched with
/// [`with_entity`](DomainEvent::with_entity) and
/// [`with_payload`](DomainEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_type: EventType,

    /// Entity kind, e.g. `"character"`.
    pub entity_type: Option<String>,

    pub entity_id: Option<DbId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            entity_type: None,
            entity_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use lorekeeper_events::bus::{DomainEvent, EventBus, EventType};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(DomainEvent::new(EventType::WorldUpdated));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity. Slow receivers past
    /// the capacity observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Without subscribers the event is
    /// dropped.
    pub fn publish(&self, event: DomainEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
