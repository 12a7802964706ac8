//! String-backed enums for the story-bible vocabulary.
//!
//! Each enum maps to a TEXT column. The wire and database representation is
//! the snake_case string returned by `as_str()`.

macro_rules! define_story_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $val)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Database / wire string for this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $val ),+
                }
            }

            /// Parse from the database / wire string.
            pub fn from_str_value(s: &str) -> Result<Self, String> {
                match s {
                    $( $val => Ok($name::$variant), )+
                    _ => Err(format!(
                        "Invalid value '{s}'. Must be one of: {}",
                        [$( $val ),+].join(", ")
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_story_enum! {
    /// Narrative weight of a character.
    CharacterRole {
        Main => "main",
        Supporting => "supporting",
        Antagonist => "antagonist",
        Mentioned => "mentioned",
    }
}

define_story_enum! {
    /// The central internal conflict driving a character.
    ConflictType {
        DesireVsMorality => "desire_vs_morality",
        DutyVsDesire => "duty_vs_desire",
        SurvivalVsDignity => "survival_vs_dignity",
        IdealVsReality => "ideal_vs_reality",
        Other => "other",
    }
}

define_story_enum! {
    /// Typed label on a directed character relationship.
    RelationshipType {
        Companion => "companion",
        Rival => "rival",
        Enemy => "enemy",
        Mentor => "mentor",
        Confidant => "confidant",
        Lover => "lover",
    }
}

define_story_enum! {
    /// A faction's attitude toward the main character.
    FactionStance {
        Friendly => "friendly",
        Neutral => "neutral",
        Hostile => "hostile",
    }
}

define_story_enum! {
    ArcType {
        Main => "main",
        Sub => "sub",
    }
}

define_story_enum! {
    /// Shared by arcs and volumes.
    ArcStatus {
        Planned => "planned",
        InProgress => "in_progress",
        Complete => "complete",
    }
}

define_story_enum! {
    /// Lifecycle of a planted foreshadowing thread.
    ForeshadowingStatus {
        Active => "active",
        Resolved => "resolved",
        Abandoned => "abandoned",
    }
}

define_story_enum! {
    /// How far ahead a foreshadowing thread is expected to pay off.
    ForeshadowingTerm {
        Short => "short",
        Mid => "mid",
        Long => "long",
    }
}

define_story_enum! {
    /// Where a narrative hook sits.
    HookType {
        Opening => "opening",
        Arc => "arc",
        Chapter => "chapter",
    }
}

define_story_enum! {
    /// The emotional mechanism a hook relies on.
    HookStyle {
        Suspense => "suspense",
        Anticipation => "anticipation",
        Emotion => "emotion",
        Mystery => "mystery",
    }
}

define_story_enum! {
    /// Drafting stage of a chapter.
    ChapterStatus {
        Outline => "outline",
        Draft => "draft",
        Revision => "revision",
        Done => "done",
    }
}

define_story_enum! {
    Tension {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// Volumes use the same planned / in-progress / complete lifecycle as arcs.
pub type VolumeStatus = ArcStatus;

impl ForeshadowingStatus {
    /// Only active threads may move, and only to a terminal state.
    pub fn can_transition_to(self, next: ForeshadowingStatus) -> bool {
        matches!(
            (self, next),
            (ForeshadowingStatus::Active, ForeshadowingStatus::Resolved)
                | (ForeshadowingStatus::Active, ForeshadowingStatus::Abandoned)
        )
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ForeshadowingStatus::Active)
    }
}
