//! Gold-standard document model.
//!
//! An ERE-style annotation graph: entities with mentions, non-entity fillers,
//! and events (hoppers) whose mentions carry typed arguments. Arguments point
//! at either an entity mention or a filler by id.
//!
//! ```text
//! Event E1 (conflict.attack)
//!   ├── mention EM1: attacker -> entity mention m1  ──┐
//!   └── mention EM2: target   -> entity mention m7    │ m1 ∈ Entity ent-3
//!                    time     -> filler f2            │
//!                                                     ▼
//!                                     atom (doc, Conflict.Attack, Attacker, ent-3)
//! ```
//!
//! Parsing the annotation's on-disk XML is not this crate's concern; documents
//! arrive already built (or as JSON via serde).

use crate::offset::CharSpan;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A gold annotated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldDocument {
    /// Document identifier
    pub doc_id: String,
    /// Entities, each with one or more mentions
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Non-entity argument fillers (times, crimes, sentences, ...)
    #[serde(default)]
    pub fillers: Vec<Filler>,
    /// Events; all mentions of one event denote the same event instance
    #[serde(default)]
    pub events: Vec<Event>,
}

impl GoldDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            entities: Vec::new(),
            fillers: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Add an entity.
    #[must_use]
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    /// Add a filler.
    #[must_use]
    pub fn with_filler(mut self, filler: Filler) -> Self {
        self.fillers.push(filler);
        self
    }

    /// Add an event.
    #[must_use]
    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// The entity owning the mention with the given id.
    #[must_use]
    pub fn entity_containing(&self, mention_id: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|entity| entity.mentions.iter().any(|m| m.id == mention_id))
    }

    /// The filler with the given id.
    #[must_use]
    pub fn filler(&self, filler_id: &str) -> Option<&Filler> {
        self.fillers.iter().find(|filler| filler.id == filler_id)
    }

    /// Load a document serialized as JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("cannot read gold document {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A gold entity: a coreference cluster of mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity identifier (the identity atoms are built from)
    pub id: String,
    /// Mentions of this entity
    pub mentions: Vec<EntityMention>,
}

impl Entity {
    /// Create an entity from its mentions.
    #[must_use]
    pub fn new(id: impl Into<String>, mentions: Vec<EntityMention>) -> Self {
        Self {
            id: id.into(),
            mentions,
        }
    }
}

/// One textual mention of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Mention identifier
    pub id: String,
    /// Full extent of the mention
    pub span: CharSpan,
    /// Annotated nominal head, when the annotation provides one
    #[serde(default)]
    pub head: Option<CharSpan>,
    /// Mention text
    #[serde(default)]
    pub text: String,
}

impl EntityMention {
    /// Create a mention without a head annotation.
    #[must_use]
    pub fn new(id: impl Into<String>, span: CharSpan) -> Self {
        Self {
            id: id.into(),
            span,
            head: None,
            text: String::new(),
        }
    }

    /// Set the annotated nominal head.
    #[must_use]
    pub fn with_head(mut self, head: CharSpan) -> Self {
        self.head = Some(head);
        self
    }
}

/// A non-entity argument filler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filler {
    /// Filler identifier (the identity atoms are built from)
    pub id: String,
    /// Filler extent
    pub span: CharSpan,
    /// Filler category, e.g. "time" or "crime"
    #[serde(default)]
    pub filler_type: String,
    /// Filler text
    #[serde(default)]
    pub text: String,
}

impl Filler {
    /// Create a filler.
    #[must_use]
    pub fn new(id: impl Into<String>, span: CharSpan) -> Self {
        Self {
            id: id.into(),
            span,
            filler_type: String::new(),
            text: String::new(),
        }
    }
}

/// A gold event instance (hopper).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    pub id: String,
    /// Coreferent mentions of this event
    pub mentions: Vec<EventMention>,
}

impl Event {
    /// Create an event from its mentions.
    #[must_use]
    pub fn new(id: impl Into<String>, mentions: Vec<EventMention>) -> Self {
        Self {
            id: id.into(),
            mentions,
        }
    }
}

/// One mention of an event, in raw gold vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMention {
    /// Mention identifier
    pub id: String,
    /// Raw event type, e.g. "conflict"
    pub event_type: String,
    /// Raw event subtype, e.g. "attack"
    pub subtype: String,
    /// Arguments of this mention
    #[serde(default)]
    pub arguments: Vec<EventArgument>,
}

impl EventMention {
    /// Create an event mention.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        subtype: impl Into<String>,
        arguments: Vec<EventArgument>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            subtype: subtype.into(),
            arguments,
        }
    }
}

/// An event argument in raw gold vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventArgument {
    /// Argument realised by an entity mention.
    Entity {
        /// Raw role
        role: String,
        /// Id of the entity mention filling the role
        entity_mention: String,
    },
    /// Argument realised by a filler.
    Filler {
        /// Raw role
        role: String,
        /// Id of the filler
        filler: String,
    },
}

impl EventArgument {
    /// Entity-mention argument.
    #[must_use]
    pub fn entity(role: impl Into<String>, entity_mention: impl Into<String>) -> Self {
        Self::Entity {
            role: role.into(),
            entity_mention: entity_mention.into(),
        }
    }

    /// Filler argument.
    #[must_use]
    pub fn filler(role: impl Into<String>, filler: impl Into<String>) -> Self {
        Self::Filler {
            role: role.into(),
            filler: filler.into(),
        }
    }

    /// Raw role of this argument.
    #[must_use]
    pub fn role(&self) -> &str {
        match self {
            Self::Entity { role, .. } | Self::Filler { role, .. } => role,
        }
    }
}
