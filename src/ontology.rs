//! Event ontology mapping from the gold annotation schema to the scoring schema.
//!
//! # The Vocabulary Mismatch
//!
//! Gold annotation and system output name the same event types and roles in
//! different vocabularies:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Gold (ERE)                     │ Scoring (KBP 2015)          │
//! ├──────────────────────────────────────────────────────────────┤
//! │ conflict / attack / attacker   │ Conflict.Attack / Attacker  │
//! │ movement / transportperson     │ Movement.Transport-Person   │
//! │ justice / arrestjail / person  │ Justice.Arrest-Jail / Person│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items missing from the table are "unmapped", not errors: the caller skips
//! the affected gold argument and counts it.
//!
//! # Usage
//!
//! ```rust
//! use eal_scorer::ontology::{EventOntologyMapper, SimpleEventOntologyMapper};
//!
//! let mapper = SimpleEventOntologyMapper::ere_to_kbp_2015();
//! assert_eq!(mapper.event_subtype("transportperson"), Some("Transport-Person"));
//! assert_eq!(
//!     mapper.canonical_event_type("conflict", "attack").as_deref(),
//!     Some("Conflict.Attack")
//! );
//! assert_eq!(mapper.event_role("not-a-role"), None);
//! ```

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Maps raw gold vocabulary to canonical scoring vocabulary.
///
/// Every lookup returns `None` for vocabulary outside the mapping table.
pub trait EventOntologyMapper {
    /// Canonical event type for a raw type.
    fn event_type(&self, raw_type: &str) -> Option<&str>;

    /// Canonical event subtype for a raw subtype.
    fn event_subtype(&self, raw_subtype: &str) -> Option<&str>;

    /// Canonical role for a raw role.
    fn event_role(&self, raw_role: &str) -> Option<&str>;

    /// Canonical `Type.Subtype` string, if both halves map.
    fn canonical_event_type(&self, raw_type: &str, raw_subtype: &str) -> Option<String> {
        let event_type = self.event_type(raw_type)?;
        let subtype = self.event_subtype(raw_subtype)?;
        Some(format!("{}.{}", event_type, subtype))
    }
}

/// Table-driven ontology mapper.
///
/// Can be built in code, loaded from a TOML file with `[types]`, `[subtypes]`
/// and `[roles]` tables, or taken from the built-in ERE to KBP 2015 table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEventOntologyMapper {
    #[serde(default)]
    types: HashMap<String, String>,
    #[serde(default)]
    subtypes: HashMap<String, String>,
    #[serde(default)]
    roles: HashMap<String, String>,
}

impl SimpleEventOntologyMapper {
    /// Create a mapper from explicit tables.
    #[must_use]
    pub fn from_tables(
        types: HashMap<String, String>,
        subtypes: HashMap<String, String>,
        roles: HashMap<String, String>,
    ) -> Self {
        Self {
            types,
            subtypes,
            roles,
        }
    }

    /// Load a mapper from a TOML table file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "cannot read ontology mapping {}: {}",
                path.display(),
                e
            ))
        })?;
        let mapper: Self = toml::from_str(&content)?;
        if mapper.types.is_empty() || mapper.subtypes.is_empty() || mapper.roles.is_empty() {
            return Err(Error::config(format!(
                "ontology mapping {} must define [types], [subtypes] and [roles]",
                path.display()
            )));
        }
        Ok(mapper)
    }

    /// The fixed ERE to KBP 2015 event argument mapping.
    ///
    /// The table is built once and cloned for each caller.
    #[must_use]
    pub fn ere_to_kbp_2015() -> Self {
        ERE_TO_KBP_2015.clone()
    }

    fn build_ere_to_kbp_2015() -> Self {
        let mut mapper = Self::default();

        for (raw, canonical) in [
            ("business", "Business"),
            ("conflict", "Conflict"),
            ("contact", "Contact"),
            ("justice", "Justice"),
            ("life", "Life"),
            ("manufacture", "Manufacture"),
            ("movement", "Movement"),
            ("personnel", "Personnel"),
            ("transaction", "Transaction"),
        ] {
            mapper.add_type(raw, canonical);
        }

        for (raw, canonical) in [
            // Business
            ("declarebankruptcy", "Declare-Bankruptcy"),
            ("endorg", "End-Org"),
            ("mergeorg", "Merge-Org"),
            ("startorg", "Start-Org"),
            // Conflict
            ("attack", "Attack"),
            ("demonstrate", "Demonstrate"),
            // Contact
            ("broadcast", "Broadcast"),
            ("contact", "Contact"),
            ("correspondence", "Correspondence"),
            ("meet", "Meet"),
            // Justice
            ("acquit", "Acquit"),
            ("appeal", "Appeal"),
            ("arrestjail", "Arrest-Jail"),
            ("chargeindict", "Charge-Indict"),
            ("convict", "Convict"),
            ("execute", "Execute"),
            ("extradite", "Extradite"),
            ("fine", "Fine"),
            ("pardon", "Pardon"),
            ("releaseparole", "Release-Parole"),
            ("sentence", "Sentence"),
            ("sue", "Sue"),
            ("trialhearing", "Trial-Hearing"),
            // Life
            ("beborn", "Be-Born"),
            ("die", "Die"),
            ("divorce", "Divorce"),
            ("injure", "Injure"),
            ("marry", "Marry"),
            // Manufacture
            ("artifact", "Artifact"),
            // Movement
            ("transportartifact", "Transport-Artifact"),
            ("transportperson", "Transport-Person"),
            // Personnel
            ("elect", "Elect"),
            ("endposition", "End-Position"),
            ("nominate", "Nominate"),
            ("startposition", "Start-Position"),
            // Transaction
            ("transaction", "Transaction"),
            ("transfermoney", "Transfer-Money"),
            ("transferownership", "Transfer-Ownership"),
        ] {
            mapper.add_subtype(raw, canonical);
        }

        for (raw, canonical) in [
            ("adjudicator", "Adjudicator"),
            ("agent", "Agent"),
            ("artifact", "Artifact"),
            ("attacker", "Attacker"),
            ("audience", "Audience"),
            ("beneficiary", "Beneficiary"),
            ("crime", "Crime"),
            ("defendant", "Defendant"),
            ("destination", "Destination"),
            ("entity", "Entity"),
            ("fine", "Fine"),
            ("giver", "Giver"),
            ("instrument", "Instrument"),
            ("money", "Money"),
            ("org", "Org"),
            ("origin", "Origin"),
            ("person", "Person"),
            ("place", "Place"),
            ("plaintiff", "Plaintiff"),
            ("position", "Position"),
            ("prosecutor", "Prosecutor"),
            ("recipient", "Recipient"),
            ("sentence", "Sentence"),
            ("target", "Target"),
            ("thing", "Thing"),
            ("time", "Time"),
            ("victim", "Victim"),
        ] {
            mapper.add_role(raw, canonical);
        }

        mapper
    }

    fn add_type(&mut self, raw: &str, canonical: &str) {
        self.types.insert(raw.to_string(), canonical.to_string());
    }

    fn add_subtype(&mut self, raw: &str, canonical: &str) {
        self.subtypes.insert(raw.to_string(), canonical.to_string());
    }

    fn add_role(&mut self, raw: &str, canonical: &str) {
        self.roles.insert(raw.to_string(), canonical.to_string());
    }
}

static ERE_TO_KBP_2015: Lazy<SimpleEventOntologyMapper> =
    Lazy::new(SimpleEventOntologyMapper::build_ere_to_kbp_2015);

impl<M: EventOntologyMapper + ?Sized> EventOntologyMapper for Box<M> {
    fn event_type(&self, raw_type: &str) -> Option<&str> {
        (**self).event_type(raw_type)
    }

    fn event_subtype(&self, raw_subtype: &str) -> Option<&str> {
        (**self).event_subtype(raw_subtype)
    }

    fn event_role(&self, raw_role: &str) -> Option<&str> {
        (**self).event_role(raw_role)
    }
}

impl EventOntologyMapper for SimpleEventOntologyMapper {
    fn event_type(&self, raw_type: &str) -> Option<&str> {
        self.types.get(raw_type).map(String::as_str)
    }

    fn event_subtype(&self, raw_subtype: &str) -> Option<&str> {
        self.subtypes.get(raw_subtype).map(String::as_str)
    }

    fn event_role(&self, raw_role: &str) -> Option<&str> {
        self.roles.get(raw_role).map(String::as_str)
    }
}
