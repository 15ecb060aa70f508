//! System output model: role assertions and their linking.
//!
//! A system asserts, per document, a set of [`Response`]s: "the text at this
//! base-filler span plays `role` in an event of `event_type`". It also groups
//! responses into [`ResponseSet`]s, each claiming "these responses describe the
//! same event instance". Response sets refer to responses by id.

use crate::offset::CharSpan;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One system role assertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Response {
    /// Response identifier, unique within its document
    pub id: String,
    /// Event type in scoring vocabulary, `Type.Subtype`
    pub event_type: String,
    /// Role in scoring vocabulary
    pub role: String,
    /// Span of the base filler in the raw document
    pub base_filler: CharSpan,
    /// Canonical argument string, used only for diagnostics
    #[serde(default)]
    pub canonical_argument: String,
}

impl Response {
    /// Create a response.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        role: impl Into<String>,
        base_filler: CharSpan,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            role: role.into(),
            base_filler,
            canonical_argument: String::new(),
        }
    }

    /// `type/role` key used for diagnostic counts.
    #[must_use]
    pub fn type_role_key(&self) -> String {
        format!("{}/{}", self.event_type, self.role)
    }
}

/// A group of responses the system claims are linked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseSet {
    /// Set identifier
    #[serde(default)]
    pub id: String,
    /// Ids of member responses
    pub response_ids: BTreeSet<String>,
}

impl ResponseSet {
    /// Create a response set.
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, response_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            response_ids: response_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// The system's partition of its responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseLinking {
    /// Linked groups
    #[serde(default)]
    pub response_sets: Vec<ResponseSet>,
    /// Responses the system declined to link
    #[serde(default)]
    pub incomplete_responses: BTreeSet<String>,
}

impl ResponseLinking {
    /// Create a linking from response sets.
    #[must_use]
    pub fn new(response_sets: Vec<ResponseSet>) -> Self {
        Self {
            response_sets,
            incomplete_responses: BTreeSet::new(),
        }
    }

    /// Copy keeping only responses for which `keep` holds.
    ///
    /// Sets emptied by the filter are kept.
    #[must_use]
    pub fn filtered(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            response_sets: self
                .response_sets
                .iter()
                .map(|set| ResponseSet {
                    id: set.id.clone(),
                    response_ids: set
                        .response_ids
                        .iter()
                        .filter(|id| keep(id))
                        .cloned()
                        .collect(),
                })
                .collect(),
            incomplete_responses: self
                .incomplete_responses
                .iter()
                .filter(|id| keep(id))
                .cloned()
                .collect(),
        }
    }

    /// Every response id mentioned anywhere in the linking.
    pub fn response_ids(&self) -> impl Iterator<Item = &String> {
        self.response_sets
            .iter()
            .flat_map(|set| set.response_ids.iter())
            .chain(self.incomplete_responses.iter())
    }
}

/// Everything a system produced for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSystemOutput {
    /// Document identifier
    pub doc_id: String,
    /// Role assertions
    #[serde(default)]
    pub responses: Vec<Response>,
    /// Grouping of the assertions
    #[serde(default)]
    pub linking: ResponseLinking,
}

impl DocumentSystemOutput {
    /// Create system output for a document.
    #[must_use]
    pub fn new(
        doc_id: impl Into<String>,
        responses: Vec<Response>,
        linking: ResponseLinking,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            responses,
            linking,
        }
    }

    /// Output with no responses.
    #[must_use]
    pub fn empty(doc_id: impl Into<String>) -> Self {
        Self::new(doc_id, Vec::new(), ResponseLinking::default())
    }

    /// Check that response ids are unique and the linking refers only to them.
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for response in &self.responses {
            if !ids.insert(response.id.as_str()) {
                return Err(Error::corrupt_input(format!(
                    "document {} has duplicate response id {}",
                    self.doc_id, response.id
                )));
            }
        }
        if let Some(unknown) = self
            .linking
            .response_ids()
            .find(|id| !ids.contains(id.as_str()))
        {
            return Err(Error::corrupt_input(format!(
                "linking for document {} references unknown response {}",
                self.doc_id, unknown
            )));
        }
        Ok(())
    }

    /// Copy with every response in a banned role removed, from both the
    /// responses and the linking.
    #[must_use]
    pub fn without_roles(&self, banned_roles: &BTreeSet<String>) -> Self {
        let responses: Vec<Response> = self
            .responses
            .iter()
            .filter(|r| !banned_roles.contains(&r.role))
            .cloned()
            .collect();
        let kept: HashSet<&str> = responses.iter().map(|r| r.id.as_str()).collect();
        let linking = self.linking.filtered(|id| kept.contains(id));
        Self {
            doc_id: self.doc_id.clone(),
            responses,
            linking,
        }
    }
}
