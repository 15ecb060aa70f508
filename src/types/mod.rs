//! Canonical scoring values shared by the extractors and the scoring network.
//!
//! Both sides of an evaluation are projected onto the same representation
//! before anything is compared:
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`DocLevelEventArg`] | one finding: (document, `Type.Subtype`, role, entity or filler id) |
//! | [`ArgSet`] | the findings of one document |
//! | [`Linking`] | a grouping of findings into event instances |
//! | [`ResponsesAndLinking`] | both of the above for one side of one document |
//! | [`KeyCounts`] | a multiset of string keys, for diagnostics |
//!
//! Ordered collections are used throughout so iteration order, and everything
//! derived from it, is reproducible.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The canonical scoring atom.
///
/// Two atoms denote the same finding iff all four fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocLevelEventArg {
    /// Document identifier
    pub doc_id: String,
    /// Canonical `Type.Subtype`
    pub event_type: String,
    /// Canonical role
    pub role: String,
    /// Gold entity or filler identity
    pub entity_id: String,
}

impl DocLevelEventArg {
    /// Create an atom.
    #[must_use]
    pub fn new(
        doc_id: impl Into<String>,
        event_type: impl Into<String>,
        role: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            event_type: event_type.into(),
            role: role.into(),
            entity_id: entity_id.into(),
        }
    }
}

impl fmt::Display for DocLevelEventArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.doc_id, self.event_type, self.role, self.entity_id
        )
    }
}

/// All atoms of one side of one document.
pub type ArgSet = BTreeSet<DocLevelEventArg>;

/// A partition of atoms into linked groups. Identical groups collapse.
pub type Linking = BTreeSet<ArgSet>;

/// One side's atoms and linking for one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponsesAndLinking {
    /// Atoms
    pub args: ArgSet,
    /// Linked groups of atoms
    pub linking: Linking,
}

impl ResponsesAndLinking {
    /// Pair atoms with their linking.
    #[must_use]
    pub fn new(args: ArgSet, linking: Linking) -> Self {
        Self { args, linking }
    }
}

/// A multiset of string keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCounts(BTreeMap<String, usize>);

impl KeyCounts {
    /// Empty multiset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`.
    pub fn add(&mut self, key: impl Into<String>) {
        *self.0.entry(key.into()).or_insert(0) += 1;
    }

    /// Occurrences of `key`.
    #[must_use]
    pub fn count(&self, key: &str) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    /// Occurrences of all keys.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Whether nothing has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys and counts in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for KeyCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, count) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{} x{}", key, count)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(entity: &str) -> DocLevelEventArg {
        DocLevelEventArg::new("d1", "Conflict.Attack", "Attacker", entity)
    }

    #[test]
    fn test_atom_identity_is_by_value() {
        assert_eq!(arg("E1"), arg("E1"));
        assert_ne!(arg("E1"), arg("E2"));
        let set: ArgSet = [arg("E1"), arg("E1"), arg("E2")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_atom_display() {
        assert_eq!(arg("E1").to_string(), "d1/Conflict.Attack/Attacker/E1");
    }

    #[test]
    fn test_key_counts() {
        let mut counts = KeyCounts::new();
        assert!(counts.is_empty());
        counts.add("a");
        counts.add("b");
        counts.add("a");
        assert_eq!(counts.count("a"), 2);
        assert_eq!(counts.count("c"), 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.to_string(), "a x2, b x1");
    }
}
