//! Alignment of system base fillers to gold entities and fillers.
//!
//! System responses address their arguments by character offsets; gold
//! annotation addresses them by entity or filler identity. [`EreAligner`]
//! bridges the two for one document:
//!
//! ```text
//! base filler [24-32)
//!   │
//!   ├─ entity mention with span or nominal head == [24-32)?   exact
//!   ├─ entity mention with the same syntactic head token?     relaxed
//!   ├─ filler with span == [24-32)?                           exact
//!   └─ filler with the same syntactic head token?             relaxed
//! ```
//!
//! The first stage producing any candidate decides. Several candidates in
//! one stage are resolved by taking the first in document order, with a
//! warning. A filler that aligns nowhere is the caller's to count and drop.

use crate::ere::{Entity, Filler, GoldDocument};
use crate::offset::CharSpan;
use crate::parse::{HeadFinder, HeadLookup};

/// Alignment behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentOptions {
    /// Fall back to head-token matching when exact offsets fail.
    pub relax_using_parse: bool,
    /// Under relaxation, only take heads of constituents with exactly the
    /// given offsets.
    pub require_exact_offsets: bool,
}

impl AlignmentOptions {
    /// Exact offsets only.
    #[must_use]
    pub fn exact() -> Self {
        Self::default()
    }

    /// Head-token fallback enabled.
    #[must_use]
    pub fn relaxed(require_exact_offsets: bool) -> Self {
        Self {
            relax_using_parse: true,
            require_exact_offsets,
        }
    }

    fn head_lookup(&self) -> HeadLookup {
        if self.require_exact_offsets {
            HeadLookup::Exact
        } else {
            HeadLookup::Covering
        }
    }
}

/// What a base filler resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignedTo<'a> {
    /// A gold entity.
    Entity(&'a Entity),
    /// A gold filler.
    Filler(&'a Filler),
}

impl AlignedTo<'_> {
    /// Identity used in canonical atoms.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Entity(entity) => &entity.id,
            Self::Filler(filler) => &filler.id,
        }
    }
}

/// Resolves base-filler spans against one gold document.
pub struct EreAligner<'a> {
    doc: &'a GoldDocument,
    parse: Option<&'a dyn HeadFinder>,
    options: AlignmentOptions,
}

impl<'a> EreAligner<'a> {
    /// Aligner for `doc`. `parse` is consulted only under relaxation.
    pub fn new(
        doc: &'a GoldDocument,
        parse: Option<&'a dyn HeadFinder>,
        options: AlignmentOptions,
    ) -> Self {
        if options.relax_using_parse && parse.is_none() {
            log::warn!(
                "Relaxed alignment requested but no parse is available for {}; \
                 using exact offsets only",
                doc.doc_id
            );
        }
        Self {
            doc,
            parse,
            options,
        }
    }

    fn relaxation(&self) -> Option<&'a dyn HeadFinder> {
        if self.options.relax_using_parse {
            self.parse
        } else {
            None
        }
    }

    /// Entities matching `base_filler`, in document order.
    #[must_use]
    pub fn entities_for_span(&self, base_filler: CharSpan) -> Vec<&'a Entity> {
        let exact: Vec<&'a Entity> = self
            .doc
            .entities
            .iter()
            .filter(|entity| {
                entity
                    .mentions
                    .iter()
                    .any(|m| m.span == base_filler || m.head == Some(base_filler))
            })
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        let Some(parse) = self.relaxation() else {
            return exact;
        };
        let lookup = self.options.head_lookup();
        let Some(head) = parse.head_token(base_filler, lookup) else {
            return exact;
        };
        self.doc
            .entities
            .iter()
            .filter(|entity| {
                entity
                    .mentions
                    .iter()
                    .any(|m| parse.head_token(m.span, lookup) == Some(head))
            })
            .collect()
    }

    /// Fillers matching `base_filler`, in document order.
    #[must_use]
    pub fn fillers_for_span(&self, base_filler: CharSpan) -> Vec<&'a Filler> {
        let exact: Vec<&'a Filler> = self
            .doc
            .fillers
            .iter()
            .filter(|filler| filler.span == base_filler)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        let Some(parse) = self.relaxation() else {
            return exact;
        };
        let lookup = self.options.head_lookup();
        let Some(head) = parse.head_token(base_filler, lookup) else {
            return exact;
        };
        self.doc
            .fillers
            .iter()
            .filter(|filler| parse.head_token(filler.span, lookup) == Some(head))
            .collect()
    }

    /// Resolve `base_filler` to one entity or filler.
    ///
    /// Returns `None` when nothing matches.
    #[must_use]
    pub fn align(&self, base_filler: CharSpan) -> Option<AlignedTo<'a>> {
        let entities = self.entities_for_span(base_filler);
        if let Some(first) = entities.first() {
            if entities.len() > 1 {
                log::warn!(
                    "Found {} candidate entities for base filler {} in {}, using the first one",
                    entities.len(),
                    base_filler,
                    self.doc.doc_id
                );
            }
            return Some(AlignedTo::Entity(first));
        }
        let fillers = self.fillers_for_span(base_filler);
        if let Some(first) = fillers.first() {
            if fillers.len() > 1 {
                log::warn!(
                    "Found {} matching fillers for base filler {} in {}, using the first one",
                    fillers.len(),
                    base_filler,
                    self.doc.doc_id
                );
            }
            return Some(AlignedTo::Filler(first));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ere::EntityMention;
    use crate::parse::Token;
    use std::collections::HashMap;

    /// Head table keyed by (span, lookup).
    #[derive(Default)]
    struct StubHeads(HashMap<(CharSpan, bool), Token>);

    impl StubHeads {
        fn with(mut self, span: CharSpan, exact_ok: bool, head: usize) -> Self {
            let token = Token {
                sentence: 0,
                index: head,
                span: CharSpan::new(head, head + 1),
            };
            self.0.insert((span, false), token);
            if exact_ok {
                self.0.insert((span, true), token);
            }
            self
        }
    }

    impl HeadFinder for StubHeads {
        fn head_token(&self, span: CharSpan, lookup: HeadLookup) -> Option<Token> {
            self.0.get(&(span, lookup == HeadLookup::Exact)).copied()
        }
    }

    fn doc() -> GoldDocument {
        GoldDocument::new("d1")
            .with_entity(Entity::new(
                "E1",
                vec![
                    EntityMention::new("m1", CharSpan::new(0, 14))
                        .with_head(CharSpan::new(10, 14)),
                    EntityMention::new("m2", CharSpan::new(50, 52)),
                ],
            ))
            .with_entity(Entity::new(
                "E2",
                vec![EntityMention::new("m3", CharSpan::new(20, 28))],
            ))
            .with_entity(Entity::new(
                "E3",
                vec![EntityMention::new("m4", CharSpan::new(20, 28))],
            ))
            .with_filler(Filler::new("F1", CharSpan::new(40, 49)))
    }

    fn aligned_id(aligner: &EreAligner<'_>, span: CharSpan) -> Option<String> {
        aligner.align(span).map(|a| a.id().to_string())
    }

    #[test]
    fn test_exact_span_match() {
        let doc = doc();
        let aligner = EreAligner::new(&doc, None, AlignmentOptions::exact());
        assert_eq!(aligned_id(&aligner, CharSpan::new(50, 52)), Some("E1".into()));
    }

    #[test]
    fn test_nominal_head_match() {
        let doc = doc();
        let aligner = EreAligner::new(&doc, None, AlignmentOptions::exact());
        assert_eq!(aligned_id(&aligner, CharSpan::new(10, 14)), Some("E1".into()));
    }

    #[test]
    fn test_ambiguity_takes_first_in_document_order() {
        let doc = doc();
        let aligner = EreAligner::new(&doc, None, AlignmentOptions::exact());
        assert_eq!(aligner.entities_for_span(CharSpan::new(20, 28)).len(), 2);
        assert_eq!(aligned_id(&aligner, CharSpan::new(20, 28)), Some("E2".into()));
    }

    #[test]
    fn test_filler_fallback() {
        let doc = doc();
        let aligner = EreAligner::new(&doc, None, AlignmentOptions::exact());
        let aligned = aligner.align(CharSpan::new(40, 49));
        assert!(matches!(aligned, Some(AlignedTo::Filler(f)) if f.id == "F1"));
    }

    #[test]
    fn test_no_match_without_relaxation() {
        let doc = doc();
        let heads = StubHeads::default()
            .with(CharSpan::new(4, 14), true, 12)
            .with(CharSpan::new(0, 14), true, 12);
        let aligner = EreAligner::new(&doc, Some(&heads), AlignmentOptions::exact());
        assert!(aligner.align(CharSpan::new(4, 14)).is_none());
    }

    #[test]
    fn test_relaxed_head_match() {
        let doc = doc();
        let heads = StubHeads::default()
            .with(CharSpan::new(4, 14), false, 12)
            .with(CharSpan::new(0, 14), true, 12);
        let aligner = EreAligner::new(&doc, Some(&heads), AlignmentOptions::relaxed(false));
        assert_eq!(aligned_id(&aligner, CharSpan::new(4, 14)), Some("E1".into()));
    }

    #[test]
    fn test_relaxed_exact_offsets_requires_constituent() {
        let doc = doc();
        let heads = StubHeads::default()
            .with(CharSpan::new(4, 14), false, 12)
            .with(CharSpan::new(0, 14), true, 12);
        let aligner = EreAligner::new(&doc, Some(&heads), AlignmentOptions::relaxed(true));
        assert!(aligner.align(CharSpan::new(4, 14)).is_none());
    }

    #[test]
    fn test_relaxed_filler_match() {
        let doc = doc();
        let heads = StubHeads::default()
            .with(CharSpan::new(44, 49), false, 45)
            .with(CharSpan::new(40, 49), false, 45);
        let aligner = EreAligner::new(&doc, Some(&heads), AlignmentOptions::relaxed(false));
        assert!(matches!(aligner.align(CharSpan::new(44, 49)), Some(AlignedTo::Filler(_))));
    }

    #[test]
    fn test_relaxation_without_parse_is_exact() {
        let doc = doc();
        let aligner = EreAligner::new(&doc, None, AlignmentOptions::relaxed(false));
        assert!(aligner.align(CharSpan::new(4, 14)).is_none());
        assert!(aligner.align(CharSpan::new(0, 14)).is_some());
    }
}
