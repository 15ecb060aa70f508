//! Projection of gold annotation and system output onto canonical atoms.
//!
//! Both extractors are [`Transform`] nodes, so they sit at the top of the
//! scoring network, and both keep diagnostic counts that are logged when the
//! network finishes.

use crate::align::{AlignmentOptions, EreAligner};
use crate::ere::{EventArgument, GoldDocument};
use crate::eval::Transform;
use crate::ontology::EventOntologyMapper;
use crate::parse::HeadFinder;
use crate::response::DocumentSystemOutput;
use crate::types::{ArgSet, DocLevelEventArg, KeyCounts, Linking, ResponsesAndLinking};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

// =============================================================================
// Gold side
// =============================================================================

/// Extracts atoms and event-instance linking from gold documents.
pub struct GoldExtractor<M> {
    mapper: M,
    banned_roles: BTreeSet<String>,
    all_gold_args: KeyCounts,
    skipped_unmapped: KeyCounts,
    skipped_banned: KeyCounts,
    reported_unmapped: HashSet<String>,
}

impl<M: EventOntologyMapper> GoldExtractor<M> {
    /// Extractor mapping vocabulary with `mapper` and skipping arguments
    /// whose canonical role is in `banned_roles`.
    pub fn new(mapper: M, banned_roles: BTreeSet<String>) -> Self {
        Self {
            mapper,
            banned_roles,
            all_gold_args: KeyCounts::new(),
            skipped_unmapped: KeyCounts::new(),
            skipped_banned: KeyCounts::new(),
            reported_unmapped: HashSet::new(),
        }
    }

    /// Gold arguments seen, by raw `type.subtype/role`.
    pub fn all_gold_args(&self) -> &KeyCounts {
        &self.all_gold_args
    }

    /// Gold arguments skipped for unmapped vocabulary, by raw `type.subtype/role`.
    pub fn skipped_unmapped(&self) -> &KeyCounts {
        &self.skipped_unmapped
    }

    /// Gold arguments skipped for a banned role, by raw `type.subtype/role`.
    pub fn skipped_banned(&self) -> &KeyCounts {
        &self.skipped_banned
    }

    fn note_unmapped(&mut self, kind: &str, value: &str) {
        if self.reported_unmapped.insert(format!("{}:{}", kind, value)) {
            log::debug!("{} {} is not known to the scoring ontology", kind, value);
        }
    }

    /// Atoms and linking for one gold document.
    pub fn extract(&mut self, doc: &GoldDocument) -> Result<ResponsesAndLinking> {
        let mut args = ArgSet::new();
        let mut linking = Linking::new();

        for event in &doc.events {
            let mut linked = ArgSet::new();
            for mention in &event.mentions {
                for argument in &mention.arguments {
                    let raw_key = format!(
                        "{}.{}/{}",
                        mention.event_type,
                        mention.subtype,
                        argument.role()
                    );
                    self.all_gold_args.add(raw_key.as_str());

                    let event_type = self
                        .mapper
                        .canonical_event_type(&mention.event_type, &mention.subtype);
                    let role = self.mapper.event_role(argument.role()).map(str::to_string);
                    let (Some(event_type), Some(role)) = (event_type, role) else {
                        if self.mapper.event_type(&mention.event_type).is_none() {
                            self.note_unmapped("EventType", &mention.event_type);
                        }
                        if self.mapper.event_subtype(&mention.subtype).is_none() {
                            self.note_unmapped("EventSubtype", &mention.subtype);
                        }
                        if self.mapper.event_role(argument.role()).is_none() {
                            self.note_unmapped("EventRole", argument.role());
                        }
                        self.skipped_unmapped.add(raw_key);
                        continue;
                    };
                    if self.banned_roles.contains(&role) {
                        self.skipped_banned.add(raw_key);
                        continue;
                    }

                    let referent = match argument {
                        EventArgument::Entity { entity_mention, .. } => {
                            &doc.entity_containing(entity_mention)
                                .ok_or_else(|| {
                                    Error::corrupt_input(format!(
                                        "{} lacks an entity for entity mention {}",
                                        doc.doc_id, entity_mention
                                    ))
                                })?
                                .id
                        }
                        EventArgument::Filler { filler, .. } => {
                            &doc.filler(filler)
                                .ok_or_else(|| {
                                    Error::corrupt_input(format!(
                                        "{} lacks filler {}",
                                        doc.doc_id, filler
                                    ))
                                })?
                                .id
                        }
                    };

                    let arg = DocLevelEventArg::new(&doc.doc_id, event_type, role, referent);
                    args.insert(arg.clone());
                    linked.insert(arg);
                }
            }
            linking.insert(linked);
        }

        Ok(ResponsesAndLinking::new(args, linking))
    }
}

impl<M: EventOntologyMapper> Transform<Arc<GoldDocument>, ResponsesAndLinking>
    for GoldExtractor<M>
{
    fn apply(&mut self, doc: &Arc<GoldDocument>) -> Result<ResponsesAndLinking> {
        self.extract(doc)
    }

    fn finish(&mut self) -> Result<()> {
        log::info!(
            "Of {} gold event arguments, {} were skipped as unmapped and {} for banned roles",
            self.all_gold_args.total(),
            self.skipped_unmapped.total(),
            self.skipped_banned.total()
        );
        for (key, skipped) in self.skipped_unmapped.iter() {
            log::info!(
                "Of {} gold {} arguments, {} skipped as unmapped",
                self.all_gold_args.count(key),
                key,
                skipped
            );
        }
        for (key, skipped) in self.skipped_banned.iter() {
            log::info!(
                "Of {} gold {} arguments, {} skipped for a banned role",
                self.all_gold_args.count(key),
                key,
                skipped
            );
        }
        Ok(())
    }
}

// =============================================================================
// System side
// =============================================================================

/// One document's system output, bundled with what alignment needs.
#[derive(Clone)]
pub struct SystemInput {
    /// Gold document the responses are aligned against
    pub gold: Arc<GoldDocument>,
    /// System output for the same document
    pub output: DocumentSystemOutput,
    /// Auxiliary parse of the document, if one exists
    pub parse: Option<Arc<dyn HeadFinder>>,
}

impl SystemInput {
    /// Bundle system output with its gold document.
    pub fn new(gold: Arc<GoldDocument>, output: DocumentSystemOutput) -> Self {
        Self {
            gold,
            output,
            parse: None,
        }
    }

    /// Attach an auxiliary parse.
    #[must_use]
    pub fn with_parse(mut self, parse: Arc<dyn HeadFinder>) -> Self {
        self.parse = Some(parse);
        self
    }
}

/// Aligns system responses to gold identities and re-expresses the
/// system's linking over the resulting atoms.
#[derive(Debug, Default)]
pub struct SystemExtractor {
    options: AlignmentOptions,
    responses_seen: KeyCounts,
    alignment_failures: KeyCounts,
}

impl SystemExtractor {
    /// Extractor aligning with `options`.
    pub fn new(options: AlignmentOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Responses seen, by `type/role`.
    pub fn responses_seen(&self) -> &KeyCounts {
        &self.responses_seen
    }

    /// Responses that aligned to nothing, by `type/role`.
    pub fn alignment_failures(&self) -> &KeyCounts {
        &self.alignment_failures
    }

    /// Atoms and linking for one document's system output.
    ///
    /// Responses that align to nothing are dropped and counted. Linked
    /// groups lose their unaligned members; groups that lose every member
    /// are kept as empty groups. Atoms take the gold document's id; pairing
    /// output with the right document is the caller's job.
    pub fn extract(&mut self, input: &SystemInput) -> Result<ResponsesAndLinking> {
        let gold = input.gold.as_ref();
        let output = &input.output;
        let aligner = EreAligner::new(gold, input.parse.as_deref(), self.options);
        let mut by_response: BTreeMap<&str, DocLevelEventArg> = BTreeMap::new();
        for response in &output.responses {
            self.responses_seen.add(response.type_role_key());
            match aligner.align(response.base_filler) {
                Some(aligned) => {
                    by_response.insert(
                        &response.id,
                        DocLevelEventArg::new(
                            &gold.doc_id,
                            &response.event_type,
                            &response.role,
                            aligned.id(),
                        ),
                    );
                }
                None => {
                    self.alignment_failures.add(response.type_role_key());
                    log::warn!(
                        "Neither entity nor filler match found for {} {} in {}",
                        response.id,
                        response.base_filler,
                        gold.doc_id
                    );
                }
            }
        }

        let args: ArgSet = by_response.values().cloned().collect();
        let linking: Linking = output
            .linking
            .response_sets
            .iter()
            .map(|set| {
                set.response_ids
                    .iter()
                    .filter_map(|id| by_response.get(id.as_str()).cloned())
                    .collect()
            })
            .collect();
        Ok(ResponsesAndLinking::new(args, linking))
    }
}

impl Transform<SystemInput, ResponsesAndLinking> for SystemExtractor {
    fn apply(&mut self, input: &SystemInput) -> Result<ResponsesAndLinking> {
        self.extract(input)
    }

    fn finish(&mut self) -> Result<()> {
        log::info!(
            "Of {} system responses, got {} mention alignment failures",
            self.responses_seen.total(),
            self.alignment_failures.total()
        );
        for (key, failures) in self.alignment_failures.iter() {
            log::info!(
                "Of {} {} responses, {} mention alignment failures",
                self.responses_seen.count(key),
                key,
                failures
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ere::{Entity, EntityMention, Event, EventMention, Filler};
    use crate::offset::CharSpan;
    use crate::ontology::SimpleEventOntologyMapper;
    use crate::response::{Response, ResponseLinking, ResponseSet};

    fn banned() -> BTreeSet<String> {
        ["Time".to_string()].into_iter().collect()
    }

    fn gold() -> GoldDocument {
        GoldDocument::new("d1")
            .with_entity(Entity::new(
                "E1",
                vec![
                    EntityMention::new("m1", CharSpan::new(0, 6)),
                    EntityMention::new("m1b", CharSpan::new(60, 62)),
                ],
            ))
            .with_entity(Entity::new("E2", vec![EntityMention::new("m2", CharSpan::new(24, 32))]))
            .with_filler(Filler::new("F1", CharSpan::new(40, 49)))
            .with_event(Event::new(
                "ev1",
                vec![
                    EventMention::new(
                        "em1",
                        "conflict",
                        "attack",
                        vec![
                            EventArgument::entity("attacker", "m1"),
                            EventArgument::filler("time", "F1"),
                        ],
                    ),
                    EventMention::new(
                        "em2",
                        "conflict",
                        "attack",
                        vec![EventArgument::entity("target", "m2")],
                    ),
                ],
            ))
            .with_event(Event::new(
                "ev2",
                vec![EventMention::new(
                    "em3",
                    "conflict",
                    "sabotage",
                    vec![EventArgument::entity("attacker", "m1b")],
                )],
            ))
    }

    fn gold_extractor() -> GoldExtractor<SimpleEventOntologyMapper> {
        GoldExtractor::new(SimpleEventOntologyMapper::ere_to_kbp_2015(), banned())
    }

    #[test]
    fn test_gold_atoms_and_linking() {
        let mut extractor = gold_extractor();
        let out = extractor.extract(&gold()).unwrap();
        let expected: ArgSet = [
            DocLevelEventArg::new("d1", "Conflict.Attack", "Attacker", "E1"),
            DocLevelEventArg::new("d1", "Conflict.Attack", "Target", "E2"),
        ]
        .into_iter()
        .collect();
        assert_eq!(out.args, expected);
        assert_eq!(out.linking.len(), 2);
        assert!(out.linking.contains(&expected));
        assert!(out.linking.contains(&ArgSet::new()));
    }

    #[test]
    fn test_gold_diagnostic_counts() {
        let mut extractor = gold_extractor();
        extractor.extract(&gold()).unwrap();
        assert_eq!(extractor.all_gold_args().total(), 4);
        assert_eq!(extractor.skipped_banned().count("conflict.attack/time"), 1);
        assert_eq!(extractor.skipped_unmapped().count("conflict.sabotage/attacker"), 1);
    }

    #[test]
    fn test_gold_missing_entity_is_corrupt() {
        let doc = GoldDocument::new("d1").with_event(Event::new(
            "ev1",
            vec![EventMention::new(
                "em1",
                "life",
                "die",
                vec![EventArgument::entity("victim", "nope")],
            )],
        ));
        let err = gold_extractor().extract(&doc).unwrap_err();
        assert!(matches!(err, Error::CorruptInput(_)));
    }

    #[test]
    fn test_gold_missing_filler_is_corrupt() {
        let doc = GoldDocument::new("d1").with_event(Event::new(
            "ev1",
            vec![EventMention::new(
                "em1",
                "justice",
                "chargeindict",
                vec![EventArgument::filler("crime", "nope")],
            )],
        ));
        let mut extractor =
            GoldExtractor::new(SimpleEventOntologyMapper::ere_to_kbp_2015(), BTreeSet::new());
        assert!(matches!(extractor.extract(&doc), Err(Error::CorruptInput(_))));
    }

    fn system_input(responses: Vec<Response>, sets: Vec<ResponseSet>) -> SystemInput {
        SystemInput::new(
            Arc::new(gold()),
            DocumentSystemOutput::new("d1", responses, ResponseLinking::new(sets)),
        )
    }

    #[test]
    fn test_system_alignment_and_linking() {
        let input = system_input(
            vec![
                Response::new("r1", "Conflict.Attack", "Attacker", CharSpan::new(0, 6)),
                Response::new("r2", "Conflict.Attack", "Target", CharSpan::new(24, 32)),
                Response::new("r3", "Conflict.Attack", "Place", CharSpan::new(70, 75)),
            ],
            vec![
                ResponseSet::new("s1", ["r1", "r2", "r3"]),
                ResponseSet::new("s2", ["r3"]),
            ],
        );
        let mut extractor = SystemExtractor::new(AlignmentOptions::exact());
        let out = extractor.extract(&input).unwrap();
        assert_eq!(out.args.len(), 2);
        assert!(out.args.iter().all(|a| a.role != "Place"));
        assert_eq!(out.linking.len(), 2);
        assert!(out.linking.contains(&out.args));
        assert!(out.linking.contains(&ArgSet::new()));
        assert_eq!(extractor.responses_seen().total(), 3);
        assert_eq!(extractor.alignment_failures().count("Conflict.Attack/Place"), 1);
    }

    #[test]
    fn test_system_filler_alignment() {
        let input = system_input(
            vec![Response::new("r1", "Conflict.Attack", "Time", CharSpan::new(40, 49))],
            vec![],
        );
        let out = SystemExtractor::default().extract(&input).unwrap();
        assert_eq!(out.args.iter().next().map(|a| a.entity_id.as_str()), Some("F1"));
    }
}
