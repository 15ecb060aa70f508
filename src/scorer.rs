//! Scoring network wiring and the document loop.
//!
//! [`ScoringNetwork`] owns the network for one run: feed it one
//! gold/system pair per document with [`ScoringNetwork::score`], then call
//! [`ScoringNetwork::finish`] to write every report. [`run`] drives a whole
//! run from a [`RunConfig`].

use crate::config::{RunConfig, ScoringConfig};
use crate::ere::GoldDocument;
use crate::eval::{
    restrict_to_linking, transform_both, AggregateFScoreSink, Alignment, BootstrapBreakdownSink,
    BootstrapReport, EquivalenceAligner, ErrorLoggerSink, EvalPair, FMeasureCounts, FScoreReport,
    InspectionNode, Inspector, LinkingScorer, PairTransform, Shared,
};
use crate::extract::{GoldExtractor, SystemExtractor, SystemInput};
use crate::ontology::{EventOntologyMapper, SimpleEventOntologyMapper};
use crate::parse::{HeadFinder, ParsedDocument};
use crate::response::DocumentSystemOutput;
use crate::store::{
    load_doc_id_list, load_doc_id_to_file_map, JsonSystemOutputStore, SystemOutputStore,
};
use crate::types::{ArgSet, DocLevelEventArg, KeyCounts, Linking, ResponsesAndLinking};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Name of the aggregate argument report.
pub const AGGREGATE_REPORT: &str = "aggregateF";

/// Name of the per-event-type bootstrap report.
pub const EVENT_TYPE_BREAKDOWN: &str = "EventType";

type RootInput = EvalPair<Arc<GoldDocument>, SystemInput>;
type SidePair = EvalPair<ResponsesAndLinking, ResponsesAndLinking>;

/// Results of a finished run.
#[derive(Debug, Clone)]
pub struct ScoringSummary {
    /// Documents scored
    pub documents: usize,
    /// Argument scores
    pub arguments: FScoreReport,
    /// Pairwise linking counts
    pub linking: FMeasureCounts,
    /// Per-event-type bootstrap breakdown
    pub event_types: BootstrapReport,
    /// Gold arguments seen, by raw `type.subtype/role`
    pub gold_arguments: KeyCounts,
    /// Gold arguments skipped for unmapped vocabulary
    pub gold_skipped_unmapped: KeyCounts,
    /// Gold arguments skipped for banned roles
    pub gold_skipped_banned: KeyCounts,
    /// System responses seen, by `type/role`
    pub system_responses: KeyCounts,
    /// System responses that aligned to nothing, by `type/role`
    pub alignment_failures: KeyCounts,
}

impl fmt::Display for ScoringSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Documents scored: {}", self.documents)?;
        writeln!(f, "Arguments: {}", self.arguments.counts)?;
        writeln!(f, "Linking:   {}", self.linking)?;
        write!(
            f,
            "Alignment failures: {} of {} system responses",
            self.alignment_failures.total(),
            self.system_responses.total()
        )
    }
}

/// The wired scoring network for one run.
pub struct ScoringNetwork {
    root: InspectionNode<RootInput>,
    gold: Shared<GoldExtractor<Box<dyn EventOntologyMapper>>>,
    system: Shared<SystemExtractor>,
    aggregate: Shared<AggregateFScoreSink>,
    event_types: Shared<BootstrapBreakdownSink<DocLevelEventArg>>,
    linking: Shared<LinkingScorer>,
    banned_roles: BTreeSet<String>,
    documents: usize,
}

impl ScoringNetwork {
    /// Wire a network writing its reports under `output_dir`.
    pub fn new(
        config: &ScoringConfig,
        mapper: Box<dyn EventOntologyMapper>,
        output_dir: impl AsRef<Path>,
    ) -> Self {
        let output_dir = output_dir.as_ref();
        let gold = Shared::new(GoldExtractor::new(mapper, config.banned_roles.clone()));
        let system = Shared::new(SystemExtractor::new(config.alignment_options()));
        let aggregate = Shared::new(AggregateFScoreSink::new(AGGREGATE_REPORT, output_dir));
        let event_types = Shared::new(BootstrapBreakdownSink::new(
            EVENT_TYPE_BREAKDOWN,
            output_dir,
            |arg: &DocLevelEventArg| arg.event_type.clone(),
            config.bootstrap_rounds,
            config.bootstrap_seed,
        ));
        let errors = ErrorLoggerSink::new(output_dir, |arg: &DocLevelEventArg| arg.doc_id.clone());
        let linking = Shared::new(LinkingScorer::new(output_dir));

        let mut root: InspectionNode<RootInput> = InspectionNode::new();
        root.transformed(
            PairTransform::new(gold.clone(), system.clone()),
            |sides: &mut InspectionNode<SidePair>| {
                sides.map(
                    transform_both(|side: &ResponsesAndLinking| side.args.clone()),
                    |args: &mut InspectionNode<EvalPair<ArgSet, ArgSet>>| {
                        args.transformed(
                            EquivalenceAligner,
                            |alignment: &mut InspectionNode<Alignment<DocLevelEventArg>>| {
                                alignment
                                    .inspect_with(aggregate.clone())
                                    .inspect_with(errors)
                                    .inspect_with(event_types.clone());
                            },
                        );
                    },
                );
                sides.map(
                    transform_both(|side: &ResponsesAndLinking| side.linking.clone()),
                    |linkings: &mut InspectionNode<EvalPair<Linking, Linking>>| {
                        linkings.map(
                            restrict_to_linking::<DocLevelEventArg>,
                            |restricted: &mut InspectionNode<EvalPair<Linking, Linking>>| {
                                restricted.inspect_with(linking.clone());
                            },
                        );
                    },
                );
            },
        );

        Self {
            root,
            gold,
            system,
            aggregate,
            event_types,
            linking,
            banned_roles: config.banned_roles.clone(),
            documents: 0,
        }
    }

    /// Push one document through the network.
    ///
    /// The system output must belong to `gold` and pass
    /// [`DocumentSystemOutput::validate`]. Banned roles are removed from it
    /// before extraction.
    pub fn score(
        &mut self,
        gold: GoldDocument,
        output: DocumentSystemOutput,
        parse: Option<Arc<dyn HeadFinder>>,
    ) -> Result<()> {
        if gold.doc_id != output.doc_id {
            return Err(Error::corrupt_input(format!(
                "system output for {} paired with gold document {}",
                output.doc_id, gold.doc_id
            )));
        }
        output.validate()?;
        let gold = Arc::new(gold);
        let input = SystemInput {
            gold: Arc::clone(&gold),
            output: output.without_roles(&self.banned_roles),
            parse,
        };
        self.root.inspect(&EvalPair::of(gold, input))?;
        self.documents += 1;
        Ok(())
    }

    /// Finish every node, writing all reports.
    pub fn finish(mut self) -> Result<ScoringSummary> {
        self.root.finish()?;

        let missing =
            |what: &str| Error::invalid_input(format!("{} report was not produced", what));
        let arguments = self
            .aggregate
            .borrow()
            .report()
            .cloned()
            .ok_or_else(|| missing(AGGREGATE_REPORT))?;
        let event_types = self
            .event_types
            .borrow()
            .report()
            .cloned()
            .ok_or_else(|| missing(EVENT_TYPE_BREAKDOWN))?;
        let gold = self.gold.borrow();
        let system = self.system.borrow();

        Ok(ScoringSummary {
            documents: self.documents,
            arguments,
            linking: self.linking.borrow().counts(),
            event_types,
            gold_arguments: gold.all_gold_args().clone(),
            gold_skipped_unmapped: gold.skipped_unmapped().clone(),
            gold_skipped_banned: gold.skipped_banned().clone(),
            system_responses: system.responses_seen().clone(),
            alignment_failures: system.alignment_failures().clone(),
        })
    }
}

/// Score every configured document and write all reports.
pub fn run(config: &RunConfig) -> Result<ScoringSummary> {
    let mut config = config.clone();
    config.validate()?;

    let doc_ids = load_doc_id_list(&config.doc_ids_to_score)?;
    let gold_files = load_doc_id_to_file_map(&config.gold_doc_map)?;
    let parse_files = match &config.parse_doc_map {
        Some(path) => load_doc_id_to_file_map(path)?,
        None => Default::default(),
    };
    let mut store = JsonSystemOutputStore::open(&config.system_output)?;
    let mapper: Box<dyn EventOntologyMapper> = match &config.ontology_mapping {
        Some(path) => Box::new(SimpleEventOntologyMapper::from_toml_file(path)?),
        None => Box::new(SimpleEventOntologyMapper::ere_to_kbp_2015()),
    };
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| Error::write(&config.output_dir, e))?;

    let unlisted = store.doc_ids()?.difference(&doc_ids).count();
    if unlisted > 0 {
        log::info!("Ignoring system output for {} unlisted documents", unlisted);
    }
    log::info!("Scoring over {} documents", doc_ids.len());
    let mut network = ScoringNetwork::new(&config.scoring, mapper, &config.output_dir);

    for doc_id in &doc_ids {
        let gold_file = gold_files
            .get(doc_id)
            .ok_or_else(|| Error::invalid_input(format!("Missing key file for {}", doc_id)))?;
        let gold = GoldDocument::from_json_file(gold_file)?;
        if &gold.doc_id != doc_id {
            return Err(Error::corrupt_input(format!(
                "{} contains document {} but was listed for {}",
                gold_file.display(),
                gold.doc_id,
                doc_id
            )));
        }

        let output = store.read_or_empty(doc_id)?;

        let mut parse: Option<Arc<dyn HeadFinder>> = None;
        if config.scoring.relax_alignment_using_auxiliary_parse {
            if let Some(path) = parse_files.get(doc_id) {
                let parsed: Arc<dyn HeadFinder> = Arc::new(ParsedDocument::from_json_file(path)?);
                parse = Some(parsed);
            }
        }

        network.score(gold, output, parse)?;
    }

    store.close()?;
    let summary = network.finish()?;
    log::info!("{}", summary);
    Ok(summary)
}
