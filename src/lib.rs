//! # eal-scorer
//!
//! Event argument and linking scoring against ERE-style gold annotation.
//!
//! - **Arguments**: system role assertions are aligned to gold entities and
//!   fillers, projected onto canonical atoms, and scored with P/R/F1
//! - **Linking**: the system's grouping of its assertions is scored against
//!   gold event instances with a pairwise F-measure
//! - **Breakdowns**: per-event-type scores with seeded bootstrap resampling
//!
//! ## Pipeline
//!
//! ```text
//! GoldDocument ──► GoldExtractor ───────────────┐
//!                                               ├─► EvalPair ─► scoring network
//! DocumentSystemOutput ─► SystemExtractor ──────┘      │
//!                           (EreAligner)               ├─► aggregateF.{txt,json}
//!                                                      ├─► EventType.bootstrapped.{txt,json}
//!                                                      ├─► errors/<docid>.txt
//!                                                      └─► linkingF.txt
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use eal_scorer::prelude::*;
//! use eal_scorer::ere::{Entity, EntityMention, Event, EventArgument, EventMention};
//!
//! let gold = GoldDocument::new("d1")
//!     .with_entity(Entity::new("E1", vec![EntityMention::new("m1", CharSpan::new(0, 5))]))
//!     .with_event(Event::new(
//!         "ev1",
//!         vec![EventMention::new(
//!             "em1",
//!             "conflict",
//!             "attack",
//!             vec![EventArgument::entity("attacker", "m1")],
//!         )],
//!     ));
//! let output = DocumentSystemOutput::new(
//!     "d1",
//!     vec![Response::new("r1", "Conflict.Attack", "Attacker", CharSpan::new(0, 5))],
//!     ResponseLinking::new(vec![ResponseSet::new("s1", ["r1"])]),
//! );
//!
//! let out_dir = tempfile::tempdir()?;
//! let mut network = ScoringNetwork::new(
//!     &ScoringConfig::default(),
//!     Box::new(SimpleEventOntologyMapper::ere_to_kbp_2015()),
//!     out_dir.path(),
//! );
//! network.score(gold, output, None)?;
//! let summary = network.finish()?;
//! assert_eq!(summary.arguments.f1, 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod align;
pub mod config;
pub mod ere;
mod error;
pub mod eval;
pub mod extract;
pub mod offset;
pub mod ontology;
pub mod parse;
pub mod response;
pub mod scorer;
pub mod store;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    pub use crate::config::{RunConfig, ScoringConfig};
    pub use crate::ere::GoldDocument;
    pub use crate::error::{Error, Result};
    pub use crate::eval::{EvalPair, FMeasureCounts, InspectionNode, Inspector, Transform};
    pub use crate::offset::CharSpan;
    pub use crate::ontology::{EventOntologyMapper, SimpleEventOntologyMapper};
    pub use crate::response::{DocumentSystemOutput, Response, ResponseLinking, ResponseSet};
    pub use crate::scorer::{run, ScoringNetwork, ScoringSummary};
    pub use crate::types::DocLevelEventArg;
}

// Re-exports
pub use error::{Error, Result};
pub use offset::CharSpan;
pub use scorer::{run, ScoringNetwork, ScoringSummary};
pub use types::{ArgSet, DocLevelEventArg, Linking, ResponsesAndLinking};
