//! Hawkes Prep - Sequential loan events for temporal point-process models
//!
//! Hawkes Prep turns per-customer loan histories into Hawkes-format event
//! streams through a deterministic pipeline: record parsing → type vocabulary
//! → event stream construction → train/dev/test assembly → persistence.
//!
//! ## Modules
//!
//! - **Conversion**: `parser`, `vocabulary`, `stream` turn raw records into events
//! - **Dataset**: `dataset`, `writer` split and persist the converted streams
//! - **Synthetic data**: `generator` produces reproducible loan histories

pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod parser;
pub mod pipeline;
pub mod stream;
pub mod types;
pub mod vocabulary;
pub mod writer;

pub use config::RunConfig;
pub use dataset::{DatasetAssembler, DatasetSplitBundle, SplitCounts, SplitRatios};
pub use error::PrepError;
pub use generator::{GeneratorConfig, LoanType, SyntheticGenerator};
pub use parser::{AgeOrdering, ParserOptions, RecordParser};
pub use pipeline::{
    convert_and_split, convert_to_event_streams, generate_and_save, HawkesConverter, RunSummary,
};
pub use stream::EventStreamBuilder;
pub use types::{CustomerStream, Event, ParsedEvent, RawCustomerRecord, Slice};
pub use vocabulary::TypeVocabulary;
pub use writer::{read_artifact, ArtifactFormat, DatasetArtifact, DatasetWriter};

/// Crate version recorded in the vocabulary sidecar
pub const PREP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name recorded in the vocabulary sidecar
pub const PRODUCER_NAME: &str = "hawkes-prep";
