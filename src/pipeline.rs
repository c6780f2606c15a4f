//! Pipeline orchestration
//!
//! This module provides the public API for Hawkes Prep.
//! It orchestrates the full pipeline from raw customer records to persisted
//! train/dev/test artifacts.

use crate::config::RunConfig;
use crate::dataset::{DatasetAssembler, DatasetSplitBundle, SplitCounts, SplitRatios};
use crate::error::PrepError;
use crate::generator::SyntheticGenerator;
use crate::parser::{ParserOptions, RecordParser};
use crate::stream::EventStreamBuilder;
use crate::types::{CustomerStream, Event, RawCustomerRecord, Slice};
use crate::vocabulary::TypeVocabulary;
use crate::writer::DatasetWriter;
use std::path::PathBuf;
use tracing::info;

/// Convert raw records into Hawkes event streams with one shared vocabulary.
///
/// Codes are assigned in first-seen order while scanning `records` in input
/// order. The first malformed record aborts the conversion.
///
/// # Example
/// ```ignore
/// let (streams, vocabulary) = convert_to_event_streams(&records, &ParserOptions::default())?;
/// let num_types = vocabulary.size();
/// ```
pub fn convert_to_event_streams(
    records: &[RawCustomerRecord],
    options: &ParserOptions,
) -> Result<(Vec<CustomerStream>, TypeVocabulary), PrepError> {
    let mut converter = HawkesConverter::new(*options);
    let streams = converter.convert_all(records)?;
    Ok((streams, converter.into_vocabulary()))
}

/// Stateful converter that owns the vocabulary across calls.
///
/// Use this when records arrive in batches; every batch shares the same
/// codes. Finish all conversion before taking `num_types` for a split.
#[derive(Debug, Clone, Default)]
pub struct HawkesConverter {
    parser: RecordParser,
    vocabulary: TypeVocabulary,
}

impl HawkesConverter {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            parser: RecordParser::new(options),
            vocabulary: TypeVocabulary::new(),
        }
    }

    /// Continue from an existing vocabulary (e.g. one loaded from a sidecar)
    pub fn with_vocabulary(options: ParserOptions, vocabulary: TypeVocabulary) -> Self {
        Self {
            parser: RecordParser::new(options),
            vocabulary,
        }
    }

    /// Convert one record.
    ///
    /// The record is fully parsed before any label is interned, so a
    /// malformed record leaves the vocabulary untouched.
    pub fn convert(&mut self, record: &RawCustomerRecord) -> Result<Vec<Event>, PrepError> {
        let parsed = self.parser.parse(record)?;
        EventStreamBuilder::build(&record.customer_id, &parsed, &mut self.vocabulary)
    }

    /// Convert a batch of records in order
    pub fn convert_all(
        &mut self,
        records: &[RawCustomerRecord],
    ) -> Result<Vec<CustomerStream>, PrepError> {
        let mut streams = Vec::with_capacity(records.len());
        for record in records {
            let parsed = self.parser.parse(record)?;
            let stream =
                EventStreamBuilder::build_stream(&record.customer_id, &parsed, &mut self.vocabulary)?;
            streams.push(stream);
        }
        Ok(streams)
    }

    pub fn vocabulary(&self) -> &TypeVocabulary {
        &self.vocabulary
    }

    pub fn num_types(&self) -> usize {
        self.vocabulary.size()
    }

    pub fn into_vocabulary(self) -> TypeVocabulary {
        self.vocabulary
    }
}

/// Convert records and split them in one step
pub fn convert_and_split(
    records: &[RawCustomerRecord],
    options: &ParserOptions,
    ratios: SplitRatios,
) -> Result<(DatasetSplitBundle, TypeVocabulary), PrepError> {
    let (streams, vocabulary) = convert_to_event_streams(records, options)?;
    let bundle = DatasetAssembler::assemble(streams, vocabulary.size(), ratios)?;
    Ok((bundle, vocabulary))
}

/// Outcome of a full generate-and-save run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_customers: usize,
    pub total_events: usize,
    pub num_types: usize,
    pub counts: SplitCounts,
    pub ratios: SplitRatios,
    pub artifacts: Vec<(Slice, PathBuf)>,
    pub vocabulary_path: Option<PathBuf>,
    pub run_id: String,
}

/// Generate synthetic customers, convert them and write train/dev/test artifacts.
///
/// Pipeline stages:
/// 1. SyntheticGenerator - Produce raw customer records
/// 2. RecordParser + EventStreamBuilder - Convert with a shared vocabulary
/// 3. DatasetAssembler - Split by customer count
/// 4. DatasetWriter - Persist one artifact per slice (+ vocabulary sidecar)
pub fn generate_and_save(config: &RunConfig) -> Result<RunSummary, PrepError> {
    config.validate()?;

    info!(customers = config.generator.customers, "generating customer loan records");
    let mut generator = SyntheticGenerator::new(config.generator.clone())?;
    let records = generator.generate();

    info!("converting to Hawkes format");
    let (bundle, vocabulary) = convert_and_split(&records, &config.parser_options(), config.ratios)?;

    let total_events = Slice::ALL
        .iter()
        .flat_map(|&slice| bundle.slice(slice))
        .map(CustomerStream::len)
        .sum();

    info!(output_dir = %config.output_dir.display(), "saving dataset artifacts");
    let writer = DatasetWriter::new(config.format);
    let artifacts = writer.write_all(&bundle, &config.output_dir)?;

    let vocabulary_path = if config.write_vocabulary {
        let path = writer.vocabulary_path(&config.output_dir);
        writer.write_vocabulary(&vocabulary, &path)?;
        Some(path)
    } else {
        None
    };

    let counts = bundle.counts();
    info!(
        total = counts.total(),
        train = counts.train,
        dev = counts.dev,
        test = counts.test,
        num_types = bundle.num_types(),
        "dataset written"
    );

    Ok(RunSummary {
        total_customers: counts.total(),
        total_events,
        num_types: bundle.num_types(),
        counts,
        ratios: config.ratios,
        artifacts,
        vocabulary_path,
        run_id: writer.run_id().to_string(),
    })
}
