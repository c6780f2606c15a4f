//! Dataset assembly
//!
//! Partitions converted customer streams into train/dev/test slices by
//! customer count, preserving input order, and attaches the shared
//! `num_types` to the resulting bundle.

use crate::error::PrepError;
use crate::types::{CustomerStream, Slice};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default train fraction
pub const DEFAULT_TRAIN_RATIO: f64 = 0.7;
/// Default dev fraction
pub const DEFAULT_DEV_RATIO: f64 = 0.15;
/// Default test fraction
pub const DEFAULT_TEST_RATIO: f64 = 0.15;

/// Ratio configuration for train/dev/test assignment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitRatios {
    /// Fraction assigned to train
    pub train: f64,
    /// Fraction assigned to dev
    pub dev: f64,
    /// Fraction assigned to test (informational; test takes the remainder)
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: DEFAULT_TRAIN_RATIO,
            dev: DEFAULT_DEV_RATIO,
            test: DEFAULT_TEST_RATIO,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, dev: f64, test: f64) -> Self {
        Self { train, dev, test }
    }

    /// Reject negative or non-finite ratios.
    ///
    /// A sum other than 1.0 is allowed: the test slice absorbs whatever the
    /// train and dev cut points leave over.
    pub fn validate(&self) -> Result<(), PrepError> {
        for (name, value) in [("train", self.train), ("dev", self.dev), ("test", self.test)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PrepError::InvalidConfig(format!(
                    "{} ratio must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let sum = self.train + self.dev + self.test;
        if (sum - 1.0).abs() > 1e-6 {
            warn!(
                train = self.train,
                dev = self.dev,
                test = self.test,
                sum,
                "split ratios do not sum to 1.0; test slice takes the remainder"
            );
        }

        Ok(())
    }

    /// Customer counts per slice for a dataset of `total` customers
    pub fn counts(&self, total: usize) -> SplitCounts {
        let n_train = ((total as f64) * self.train).floor() as usize;
        let n_dev = ((total as f64) * self.dev).floor() as usize;

        // Over-unity ratios must not cut past the end of the data
        let n_train = n_train.min(total);
        let n_dev = n_dev.min(total - n_train);

        SplitCounts {
            train: n_train,
            dev: n_dev,
            test: total - n_train - n_dev,
        }
    }
}

/// Number of customers in each slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitCounts {
    pub train: usize,
    pub dev: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.train + self.dev + self.test
    }

    pub fn get(&self, slice: Slice) -> usize {
        match slice {
            Slice::Train => self.train,
            Slice::Dev => self.dev,
            Slice::Test => self.test,
        }
    }
}

/// Train/dev/test streams sharing one vocabulary size
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSplitBundle {
    train: Vec<CustomerStream>,
    dev: Vec<CustomerStream>,
    test: Vec<CustomerStream>,
    num_types: usize,
}

impl DatasetSplitBundle {
    pub fn slice(&self, slice: Slice) -> &[CustomerStream] {
        match slice {
            Slice::Train => &self.train,
            Slice::Dev => &self.dev,
            Slice::Test => &self.test,
        }
    }

    pub fn num_types(&self) -> usize {
        self.num_types
    }

    pub fn counts(&self) -> SplitCounts {
        SplitCounts {
            train: self.train.len(),
            dev: self.dev.len(),
            test: self.test.len(),
        }
    }
}

/// Assembler for partitioning customer streams
pub struct DatasetAssembler;

impl DatasetAssembler {
    /// Split `streams` (in original customer order) into a bundle.
    ///
    /// `num_types` must come from the vocabulary built over all of `streams`.
    pub fn assemble(
        streams: Vec<CustomerStream>,
        num_types: usize,
        ratios: SplitRatios,
    ) -> Result<DatasetSplitBundle, PrepError> {
        ratios.validate()?;

        let counts = ratios.counts(streams.len());

        let mut train = streams;
        let mut dev = train.split_off(counts.train);
        let test = dev.split_off(counts.dev);

        debug!(
            train = train.len(),
            dev = dev.len(),
            test = test.len(),
            num_types,
            "assembled dataset split"
        );

        Ok(DatasetSplitBundle {
            train,
            dev,
            test,
            num_types,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Event;
    use pretty_assertions::assert_eq;

    fn make_streams(n: usize) -> Vec<CustomerStream> {
        (1..=n)
            .map(|i| CustomerStream {
                customer_id: format!("C{:04}", i),
                events: vec![Event {
                    type_event: 0,
                    loan_amount: 100_000.0,
                    time_since_start: 0.0,
                    time_since_last_event: 0.0,
                }],
            })
            .collect()
    }

    fn ids(streams: &[CustomerStream]) -> Vec<String> {
        streams.iter().map(|s| s.customer_id.clone()).collect()
    }

    #[test]
    fn test_default_split_counts() {
        let counts = SplitRatios::default().counts(2000);

        assert_eq!(
            counts,
            SplitCounts {
                train: 1400,
                dev: 300,
                test: 300,
            }
        );
    }

    #[test]
    fn test_test_slice_absorbs_remainder() {
        // 0.7 * 7 = 4.9 -> 4, 0.15 * 7 = 1.05 -> 1
        let counts = SplitRatios::default().counts(7);

        assert_eq!(counts.train, 4);
        assert_eq!(counts.dev, 1);
        assert_eq!(counts.test, 2);
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn test_assemble_preserves_order_and_coverage() {
        let streams = make_streams(10);
        let all_ids = ids(&streams);

        let bundle = DatasetAssembler::assemble(streams, 3, SplitRatios::default()).unwrap();

        let mut recombined = ids(bundle.slice(Slice::Train));
        recombined.extend(ids(bundle.slice(Slice::Dev)));
        recombined.extend(ids(bundle.slice(Slice::Test)));
        assert_eq!(recombined, all_ids);

        assert_eq!(bundle.counts().train, 7);
        assert_eq!(bundle.counts().dev, 1);
        assert_eq!(bundle.counts().test, 2);
        assert_eq!(bundle.num_types(), 3);
    }

    #[test]
    fn test_no_drop_or_duplicate_for_any_size() {
        let ratios = SplitRatios::new(0.6, 0.25, 0.15);
        for n in 0..50 {
            let bundle = DatasetAssembler::assemble(make_streams(n), 1, ratios).unwrap();
            assert_eq!(bundle.counts().total(), n);
        }
    }

    #[test]
    fn test_over_unity_ratios_are_clamped() {
        let ratios = SplitRatios::new(0.8, 0.5, 0.0);
        let counts = ratios.counts(10);

        assert_eq!(counts.train, 8);
        assert_eq!(counts.dev, 2);
        assert_eq!(counts.test, 0);
    }

    #[test]
    fn test_under_unity_ratios_feed_test() {
        let ratios = SplitRatios::new(0.5, 0.1, 0.1);
        let counts = ratios.counts(10);

        assert_eq!(counts.test, 4);
    }

    #[test]
    fn test_empty_dataset() {
        let bundle = DatasetAssembler::assemble(Vec::new(), 0, SplitRatios::default()).unwrap();

        assert_eq!(bundle.counts().total(), 0);
        assert!(bundle.slice(Slice::Train).is_empty());
    }

    #[test]
    fn test_rejects_negative_ratio() {
        let ratios = SplitRatios::new(0.7, -0.1, 0.4);
        let result = DatasetAssembler::assemble(make_streams(3), 1, ratios);

        assert!(matches!(result, Err(PrepError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_nan_ratio() {
        let ratios = SplitRatios::new(f64::NAN, 0.15, 0.15);
        assert!(ratios.validate().is_err());
    }
}
