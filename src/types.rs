//! Core types for the Hawkes Prep pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw customer records, parsed events, finalized events and the
//! per-customer streams that get split and persisted.

use serde::{Deserialize, Serialize};

/// Separator used by the transport form of every sequence field
pub const FIELD_SEPARATOR: char = '|';

/// One customer's loan history in transport form.
///
/// The three sequence fields are pipe-joined strings with one token per loan,
/// in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCustomerRecord {
    /// Customer identifier (e.g., "C0001")
    #[serde(rename = "customer")]
    pub customer_id: String,
    /// Loan type labels, e.g. "HL|TWD|PL"
    pub loan_type_seq: String,
    /// Loan amounts, e.g. "2000000|200000|500000"
    pub loan_amt_seq: String,
    /// Customer age at each loan, e.g. "42.0|45.3|47.1"
    pub age_seq: String,
}

impl RawCustomerRecord {
    pub fn new(
        customer_id: impl Into<String>,
        loan_type_seq: impl Into<String>,
        loan_amt_seq: impl Into<String>,
        age_seq: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            loan_type_seq: loan_type_seq.into(),
            loan_amt_seq: loan_amt_seq.into(),
            age_seq: age_seq.into(),
        }
    }
}

/// A single loan after splitting the transport fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedEvent {
    /// Loan type label as it appeared in the record
    pub type_label: String,
    /// Loan amount
    pub amount: f64,
    /// Customer age at the loan (absolute time axis for this customer)
    pub age: f64,
}

/// Finalized Hawkes-format event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Dense integer code of the loan type
    pub type_event: usize,
    /// Loan amount (identity of the parsed amount)
    pub loan_amount: f64,
    /// Age minus the age at the customer's first event
    pub time_since_start: f64,
    /// Age minus the age at the previous event (0.0 for the first event)
    pub time_since_last_event: f64,
}

/// Ordered event stream for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStream {
    pub customer_id: String,
    pub events: Vec<Event>,
}

impl CustomerStream {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Dataset partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slice {
    Train,
    Dev,
    Test,
}

impl Slice {
    /// All slices in persistence order
    pub const ALL: [Slice; 3] = [Slice::Train, Slice::Dev, Slice::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Train => "train",
            Slice::Dev => "dev",
            Slice::Test => "test",
        }
    }
}

impl std::fmt::Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
