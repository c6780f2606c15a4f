//! Record parsing
//!
//! This module splits a customer's pipe-delimited fields into aligned
//! per-loan tuples:
//! - Field-count agreement across the three sequences
//! - Numeric parsing of amounts and ages
//! - Age ordering check (configurable)

use crate::error::PrepError;
use crate::types::{ParsedEvent, RawCustomerRecord, FIELD_SEPARATOR};
use serde::{Deserialize, Serialize};

/// How the parser treats ages that go backwards in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeOrdering {
    /// Reject records whose ages decrease
    #[default]
    Strict,
    /// Accept any ordering; decreasing ages yield negative inter-event gaps
    Permissive,
}

/// Options controlling record validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    pub age_ordering: AgeOrdering,
}

impl ParserOptions {
    pub fn permissive() -> Self {
        Self {
            age_ordering: AgeOrdering::Permissive,
        }
    }
}

/// Parser for converting raw records to parsed events
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser {
    options: ParserOptions,
}

impl RecordParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse one record into chronologically ordered events.
    ///
    /// Either every token parses and the event count equals the token count,
    /// or a `MalformedRecord` error is returned and nothing is produced.
    pub fn parse(&self, record: &RawCustomerRecord) -> Result<Vec<ParsedEvent>, PrepError> {
        let customer = record.customer_id.as_str();

        let types = split_field(&record.loan_type_seq);
        let amounts = split_field(&record.loan_amt_seq);
        let ages = split_field(&record.age_seq);

        if types.len() != amounts.len() || types.len() != ages.len() {
            return Err(PrepError::malformed(
                customer,
                format!(
                    "sequence lengths differ (loan_type_seq={}, loan_amt_seq={}, age_seq={})",
                    types.len(),
                    amounts.len(),
                    ages.len()
                ),
            ));
        }

        if types.is_empty() {
            return Err(PrepError::malformed(customer, "record has no events"));
        }

        let mut events = Vec::with_capacity(types.len());
        let mut previous_age: Option<f64> = None;

        for (idx, ((label, amount), age)) in types.iter().zip(&amounts).zip(&ages).enumerate() {
            if label.is_empty() {
                return Err(PrepError::malformed(
                    customer,
                    format!("empty loan type at position {}", idx),
                ));
            }

            let amount = parse_amount(customer, idx, amount)?;
            let age = parse_age(customer, idx, age)?;

            if self.options.age_ordering == AgeOrdering::Strict {
                if let Some(prev) = previous_age {
                    if age < prev {
                        return Err(PrepError::malformed(
                            customer,
                            format!(
                                "age decreases at position {} ({} after {})",
                                idx, age, prev
                            ),
                        ));
                    }
                }
            }
            previous_age = Some(age);

            events.push(ParsedEvent {
                type_label: label.to_string(),
                amount,
                age,
            });
        }

        Ok(events)
    }
}

/// Split a transport field into trimmed tokens.
///
/// A blank field has zero tokens rather than one empty token.
fn split_field(field: &str) -> Vec<&str> {
    if field.trim().is_empty() {
        return Vec::new();
    }
    field.split(FIELD_SEPARATOR).map(str::trim).collect()
}

fn parse_amount(customer: &str, idx: usize, token: &str) -> Result<f64, PrepError> {
    let amount: f64 = token.parse().map_err(|_| {
        PrepError::malformed(
            customer,
            format!("unparsable amount '{}' at position {}", token, idx),
        )
    })?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(PrepError::malformed(
            customer,
            format!("amount must be positive, got '{}' at position {}", token, idx),
        ));
    }

    Ok(amount)
}

fn parse_age(customer: &str, idx: usize, token: &str) -> Result<f64, PrepError> {
    let age: f64 = token.parse().map_err(|_| {
        PrepError::malformed(
            customer,
            format!("unparsable age '{}' at position {}", token, idx),
        )
    })?;

    if !age.is_finite() {
        return Err(PrepError::malformed(
            customer,
            format!("age must be finite, got '{}' at position {}", token, idx),
        ));
    }

    Ok(age)
}
