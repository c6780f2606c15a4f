//! Event stream construction
//!
//! This module turns a customer's parsed loans into Hawkes-format events:
//! - Loan type labels replaced by vocabulary codes
//! - Time since the customer's first event
//! - Time since the previous event
//!
//! Ages are not re-checked for ordering here. If a record reached this stage
//! with decreasing ages (permissive parsing), `time_since_last_event` is
//! negative for the affected events and is passed through unchanged.

use crate::error::PrepError;
use crate::types::{CustomerStream, Event, ParsedEvent};
use crate::vocabulary::TypeVocabulary;
use tracing::trace;

/// Builder for converting parsed events to Hawkes event streams
pub struct EventStreamBuilder;

impl EventStreamBuilder {
    /// Build the event sequence for one customer.
    ///
    /// Unseen labels are interned into `vocabulary` in event order.
    pub fn build(
        customer_id: &str,
        parsed: &[ParsedEvent],
        vocabulary: &mut TypeVocabulary,
    ) -> Result<Vec<Event>, PrepError> {
        let first_age = match parsed.first() {
            Some(first) => first.age,
            None => return Err(PrepError::malformed(customer_id, "record has no events")),
        };

        let mut events = Vec::with_capacity(parsed.len());
        let mut previous_age = first_age;

        for loan in parsed {
            let event = Event {
                type_event: vocabulary.intern(&loan.type_label),
                loan_amount: loan.amount,
                time_since_start: loan.age - first_age,
                time_since_last_event: loan.age - previous_age,
            };
            previous_age = loan.age;
            events.push(event);
        }

        trace!(
            customer = customer_id,
            events = events.len(),
            duration = events.last().map(|e| e.time_since_start).unwrap_or(0.0),
            "built event stream"
        );

        Ok(events)
    }

    /// Build a `CustomerStream` that keeps the customer id alongside its events
    pub fn build_stream(
        customer_id: &str,
        parsed: &[ParsedEvent],
        vocabulary: &mut TypeVocabulary,
    ) -> Result<CustomerStream, PrepError> {
        let events = Self::build(customer_id, parsed, vocabulary)?;
        Ok(CustomerStream {
            customer_id: customer_id.to_string(),
            events,
        })
    }
}
