//! Synthetic loan histories
//!
//! Produces `RawCustomerRecord`s in transport form. Each customer gets between
//! one and `max_loans` loans; ages start uniformly in [25, 52] and grow by a
//! uniform 1–5 year gap per loan, so every generated `age_seq` is
//! non-decreasing.

use crate::error::PrepError;
use crate::types::{RawCustomerRecord, FIELD_SEPARATOR};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

/// Default number of synthetic customers
pub const DEFAULT_CUSTOMERS: usize = 2000;

/// Default upper bound on loans per customer
pub const DEFAULT_MAX_LOANS: usize = 15;

const FIRST_AGE_RANGE: RangeInclusive<f64> = 25.0..=52.0;
const AGE_GAP_RANGE: RangeInclusive<f64> = 1.0..=5.0;

/// Loan product types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanType {
    /// Home loan
    Hl,
    /// Two-wheeler
    Twd,
    /// Personal loan
    Pl,
    /// Auto loan
    Al,
    /// Business loan
    Bl,
    /// Consumer durable
    Cl,
    /// Other
    Dl,
}

impl LoanType {
    pub const ALL: [LoanType; 7] = [
        LoanType::Hl,
        LoanType::Twd,
        LoanType::Pl,
        LoanType::Al,
        LoanType::Bl,
        LoanType::Cl,
        LoanType::Dl,
    ];

    /// Types a customer's first loan is drawn from
    pub const FIRST_LOAN: [LoanType; 3] = [LoanType::Hl, LoanType::Pl, LoanType::Al];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Hl => "HL",
            LoanType::Twd => "TWD",
            LoanType::Pl => "PL",
            LoanType::Al => "AL",
            LoanType::Bl => "BL",
            LoanType::Cl => "CL",
            LoanType::Dl => "DL",
        }
    }

    /// Inclusive amount range for this type
    pub fn amount_range(&self) -> RangeInclusive<u64> {
        match self {
            LoanType::Hl => 500_000..=5_000_000,
            LoanType::Pl => 100_000..=1_000_000,
            LoanType::Al => 200_000..=2_000_000,
            LoanType::Twd | LoanType::Bl | LoanType::Cl | LoanType::Dl => 50_000..=500_000,
        }
    }
}

/// Generator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of customers to generate
    pub customers: usize,
    /// Maximum loans per customer (at least 1)
    pub max_loans: usize,
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            customers: DEFAULT_CUSTOMERS,
            max_loans: DEFAULT_MAX_LOANS,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.max_loans == 0 {
            return Err(PrepError::InvalidConfig(
                "max_loans must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seedable generator of synthetic loan histories
pub struct SyntheticGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, PrepError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate `config.customers` records with ids C0001, C0002, ...
    pub fn generate(&mut self) -> Vec<RawCustomerRecord> {
        let records: Vec<RawCustomerRecord> = (1..=self.config.customers)
            .map(|number| self.generate_customer(number))
            .collect();

        debug!(customers = records.len(), "generated synthetic records");
        records
    }

    /// Generate the record for customer `number` (1-based)
    pub fn generate_customer(&mut self, number: usize) -> RawCustomerRecord {
        let num_loans = self.rng.random_range(1..=self.config.max_loans);

        let mut ages = Vec::with_capacity(num_loans);
        let mut current_age = self.rng.random_range(FIRST_AGE_RANGE);
        ages.push(current_age);
        for _ in 1..num_loans {
            current_age += self.rng.random_range(AGE_GAP_RANGE);
            ages.push(current_age);
        }

        let mut types = Vec::with_capacity(num_loans);
        let mut amounts = Vec::with_capacity(num_loans);
        for idx in 0..num_loans {
            let pool: &[LoanType] = if idx == 0 {
                &LoanType::FIRST_LOAN
            } else {
                &LoanType::ALL
            };
            let loan_type = pool[self.rng.random_range(0..pool.len())];
            let amount = self.rng.random_range(loan_type.amount_range());

            types.push(loan_type.as_str().to_string());
            amounts.push(amount.to_string());
        }

        let ages: Vec<String> = ages.iter().map(|age| format!("{:.1}", age)).collect();
        let separator = FIELD_SEPARATOR.to_string();

        RawCustomerRecord {
            customer_id: format!("C{:04}", number),
            loan_type_seq: types.join(&separator),
            loan_amt_seq: amounts.join(&separator),
            age_seq: ages.join(&separator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RecordParser;
    use pretty_assertions::assert_eq;

    fn seeded(customers: usize, seed: u64) -> SyntheticGenerator {
        SyntheticGenerator::new(GeneratorConfig {
            customers,
            seed: Some(seed),
            ..Default::default()
        })
        .unwrap()
    }

    fn loan_type(label: &str) -> LoanType {
        *LoanType::ALL
            .iter()
            .find(|t| t.as_str() == label)
            .unwrap_or_else(|| panic!("unknown loan type {label}"))
    }

    #[test]
    fn test_customer_ids() {
        let records = seeded(12, 1).generate();

        assert_eq!(records.len(), 12);
        assert_eq!(records[0].customer_id, "C0001");
        assert_eq!(records[11].customer_id, "C0012");
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = seeded(50, 42).generate();
        let b = seeded(50, 42).generate();
        let c = seeded(50, 43).generate();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_records_respect_contract() {
        let parser = RecordParser::default();

        for record in seeded(300, 7).generate() {
            let events = parser.parse(&record).unwrap();
            assert!((1..=DEFAULT_MAX_LOANS).contains(&events.len()));

            let first = &events[0];
            assert!(LoanType::FIRST_LOAN.contains(&loan_type(&first.type_label)));
            assert!(first.age >= 25.0 && first.age <= 52.0);

            for pair in events.windows(2) {
                let gap = pair[1].age - pair[0].age;
                // one-decimal rendering can shift a gap by up to 0.1
                assert!(gap >= 0.9 - 1e-9 && gap <= 5.1 + 1e-9, "gap {gap}");
            }

            for event in &events {
                let range = loan_type(&event.type_label).amount_range();
                assert_eq!(event.amount.fract(), 0.0);
                assert!(range.contains(&(event.amount as u64)));
            }
        }
    }

    #[test]
    fn test_single_loan_limit() {
        let mut generator = SyntheticGenerator::new(GeneratorConfig {
            customers: 20,
            max_loans: 1,
            seed: Some(3),
        })
        .unwrap();

        for record in generator.generate() {
            assert!(!record.loan_type_seq.contains('|'));
        }
    }

    #[test]
    fn test_zero_max_loans_rejected() {
        let result = SyntheticGenerator::new(GeneratorConfig {
            max_loans: 0,
            ..Default::default()
        });

        assert!(matches!(result, Err(PrepError::InvalidConfig(_))));
    }

    #[test]
    fn test_amount_ranges() {
        assert_eq!(LoanType::Hl.amount_range(), 500_000..=5_000_000);
        assert_eq!(LoanType::Pl.amount_range(), 100_000..=1_000_000);
        assert_eq!(LoanType::Al.amount_range(), 200_000..=2_000_000);
        assert_eq!(LoanType::Twd.amount_range(), 50_000..=500_000);
        assert_eq!(LoanType::Dl.amount_range(), 50_000..=500_000);
    }
}
