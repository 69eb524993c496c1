use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{InsuranceError, Result};
use crate::money::Money;

/// how often a contract's premium falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PaymentFrequency {
    /// billing period length in months
    pub fn months(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 1,
            PaymentFrequency::Quarterly => 3,
            PaymentFrequency::SemiAnnual => 6,
            PaymentFrequency::Annual => 12,
        }
    }

    /// number of billing periods per year
    pub fn periods_per_year(&self) -> i64 {
        (12 / self.months()) as i64
    }

    /// total premium collected over a year at this frequency
    pub fn annualize(&self, premium: Money) -> Money {
        premium * self.periods_per_year()
    }
}

/// legal form of a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LegalForm {
    /// natural person, identified by a birth number
    Natural,
    /// corporate entity, identified by a registration number
    Legal,
}

/// contract number: non-empty, immutable, unique within a company
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractNumber(String);

impl ContractNumber {
    pub fn new(number: impl Into<String>) -> Result<Self> {
        let number = number.into();
        if number.is_empty() {
            return Err(InsuranceError::EmptyContractNumber);
        }
        Ok(ContractNumber(number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for ContractNumber {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
