pub mod handler;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::errors::{InsuranceError, Result};
use crate::money::Money;
use crate::types::PaymentFrequency;

pub use handler::PaymentHandler;

/// per-contract billing state: what is owed, how often it accrues, and
/// when the next cycle falls due
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractPaymentData {
    premium: Money,
    frequency: PaymentFrequency,
    next_payment_time: DateTime<Utc>,
    outstanding_balance: Money,
}

impl ContractPaymentData {
    pub fn new(
        premium: Money,
        frequency: PaymentFrequency,
        next_payment_time: DateTime<Utc>,
        outstanding_balance: Money,
    ) -> Result<Self> {
        if !premium.is_positive() {
            return Err(InsuranceError::NonPositivePremium { premium });
        }
        Ok(Self {
            premium,
            frequency,
            next_payment_time,
            outstanding_balance,
        })
    }

    pub fn premium(&self) -> Money {
        self.premium
    }

    pub fn set_premium(&mut self, premium: Money) -> Result<()> {
        if !premium.is_positive() {
            return Err(InsuranceError::NonPositivePremium { premium });
        }
        self.premium = premium;
        Ok(())
    }

    pub fn frequency(&self) -> PaymentFrequency {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: PaymentFrequency) {
        self.frequency = frequency;
    }

    pub fn next_payment_time(&self) -> DateTime<Utc> {
        self.next_payment_time
    }

    /// outstanding balance; negative means the contract is prepaid
    pub fn outstanding_balance(&self) -> Money {
        self.outstanding_balance
    }

    pub fn set_outstanding_balance(&mut self, balance: Money) {
        self.outstanding_balance = balance;
    }

    pub fn decrease_outstanding_balance(&mut self, amount: Money) {
        self.outstanding_balance -= amount;
    }

    /// advance the due date by one billing period, clamping to the end of
    /// shorter months the way calendar month arithmetic does
    pub fn advance_next_payment_time(&mut self) {
        self.next_payment_time = self.next_payment_time + Months::new(self.frequency.months());
    }
}

/// immutable ledger entry for one received payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstance {
    payment_time: DateTime<Utc>,
    amount: Money,
    sequence: u64,
}

impl PaymentInstance {
    pub(crate) fn new(payment_time: DateTime<Utc>, amount: Money, sequence: u64) -> Result<Self> {
        if !amount.is_positive() {
            return Err(InsuranceError::NonPositiveAmount { amount });
        }
        Ok(Self {
            payment_time,
            amount,
            sequence,
        })
    }

    pub fn payment_time(&self) -> DateTime<Utc> {
        self.payment_time
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    /// insertion index within the handler's ledger
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

// ordered by payment time, then insertion sequence, so two payments made
// at the same instant remain distinct ledger entries
impl Ord for PaymentInstance {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.payment_time, self.sequence).cmp(&(other.payment_time, other.sequence))
    }
}

impl PartialOrd for PaymentInstance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
