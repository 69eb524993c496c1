use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::errors::{InsuranceError, Result};
use crate::money::Money;
use crate::party::Person;
use crate::payments::ContractPaymentData;
use crate::types::{ContractNumber, LegalForm};

use super::ContractCore;

/// insures a set of natural persons for the duration of a trip; a claim
/// consumes the contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelContract {
    core: ContractCore,
    insured: BTreeSet<String>,
}

impl TravelContract {
    pub(crate) fn new(
        number: ContractNumber,
        policy_holder: &Person,
        payment_data: ContractPaymentData,
        coverage: Money,
        insured: &[&Person],
    ) -> Result<Self> {
        if insured.is_empty() {
            return Err(InsuranceError::NoInsuredPersons);
        }
        let mut ids = BTreeSet::new();
        for person in insured {
            if person.legal_form() != LegalForm::Natural {
                return Err(InsuranceError::PersonNotNatural {
                    id: person.id().to_string(),
                });
            }
            ids.insert(person.id().to_string());
        }
        let core = ContractCore::new(number, policy_holder.id(), coverage, Some(payment_data))?;
        Ok(Self { core, insured: ids })
    }

    pub fn core(&self) -> &ContractCore {
        &self.core
    }

    pub(crate) fn core_mut(&mut self) -> &mut ContractCore {
        &mut self.core
    }

    pub fn number(&self) -> &ContractNumber {
        self.core.number()
    }

    pub fn policy_holder(&self) -> &str {
        self.core.policy_holder()
    }

    pub fn coverage(&self) -> Money {
        self.core.coverage()
    }

    pub fn is_active(&self) -> bool {
        self.core.is_active()
    }

    pub(crate) fn set_inactive(&mut self) {
        self.core.set_inactive();
    }

    pub fn payment_data(&self) -> Option<&ContractPaymentData> {
        self.core.payment_data()
    }

    /// ids of the insured persons
    pub fn insured(&self) -> &BTreeSet<String> {
        &self.insured
    }

    pub fn covers(&self, person_id: &str) -> bool {
        self.insured.contains(person_id)
    }
}
