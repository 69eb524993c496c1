use serde::{Deserialize, Serialize};

use crate::errors::{InsuranceError, Result};
use crate::money::Money;
use crate::party::{Person, Vehicle};
use crate::payments::ContractPaymentData;
use crate::types::ContractNumber;

use super::ContractCore;

/// insures one vehicle for one policy holder, with an optional alternate
/// payout recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleVehicleContract {
    core: ContractCore,
    beneficiary: Option<String>,
    vehicle: Vehicle,
}

impl SingleVehicleContract {
    pub(crate) fn new(
        number: ContractNumber,
        beneficiary: Option<&Person>,
        policy_holder: &Person,
        payment_data: ContractPaymentData,
        coverage: Money,
        vehicle: Vehicle,
    ) -> Result<Self> {
        if let Some(beneficiary) = beneficiary {
            if beneficiary.id() == policy_holder.id() {
                return Err(InsuranceError::BeneficiaryIsPolicyHolder {
                    id: beneficiary.id().to_string(),
                });
            }
        }
        let core = ContractCore::new(
            number,
            policy_holder.id(),
            coverage,
            Some(payment_data),
        )?;
        Ok(Self {
            core,
            beneficiary: beneficiary.map(|b| b.id().to_string()),
            vehicle,
        })
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

    /// payout recipient if different from the policy holder
    pub fn beneficiary(&self) -> Option<&str> {
        self.beneficiary.as_deref()
    }

    pub fn set_beneficiary(&mut self, beneficiary: Option<&Person>) -> Result<()> {
        if let Some(beneficiary) = beneficiary {
            if beneficiary.id() == self.core.policy_holder() {
                return Err(InsuranceError::BeneficiaryIsPolicyHolder {
                    id: beneficiary.id().to_string(),
                });
            }
        }
        self.beneficiary = beneficiary.map(|b| b.id().to_string());
        Ok(())
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }
}
