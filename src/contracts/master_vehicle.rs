use serde::{Deserialize, Serialize};

use crate::errors::{InsuranceError, Result};
use crate::money::Money;
use crate::party::Person;
use crate::types::{ContractNumber, LegalForm};

use super::{ContractCore, SingleVehicleContract};

/// corporate umbrella contract aggregating single vehicle contracts for
/// shared billing and activity status; carries no coverage or payment
/// data of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterVehicleContract {
    core: ContractCore,
    beneficiary: Option<String>,
    children: Vec<SingleVehicleContract>,
}

impl MasterVehicleContract {
    pub(crate) fn new(
        number: ContractNumber,
        beneficiary: Option<&Person>,
        policy_holder: &Person,
    ) -> Result<Self> {
        if policy_holder.legal_form() != LegalForm::Legal {
            return Err(InsuranceError::PolicyHolderNotCorporate {
                id: policy_holder.id().to_string(),
            });
        }
        if let Some(beneficiary) = beneficiary {
            if beneficiary.id() == policy_holder.id() {
                return Err(InsuranceError::BeneficiaryIsPolicyHolder {
                    id: beneficiary.id().to_string(),
                });
            }
        }
        let core = ContractCore::new(number, policy_holder.id(), Money::ZERO, None)?;
        Ok(Self {
            core,
            beneficiary: beneficiary.map(|b| b.id().to_string()),
            children: Vec::new(),
        })
    }

    pub fn core(&self) -> &ContractCore {
        &self.core
    }

    pub fn number(&self) -> &ContractNumber {
        self.core.number()
    }

    pub fn policy_holder(&self) -> &str {
        self.core.policy_holder()
    }

    pub fn beneficiary(&self) -> Option<&str> {
        self.beneficiary.as_deref()
    }

    /// child contracts in the order they were transferred in
    pub fn children(&self) -> &[SingleVehicleContract] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [SingleVehicleContract] {
        &mut self.children
    }

    pub(crate) fn add_child(&mut self, child: SingleVehicleContract) {
        self.children.push(child);
    }

    pub fn child(&self, number: &ContractNumber) -> Option<&SingleVehicleContract> {
        self.children.iter().find(|c| c.number() == number)
    }

    pub(crate) fn child_mut(&mut self, number: &ContractNumber) -> Option<&mut SingleVehicleContract> {
        self.children.iter_mut().find(|c| c.number() == number)
    }

    /// with no children the master reports its own flag; once it has any,
    /// it is active iff at least one child is
    pub fn is_active(&self) -> bool {
        if self.children.is_empty() {
            self.core.is_active()
        } else {
            self.children.iter().any(|c| c.is_active())
        }
    }

    /// cascades to every child, then marks the master itself
    pub(crate) fn set_inactive(&mut self) {
        for child in &mut self.children {
            child.set_inactive();
        }
        self.core.set_inactive();
    }
}
