pub mod master_vehicle;
pub mod single_vehicle;
pub mod travel;

use serde::{Deserialize, Serialize};

use crate::errors::{InsuranceError, Result};
use crate::money::Money;
use crate::payments::ContractPaymentData;
use crate::types::ContractNumber;

pub use master_vehicle::MasterVehicleContract;
pub use single_vehicle::SingleVehicleContract;
pub use travel::TravelContract;

/// identity and state shared by every contract variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCore {
    number: ContractNumber,
    policy_holder: String,
    coverage: Money,
    active: bool,
    payment_data: Option<ContractPaymentData>,
}

impl ContractCore {
    pub(crate) fn new(
        number: ContractNumber,
        policy_holder: &str,
        coverage: Money,
        payment_data: Option<ContractPaymentData>,
    ) -> Result<Self> {
        if coverage.is_negative() {
            return Err(InsuranceError::NegativeCoverage { coverage });
        }
        Ok(Self {
            number,
            policy_holder: policy_holder.to_string(),
            coverage,
            active: true,
            payment_data,
        })
    }

    pub fn number(&self) -> &ContractNumber {
        &self.number
    }

    pub fn policy_holder(&self) -> &str {
        &self.policy_holder
    }

    pub fn coverage(&self) -> Money {
        self.coverage
    }

    /// the raw active flag; masters derive their activity at the variant level
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_inactive(&mut self) {
        self.active = false;
    }

    pub fn payment_data(&self) -> Option<&ContractPaymentData> {
        self.payment_data.as_ref()
    }

    pub(crate) fn payment_data_mut(&mut self) -> Option<&mut ContractPaymentData> {
        self.payment_data.as_mut()
    }
}

/// a contract held by the company: the variants share the capability set
/// {is_active, set_inactive, pay, update balance}, with the master variant
/// overriding activity and payment semantics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Contract {
    SingleVehicle(SingleVehicleContract),
    Travel(TravelContract),
    Master(MasterVehicleContract),
}

impl Contract {
    fn core(&self) -> &ContractCore {
        match self {
            Contract::SingleVehicle(c) => c.core(),
            Contract::Travel(c) => c.core(),
            Contract::Master(c) => c.core(),
        }
    }

    pub fn number(&self) -> &ContractNumber {
        self.core().number()
    }

    pub fn policy_holder(&self) -> &str {
        self.core().policy_holder()
    }

    pub fn coverage(&self) -> Money {
        self.core().coverage()
    }

    /// a master with children is active iff any child is; everything else
    /// reports its own flag
    pub fn is_active(&self) -> bool {
        match self {
            Contract::Master(master) => master.is_active(),
            other => other.core().is_active(),
        }
    }

    /// deactivation is terminal; for a master it cascades to every child
    pub fn set_inactive(&mut self) {
        match self {
            Contract::SingleVehicle(c) => c.set_inactive(),
            Contract::Travel(c) => c.set_inactive(),
            Contract::Master(c) => c.set_inactive(),
        }
    }

    pub fn payment_data(&self) -> Option<&ContractPaymentData> {
        self.core().payment_data()
    }

    pub fn as_single_vehicle(&self) -> Option<&SingleVehicleContract> {
        match self {
            Contract::SingleVehicle(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_travel(&self) -> Option<&TravelContract> {
        match self {
            Contract::Travel(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_master(&self) -> Option<&MasterVehicleContract> {
        match self {
            Contract::Master(c) => Some(c),
            _ => None,
        }
    }
}
