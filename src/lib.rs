pub mod company;
pub mod config;
pub mod contracts;
pub mod errors;
pub mod events;
pub mod money;
pub mod party;
pub mod payments;
pub mod types;

// re-export key types
pub use company::InsuranceCompany;
pub use config::{ClaimsConfig, CompanyConfig, UnderwritingConfig};
pub use contracts::{
    Contract, ContractCore, MasterVehicleContract, SingleVehicleContract, TravelContract,
};
pub use errors::{ErrorKind, InsuranceError, Result};
pub use events::{Event, EventStore};
pub use money::Money;
pub use party::{Person, Vehicle};
pub use payments::{ContractPaymentData, PaymentHandler, PaymentInstance};
pub use types::{ContractNumber, LegalForm, PaymentFrequency};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
