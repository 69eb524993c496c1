use thiserror::Error;

use crate::money::Money;

/// the two failure families of the engine: malformed or out-of-range input
/// values, and business-rule violations tied to a contract's lifecycle,
/// ownership, or membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    InvalidContract,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsuranceError {
    #[error("contract number cannot be empty")]
    EmptyContractNumber,

    #[error("contract number already in use: {number}")]
    DuplicateContractNumber { number: String },

    #[error("payment amount must be positive: {amount}")]
    NonPositiveAmount { amount: Money },

    #[error("premium must be positive: {premium}")]
    NonPositivePremium { premium: Money },

    #[error("expected damages must be positive: {damages}")]
    NonPositiveDamages { damages: Money },

    #[error("payout amount must be positive: {amount}")]
    NonPositivePayout { amount: Money },

    #[error("annual premium {annual} below required minimum {minimum}")]
    PremiumBelowMinimum { annual: Money, minimum: Money },

    #[error("travel contract needs at least one insured person")]
    NoInsuredPersons,

    #[error("claim needs at least one affected person")]
    NoAffectedPersons,

    #[error("person is not covered by this contract: {id}")]
    PersonNotCovered { id: String },

    #[error("only natural persons can be covered by a travel contract: {id}")]
    PersonNotNatural { id: String },

    #[error("policy holder of a master contract must be a corporate entity: {id}")]
    PolicyHolderNotCorporate { id: String },

    #[error("person is not registered with this company: {id}")]
    UnknownPerson { id: String },

    #[error("person already registered: {id}")]
    DuplicatePerson { id: String },

    #[error("id is neither a valid birth number nor a registration number: {id}")]
    InvalidPersonId { id: String },

    #[error("license plate must be 7 uppercase letters or digits: {plate}")]
    InvalidLicensePlate { plate: String },

    #[error("vehicle value must be positive: {value}")]
    NonPositiveVehicleValue { value: Money },

    #[error("beneficiary cannot be the policy holder: {id}")]
    BeneficiaryIsPolicyHolder { id: String },

    #[error("coverage amount cannot be negative: {coverage}")]
    NegativeCoverage { coverage: Money },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("no contract with this number at this company: {number}")]
    UnknownContract { number: String },

    #[error("contract is not active: {number}")]
    ContractInactive { number: String },

    #[error("operation does not apply to this kind of contract: {number}")]
    WrongContractKind { number: String },

    #[error("master contract has no child contracts: {number}")]
    NoChildContracts { number: String },

    #[error("contracts do not share a policy holder: {master} vs {single}")]
    PolicyHolderMismatch { master: String, single: String },

    #[error("contract missing from its policy holder's records: {number}")]
    NotInHolderRecords { number: String },
}

impl InsuranceError {
    /// classify into one of the two error families
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsuranceError::UnknownContract { .. }
            | InsuranceError::ContractInactive { .. }
            | InsuranceError::WrongContractKind { .. }
            | InsuranceError::NoChildContracts { .. }
            | InsuranceError::PolicyHolderMismatch { .. }
            | InsuranceError::NotInHolderRecords { .. } => ErrorKind::InvalidContract,
            _ => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, InsuranceError>;
