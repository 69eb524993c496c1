use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{InsuranceError, Result};
use crate::money::Money;
use crate::types::{ContractNumber, LegalForm};

/// a person registered with the company; the id decides the legal form:
/// a valid birth number makes a natural person, a valid registration
/// number a corporate one, anything else fails construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    id: String,
    legal_form: LegalForm,
    paid_out: Money,
    contracts: Vec<ContractNumber>,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let legal_form = if is_valid_birth_number(&id) {
            LegalForm::Natural
        } else if is_valid_registration_number(&id) {
            LegalForm::Legal
        } else {
            return Err(InsuranceError::InvalidPersonId { id });
        };
        Ok(Self {
            id,
            legal_form,
            paid_out: Money::ZERO,
            contracts: Vec::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn legal_form(&self) -> LegalForm {
        self.legal_form
    }

    /// cumulative amount paid out to this person across all claims
    pub fn paid_out_amount(&self) -> Money {
        self.paid_out
    }

    /// contracts held by this person, in acquisition order
    pub fn contracts(&self) -> &[ContractNumber] {
        &self.contracts
    }

    pub fn holds_contract(&self, number: &ContractNumber) -> bool {
        self.contracts.contains(number)
    }

    pub(crate) fn add_contract(&mut self, number: ContractNumber) {
        if !self.contracts.contains(&number) {
            self.contracts.push(number);
        }
    }

    pub(crate) fn remove_contract(&mut self, number: &ContractNumber) {
        self.contracts.retain(|n| n != number);
    }

    pub(crate) fn payout(&mut self, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(InsuranceError::NonPositivePayout { amount });
        }
        self.paid_out += amount;
        Ok(())
    }
}

/// birth number: 9 or 10 digits, YYMMDD prefix with the female month
/// offset of 50, a mod-11 checksum on 10-digit numbers, and a date that
/// exists in the inferred century
pub fn is_valid_birth_number(id: &str) -> bool {
    let len = id.len();
    if (len != 9 && len != 10) || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<i32> = id.bytes().map(|b| (b - b'0') as i32).collect();

    let year = digits[0] * 10 + digits[1];
    let month = digits[2] * 10 + digits[3];
    let day = digits[4] * 10 + digits[5];

    if !((1..=12).contains(&month) || (51..=62).contains(&month)) {
        return false;
    }
    let month = if month > 50 { month - 50 } else { month };

    // 9-digit numbers were only issued up to 1953
    if len == 9 && year > 53 {
        return false;
    }

    // alternating add/subtract over all ten digits, divisible by eleven
    if len == 10 {
        let sum: i32 = digits
            .iter()
            .enumerate()
            .map(|(i, d)| if i % 2 == 0 { *d } else { -*d })
            .sum();
        if sum % 11 != 0 {
            return false;
        }
    }

    let full_year = if len == 9 || year >= 54 {
        1900 + year
    } else {
        2000 + year
    };

    NaiveDate::from_ymd_opt(full_year, month as u32, day as u32).is_some()
}

/// registration number: exactly 6 or 8 digits
pub fn is_valid_registration_number(id: &str) -> bool {
    (id.len() == 6 || id.len() == 8) && id.bytes().all(|b| b.is_ascii_digit())
}

/// an insurable vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    license_plate: String,
    original_value: Money,
}

impl Vehicle {
    pub fn new(license_plate: impl Into<String>, original_value: Money) -> Result<Self> {
        let license_plate = license_plate.into();
        if license_plate.len() != 7
            || !license_plate
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(InsuranceError::InvalidLicensePlate {
                plate: license_plate,
            });
        }
        if !original_value.is_positive() {
            return Err(InsuranceError::NonPositiveVehicleValue {
                value: original_value,
            });
        }
        Ok(Self {
            license_plate,
            original_value,
        })
    }

    pub fn license_plate(&self) -> &str {
        &self.license_plate
    }

    pub fn original_value(&self) -> Money {
        self.original_value
    }
}
