use serde::{Deserialize, Serialize};

use crate::errors::{InsuranceError, Result};
use crate::money::Money;

/// underwriting parameters applied when a contract is issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderwritingConfig {
    /// minimum annual premium as a percentage of the insured vehicle's value
    pub vehicle_min_annual_percent: i64,
    /// coverage granted as a percentage of the insured vehicle's value
    pub vehicle_coverage_percent: i64,
    /// coverage granted per insured person on a travel contract
    pub travel_coverage_per_person: Money,
    /// minimum annual premium per insured person on a travel contract
    pub travel_min_annual_per_person: Money,
}

impl Default for UnderwritingConfig {
    fn default() -> Self {
        Self {
            vehicle_min_annual_percent: 2,
            vehicle_coverage_percent: 50,
            travel_coverage_per_person: Money::new(10),
            travel_min_annual_per_person: Money::new(5),
        }
    }
}

impl UnderwritingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.vehicle_min_annual_percent) {
            return Err(InsuranceError::InvalidConfiguration {
                message: format!(
                    "vehicle_min_annual_percent must be within 1..=100, got {}",
                    self.vehicle_min_annual_percent
                ),
            });
        }
        if !(1..=100).contains(&self.vehicle_coverage_percent) {
            return Err(InsuranceError::InvalidConfiguration {
                message: format!(
                    "vehicle_coverage_percent must be within 1..=100, got {}",
                    self.vehicle_coverage_percent
                ),
            });
        }
        if !self.travel_coverage_per_person.is_positive() {
            return Err(InsuranceError::InvalidConfiguration {
                message: format!(
                    "travel_coverage_per_person must be positive, got {}",
                    self.travel_coverage_per_person
                ),
            });
        }
        if !self.travel_min_annual_per_person.is_positive() {
            return Err(InsuranceError::InvalidConfiguration {
                message: format!(
                    "travel_min_annual_per_person must be positive, got {}",
                    self.travel_min_annual_per_person
                ),
            });
        }
        Ok(())
    }
}

/// claims settlement parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsConfig {
    /// damage at or above this percentage of the vehicle's value is a total loss
    pub total_loss_percent: i64,
}

impl Default for ClaimsConfig {
    fn default() -> Self {
        Self {
            total_loss_percent: 70,
        }
    }
}

impl ClaimsConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.total_loss_percent) {
            return Err(InsuranceError::InvalidConfiguration {
                message: format!(
                    "total_loss_percent must be within 1..=100, got {}",
                    self.total_loss_percent
                ),
            });
        }
        Ok(())
    }
}

/// company-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompanyConfig {
    pub underwriting: UnderwritingConfig,
    pub claims: ClaimsConfig,
}

impl CompanyConfig {
    pub fn validate(&self) -> Result<()> {
        self.underwriting.validate()?;
        self.claims.validate()?;
        Ok(())
    }
}
