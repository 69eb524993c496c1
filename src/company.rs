use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::CompanyConfig;
use crate::contracts::{
    Contract, ContractCore, MasterVehicleContract, SingleVehicleContract, TravelContract,
};
use crate::errors::{InsuranceError, Result};
use crate::events::{Event, EventStore};
use crate::money::Money;
use crate::party::{Person, Vehicle};
use crate::payments::{ContractPaymentData, PaymentHandler, PaymentInstance};
use crate::types::{ContractNumber, PaymentFrequency};

/// where a single vehicle contract currently lives: at the top level or
/// inside a master's child set
#[derive(Debug, Clone, Copy)]
enum SingleLocation {
    TopLevel(usize),
    Child { master: usize, child: usize },
}

/// owns the contract set, the party registry, and the payment handler;
/// every contract-creation, billing-sweep, payment, and claims operation
/// goes through here. time-dependent operations read the externally
/// controlled clock passed in as a time provider
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InsuranceCompany {
    config: CompanyConfig,
    parties: HashMap<String, Person>,
    contracts: Vec<Contract>,
    handler: PaymentHandler,
    #[serde(skip)]
    events: EventStore,
}

impl InsuranceCompany {
    /// company with default underwriting and claims parameters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompanyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &CompanyConfig {
        &self.config
    }

    /// top-level contracts in issuance order; transferred singles live
    /// inside their master's child set instead
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn contract(&self, number: &str) -> Option<&Contract> {
        self.contracts.iter().find(|c| c.number() == number)
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.parties.get(id)
    }

    pub fn handler(&self) -> &PaymentHandler {
        &self.handler
    }

    pub fn payment_history(&self, number: &str) -> Option<&BTreeSet<PaymentInstance>> {
        let number = ContractNumber::new(number).ok()?;
        self.handler.history_for(&number)
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    /// register a person before they can hold or be covered by contracts
    pub fn register_person(&mut self, person: Person) -> Result<()> {
        if self.parties.contains_key(person.id()) {
            return Err(InsuranceError::DuplicatePerson {
                id: person.id().to_string(),
            });
        }
        self.events.emit(Event::PersonRegistered {
            id: person.id().to_string(),
            legal_form: person.legal_form(),
        });
        self.parties.insert(person.id().to_string(), person);
        Ok(())
    }

    /// issue a single vehicle contract: the annual premium equivalent must
    /// reach the configured percentage of the vehicle's value, coverage is
    /// the configured share of that value, and billing catches up
    /// immediately (charging the first cycle on the spot)
    pub fn insure_vehicle(
        &mut self,
        number: &str,
        beneficiary: Option<&str>,
        policy_holder: &str,
        premium: Money,
        frequency: PaymentFrequency,
        vehicle: Vehicle,
        time: &SafeTimeProvider,
    ) -> Result<&SingleVehicleContract> {
        let number = ContractNumber::new(number)?;
        self.ensure_number_free(&number)?;
        if !premium.is_positive() {
            return Err(InsuranceError::NonPositivePremium { premium });
        }

        let annual = frequency.annualize(premium);
        let minimum = vehicle
            .original_value()
            .percent(self.config.underwriting.vehicle_min_annual_percent);
        if annual < minimum {
            return Err(InsuranceError::PremiumBelowMinimum { annual, minimum });
        }

        let holder = self.require_person(policy_holder)?;
        let beneficiary_person = match beneficiary {
            Some(id) => Some(self.require_person(id)?),
            None => None,
        };

        let now = time.now();
        let data = ContractPaymentData::new(premium, frequency, now, Money::ZERO)?;
        let coverage = vehicle
            .original_value()
            .percent(self.config.underwriting.vehicle_coverage_percent);
        let mut contract = SingleVehicleContract::new(
            number.clone(),
            beneficiary_person,
            holder,
            data,
            coverage,
            vehicle,
        )?;

        Self::charge_core(contract.core_mut(), now, &mut self.events);

        self.register_contract(&number, policy_holder, coverage, now);
        self.contracts.push(Contract::SingleVehicle(contract));
        match self.contracts.last() {
            Some(Contract::SingleVehicle(issued)) => Ok(issued),
            _ => unreachable!("just pushed a single vehicle contract"),
        }
    }

    /// issue a travel contract covering a set of natural persons
    pub fn insure_persons(
        &mut self,
        number: &str,
        policy_holder: &str,
        premium: Money,
        frequency: PaymentFrequency,
        insured: &[&str],
        time: &SafeTimeProvider,
    ) -> Result<&TravelContract> {
        let number = ContractNumber::new(number)?;
        self.ensure_number_free(&number)?;
        if !premium.is_positive() {
            return Err(InsuranceError::NonPositivePremium { premium });
        }

        let insured_ids: BTreeSet<&str> = insured.iter().copied().collect();
        let count = insured_ids.len() as i64;
        let annual = frequency.annualize(premium);
        let minimum = self.config.underwriting.travel_min_annual_per_person * count;
        if annual < minimum {
            return Err(InsuranceError::PremiumBelowMinimum { annual, minimum });
        }

        let holder = self.require_person(policy_holder)?;
        let mut persons = Vec::with_capacity(insured_ids.len());
        for id in &insured_ids {
            persons.push(match self.parties.get(*id) {
                Some(person) => person,
                None => {
                    return Err(InsuranceError::UnknownPerson { id: id.to_string() });
                }
            });
        }

        let now = time.now();
        let data = ContractPaymentData::new(premium, frequency, now, Money::ZERO)?;
        let coverage = self.config.underwriting.travel_coverage_per_person * count;
        let mut contract = TravelContract::new(number.clone(), holder, data, coverage, &persons)?;

        Self::charge_core(contract.core_mut(), now, &mut self.events);

        self.register_contract(&number, policy_holder, coverage, now);
        self.contracts.push(Contract::Travel(contract));
        match self.contracts.last() {
            Some(Contract::Travel(issued)) => Ok(issued),
            _ => unreachable!("just pushed a travel contract"),
        }
    }

    /// create an empty master contract for a corporate policy holder; it
    /// carries no payment data, so nothing is charged here
    pub fn create_master_contract(
        &mut self,
        number: &str,
        beneficiary: Option<&str>,
        policy_holder: &str,
        time: &SafeTimeProvider,
    ) -> Result<&MasterVehicleContract> {
        let number = ContractNumber::new(number)?;
        self.ensure_number_free(&number)?;

        let holder = self.require_person(policy_holder)?;
        let beneficiary_person = match beneficiary {
            Some(id) => Some(self.require_person(id)?),
            None => None,
        };
        let contract = MasterVehicleContract::new(number.clone(), beneficiary_person, holder)?;

        self.register_contract(&number, policy_holder, Money::ZERO, time.now());
        self.contracts.push(Contract::Master(contract));
        match self.contracts.last() {
            Some(Contract::Master(created)) => Ok(created),
            _ => unreachable!("just pushed a master contract"),
        }
    }

    /// move a single vehicle contract into a master's child set: both must
    /// be active top-level contracts of this company sharing a policy
    /// holder who has both on record. the four mutations happen only after
    /// every check has passed, so a failure leaves no partial effect
    pub fn move_single_to_master(&mut self, master_number: &str, single_number: &str) -> Result<()> {
        let master_number = ContractNumber::new(master_number)?;
        let single_number = ContractNumber::new(single_number)?;

        let master_idx = self.top_level_index(&master_number)?;
        let single_idx = self.top_level_index(&single_number)?;
        let Some(master) = self.contracts[master_idx].as_master() else {
            return Err(InsuranceError::WrongContractKind {
                number: master_number.to_string(),
            });
        };
        let Some(single) = self.contracts[single_idx].as_single_vehicle() else {
            return Err(InsuranceError::WrongContractKind {
                number: single_number.to_string(),
            });
        };

        if !master.is_active() {
            return Err(InsuranceError::ContractInactive {
                number: master_number.to_string(),
            });
        }
        if !single.is_active() {
            return Err(InsuranceError::ContractInactive {
                number: single_number.to_string(),
            });
        }
        if master.policy_holder() != single.policy_holder() {
            return Err(InsuranceError::PolicyHolderMismatch {
                master: master_number.to_string(),
                single: single_number.to_string(),
            });
        }

        let holder_id = single.policy_holder().to_string();
        let holder = self.require_person(&holder_id)?;
        if !holder.holds_contract(&master_number) {
            return Err(InsuranceError::NotInHolderRecords {
                number: master_number.to_string(),
            });
        }
        if !holder.holds_contract(&single_number) {
            return Err(InsuranceError::NotInHolderRecords {
                number: single_number.to_string(),
            });
        }

        // all checks passed; mutate
        let removed = self.contracts.remove(single_idx);
        let Contract::SingleVehicle(child) = removed else {
            unreachable!("verified the contract kind above");
        };
        if let Some(holder) = self.parties.get_mut(&holder_id) {
            holder.remove_contract(&single_number);
        }
        let master_idx = if master_idx > single_idx {
            master_idx - 1
        } else {
            master_idx
        };
        if let Some(Contract::Master(master)) = self.contracts.get_mut(master_idx) {
            master.add_child(child);
        }
        self.events.emit(Event::ContractTransferred {
            master: master_number,
            single: single_number,
        });
        Ok(())
    }

    /// billing sweep: run the catch-up on every active top-level contract;
    /// masters recurse into every child, active or not, each at its own
    /// cycle
    pub fn charge_premiums(&mut self, time: &SafeTimeProvider) {
        let now = time.now();
        let events = &mut self.events;
        for contract in &mut self.contracts {
            if contract.is_active() {
                Self::charge_contract(contract, now, events);
            }
        }
    }

    fn charge_contract(contract: &mut Contract, now: DateTime<Utc>, events: &mut EventStore) {
        match contract {
            Contract::Master(master) => {
                for child in master.children_mut() {
                    Self::charge_core(child.core_mut(), now, events);
                }
            }
            Contract::SingleVehicle(c) => Self::charge_core(c.core_mut(), now, events),
            Contract::Travel(c) => Self::charge_core(c.core_mut(), now, events),
        }
    }

    /// the catch-up: accrue one premium per due cycle until the next due
    /// time lies strictly after the current time, so arbitrary jumps of
    /// the clock still charge every missed cycle
    fn charge_core(core: &mut ContractCore, now: DateTime<Utc>, events: &mut EventStore) {
        let number = core.number().clone();
        let Some(data) = core.payment_data_mut() else {
            return;
        };
        let mut cycles = 0u32;
        let mut accrued = Money::ZERO;
        while data.next_payment_time() <= now {
            let premium = data.premium();
            let balance = data.outstanding_balance();
            data.set_outstanding_balance(balance + premium);
            data.advance_next_payment_time();
            cycles += 1;
            accrued += premium;
        }
        if cycles > 0 {
            events.emit(Event::PremiumsAccrued {
                number,
                cycles,
                amount: accrued,
                next_due: data.next_payment_time(),
            });
        }
    }

    /// pay against a contract of this company; masters allocate across
    /// their children, leaves (including transferred children) credit
    /// their own ledger
    pub fn pay(&mut self, number: &str, amount: Money, time: &SafeTimeProvider) -> Result<()> {
        let number = ContractNumber::new(number)?;
        let now = time.now();
        let handler = &mut self.handler;
        let events = &mut self.events;

        if let Some(contract) = self.contracts.iter_mut().find(|c| c.number() == &number) {
            return match contract {
                Contract::Master(master) => handler.pay_master(master, amount, now, events),
                Contract::SingleVehicle(single) => {
                    handler.pay_leaf(single.core_mut(), amount, now, events)
                }
                Contract::Travel(travel) => {
                    handler.pay_leaf(travel.core_mut(), amount, now, events)
                }
            };
        }

        // transferred children keep their own ledgers
        for contract in &mut self.contracts {
            if let Contract::Master(master) = contract {
                if let Some(child) = master.child_mut(&number) {
                    return handler.pay_leaf(child.core_mut(), amount, now, events);
                }
            }
        }

        Err(InsuranceError::UnknownContract {
            number: number.to_string(),
        })
    }

    /// settle a travel claim: every affected person receives an equal
    /// integer share of the coverage (a division remainder is not
    /// distributed), then the contract is spent
    pub fn process_travel_claim(&mut self, number: &str, affected: &[&str]) -> Result<()> {
        let number = ContractNumber::new(number)?;
        let affected: BTreeSet<String> = affected.iter().map(|s| s.to_string()).collect();
        if affected.is_empty() {
            return Err(InsuranceError::NoAffectedPersons);
        }

        let idx = self
            .contracts
            .iter()
            .position(|c| c.number() == &number)
            .ok_or_else(|| InsuranceError::UnknownContract {
                number: number.to_string(),
            })?;
        let Contract::Travel(contract) = &self.contracts[idx] else {
            return Err(InsuranceError::WrongContractKind {
                number: number.to_string(),
            });
        };
        for id in &affected {
            if !contract.covers(id) {
                return Err(InsuranceError::PersonNotCovered { id: id.clone() });
            }
        }
        if !contract.is_active() {
            return Err(InsuranceError::ContractInactive {
                number: number.to_string(),
            });
        }
        let payout = contract.coverage() / affected.len() as i64;
        if !payout.is_positive() {
            return Err(InsuranceError::NonPositivePayout { amount: payout });
        }

        for id in &affected {
            let person =
                self.parties
                    .get_mut(id)
                    .ok_or_else(|| InsuranceError::UnknownPerson {
                        id: id.clone(),
                    })?;
            person.payout(payout)?;
            self.events.emit(Event::ClaimPaid {
                number: number.clone(),
                recipient: id.clone(),
                amount: payout,
            });
        }

        // travel cover is single-use
        self.contracts[idx].set_inactive();
        self.events.emit(Event::ContractDeactivated { number });
        Ok(())
    }

    /// settle a vehicle claim: the beneficiary (or the policy holder) is
    /// paid the full coverage regardless of damage size; damage at or
    /// above the total-loss threshold deactivates the contract, anything
    /// below leaves it claimable again
    pub fn process_vehicle_claim(&mut self, number: &str, expected_damages: Money) -> Result<()> {
        let number = ContractNumber::new(number)?;
        if !expected_damages.is_positive() {
            return Err(InsuranceError::NonPositiveDamages {
                damages: expected_damages,
            });
        }

        let location = self.locate_single(&number)?;
        let contract = self.single_at(location);
        if !contract.is_active() {
            return Err(InsuranceError::ContractInactive {
                number: number.to_string(),
            });
        }
        let recipient = contract
            .beneficiary()
            .unwrap_or(contract.policy_holder())
            .to_string();
        let payout = contract.coverage();
        let threshold = contract
            .vehicle()
            .original_value()
            .percent(self.config.claims.total_loss_percent);
        let total_loss = expected_damages >= threshold;

        let person =
            self.parties
                .get_mut(&recipient)
                .ok_or_else(|| InsuranceError::UnknownPerson {
                    id: recipient.clone(),
                })?;
        person.payout(payout)?;
        self.events.emit(Event::ClaimPaid {
            number: number.clone(),
            recipient,
            amount: payout,
        });

        if total_loss {
            self.single_at_mut(location).set_inactive();
            self.events.emit(Event::ContractDeactivated { number });
        }
        Ok(())
    }

    fn ensure_number_free(&self, number: &ContractNumber) -> Result<()> {
        let in_use = self.contracts.iter().any(|c| {
            c.number() == number
                || matches!(c, Contract::Master(m) if m.child(number).is_some())
        });
        if in_use {
            return Err(InsuranceError::DuplicateContractNumber {
                number: number.to_string(),
            });
        }
        Ok(())
    }

    fn require_person(&self, id: &str) -> Result<&Person> {
        self.parties
            .get(id)
            .ok_or_else(|| InsuranceError::UnknownPerson { id: id.to_string() })
    }

    fn register_contract(
        &mut self,
        number: &ContractNumber,
        policy_holder: &str,
        coverage: Money,
        now: DateTime<Utc>,
    ) {
        if let Some(holder) = self.parties.get_mut(policy_holder) {
            holder.add_contract(number.clone());
        }
        self.events.emit(Event::ContractIssued {
            number: number.clone(),
            policy_holder: policy_holder.to_string(),
            coverage,
            timestamp: now,
        });
    }

    fn top_level_index(&self, number: &ContractNumber) -> Result<usize> {
        self.contracts
            .iter()
            .position(|c| c.number() == number)
            .ok_or_else(|| InsuranceError::UnknownContract {
                number: number.to_string(),
            })
    }

    fn locate_single(&self, number: &ContractNumber) -> Result<SingleLocation> {
        if let Some(idx) = self.contracts.iter().position(|c| c.number() == number) {
            return match &self.contracts[idx] {
                Contract::SingleVehicle(_) => Ok(SingleLocation::TopLevel(idx)),
                _ => Err(InsuranceError::WrongContractKind {
                    number: number.to_string(),
                }),
            };
        }
        for (master_idx, contract) in self.contracts.iter().enumerate() {
            if let Contract::Master(master) = contract {
                if let Some(child_idx) =
                    master.children().iter().position(|c| c.number() == number)
                {
                    return Ok(SingleLocation::Child {
                        master: master_idx,
                        child: child_idx,
                    });
                }
            }
        }
        Err(InsuranceError::UnknownContract {
            number: number.to_string(),
        })
    }

    fn single_at(&self, location: SingleLocation) -> &SingleVehicleContract {
        match location {
            SingleLocation::TopLevel(idx) => match &self.contracts[idx] {
                Contract::SingleVehicle(c) => c,
                _ => unreachable!("location points at a single vehicle contract"),
            },
            SingleLocation::Child { master, child } => match &self.contracts[master] {
                Contract::Master(m) => &m.children()[child],
                _ => unreachable!("location points at a master contract"),
            },
        }
    }

    fn single_at_mut(&mut self, location: SingleLocation) -> &mut SingleVehicleContract {
        match location {
            SingleLocation::TopLevel(idx) => match &mut self.contracts[idx] {
                Contract::SingleVehicle(c) => c,
                _ => unreachable!("location points at a single vehicle contract"),
            },
            SingleLocation::Child { master, child } => match &mut self.contracts[master] {
                Contract::Master(m) => &mut m.children_mut()[child],
                _ => unreachable!("location points at a master contract"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use hourglass_rs::TimeSource;
    use proptest::prelude::*;

    const CORP: &str = "12345678";
    const CORP2: &str = "132453";
    const P1: &str = "7201011235";
    const P2: &str = "1001011231";
    const P3: &str = "0402114911";
    const P4: &str = "8452291232";

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(start()))
    }

    fn company() -> InsuranceCompany {
        let mut company = InsuranceCompany::new();
        for id in [CORP, CORP2, P1, P2, P3, P4] {
            company.register_person(Person::new(id).unwrap()).unwrap();
        }
        company
    }

    fn vehicle(value: i64) -> Vehicle {
        Vehicle::new("BA111PZ", Money::new(value)).unwrap()
    }

    fn balance_of(company: &InsuranceCompany, number: &str) -> Money {
        let number = ContractNumber::new(number).unwrap();
        let location = company.locate_single(&number).unwrap();
        company
            .single_at(location)
            .payment_data()
            .unwrap()
            .outstanding_balance()
    }

    fn insure_vehicle(
        company: &mut InsuranceCompany,
        number: &str,
        holder: &str,
        premium: i64,
        frequency: PaymentFrequency,
        value: i64,
        time: &SafeTimeProvider,
    ) {
        company
            .insure_vehicle(
                number,
                None,
                holder,
                Money::new(premium),
                frequency,
                vehicle(value),
                time,
            )
            .unwrap();
    }

    #[test]
    fn test_issuance_charges_the_first_cycle_immediately() {
        let time = test_time();
        let mut company = company();
        insure_vehicle(
            &mut company,
            "c1",
            CORP,
            25,
            PaymentFrequency::Quarterly,
            1_000,
            &time,
        );

        let contract = company.contract("c1").unwrap();
        assert_eq!(contract.coverage(), Money::new(500));
        let data = contract.payment_data().unwrap();
        assert_eq!(data.outstanding_balance(), Money::new(25));
        assert_eq!(
            data.next_payment_time(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );
        assert!(company
            .person(CORP)
            .unwrap()
            .holds_contract(&ContractNumber::new("c1").unwrap()));
    }

    #[test]
    fn test_minimum_annual_premium_enforced() {
        let time = test_time();
        let mut company = company();
        // 20 quarterly is 80 a year, below 2 percent of 4500
        let result = company.insure_vehicle(
            "c1",
            None,
            CORP,
            Money::new(20),
            PaymentFrequency::Quarterly,
            vehicle(4_500),
            &time,
        );
        assert_eq!(
            result.unwrap_err(),
            InsuranceError::PremiumBelowMinimum {
                annual: Money::new(80),
                minimum: Money::new(90),
            }
        );
        assert!(company.contracts().is_empty());

        // exactly at the minimum passes
        insure_vehicle(
            &mut company,
            "c1",
            CORP,
            90,
            PaymentFrequency::Annual,
            4_500,
            &time,
        );
    }

    #[test]
    fn test_contract_numbers_unique_across_kinds() {
        let time = test_time();
        let mut company = company();
        insure_vehicle(&mut company, "x", CORP, 25, PaymentFrequency::Monthly, 1_000, &time);

        let travel = company.insure_persons(
            "x",
            P1,
            Money::new(10),
            PaymentFrequency::Monthly,
            &[P1],
            &time,
        );
        assert!(matches!(
            travel.map(|_| ()),
            Err(InsuranceError::DuplicateContractNumber { .. })
        ));
        assert!(matches!(
            company
                .create_master_contract("x", None, CORP, &time)
                .map(|_| ()),
            Err(InsuranceError::DuplicateContractNumber { .. })
        ));
    }

    #[test]
    fn test_transferred_child_still_blocks_its_number() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        company.move_single_to_master("m1", "c1").unwrap();

        let result = company.insure_vehicle(
            "c1",
            None,
            CORP,
            Money::new(10),
            PaymentFrequency::Monthly,
            vehicle(500),
            &time,
        );
        assert!(matches!(
            result.map(|_| ()),
            Err(InsuranceError::DuplicateContractNumber { .. })
        ));
    }

    #[test]
    fn test_duplicate_person_rejected() {
        let mut company = company();
        assert_eq!(
            company.register_person(Person::new(P1).unwrap()),
            Err(InsuranceError::DuplicatePerson { id: P1.into() })
        );
    }

    #[test]
    fn test_unknown_policy_holder_rejected() {
        let time = test_time();
        let mut company = InsuranceCompany::new();
        let result = company.insure_vehicle(
            "c1",
            None,
            CORP,
            Money::new(25),
            PaymentFrequency::Monthly,
            vehicle(1_000),
            &time,
        );
        assert_eq!(
            result.unwrap_err(),
            InsuranceError::UnknownPerson { id: CORP.into() }
        );
    }

    #[test]
    fn test_billing_sweep_catches_up_missed_cycles() {
        let time = test_time();
        let mut company = company();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);

        // jump to march 31st: the february and march cycles fall due
        time.test_control().unwrap().advance(Duration::days(90));
        company.charge_premiums(&time);

        let data = company.contract("c1").unwrap().payment_data().unwrap();
        assert_eq!(data.outstanding_balance(), Money::new(30));
        assert_eq!(
            data.next_payment_time(),
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
        );

        // a second sweep at the same instant charges nothing
        company.charge_premiums(&time);
        let data = company.contract("c1").unwrap().payment_data().unwrap();
        assert_eq!(data.outstanding_balance(), Money::new(30));
    }

    #[test]
    fn test_sweep_skips_inactive_contracts() {
        let time = test_time();
        let mut company = company();
        company
            .insure_persons(
                "t1",
                P1,
                Money::new(15),
                PaymentFrequency::Annual,
                &[P1, P2, P3],
                &time,
            )
            .unwrap();
        company.process_travel_claim("t1", &[P1]).unwrap();

        time.test_control().unwrap().advance(Duration::days(400));
        company.charge_premiums(&time);

        // still only the issuance charge
        let data = company.contract("t1").unwrap().payment_data().unwrap();
        assert_eq!(data.outstanding_balance(), Money::new(15));
    }

    #[test]
    fn test_master_children_bill_through_the_sweep() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        insure_vehicle(&mut company, "c2", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        company.move_single_to_master("m1", "c1").unwrap();
        company.move_single_to_master("m1", "c2").unwrap();

        // one child deactivated by a total loss; the master stays active
        // through its sibling and the sweep still reaches both
        company.process_vehicle_claim("c2", Money::new(400)).unwrap();
        assert!(company.contract("m1").unwrap().is_active());

        time.test_control().unwrap().advance(Duration::days(31));
        company.charge_premiums(&time);

        assert_eq!(balance_of(&company, "c1"), Money::new(20));
        assert_eq!(balance_of(&company, "c2"), Money::new(20));
    }

    #[test]
    fn test_transfer_moves_the_contract() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);

        company.move_single_to_master("m1", "c1").unwrap();

        assert!(company.contract("c1").is_none());
        let master = company.contract("m1").unwrap().as_master().unwrap();
        assert_eq!(master.children().len(), 1);
        assert_eq!(master.children()[0].number(), "c1");

        let holder = company.person(CORP).unwrap();
        assert!(holder.holds_contract(&ContractNumber::new("m1").unwrap()));
        assert!(!holder.holds_contract(&ContractNumber::new("c1").unwrap()));
        assert!(company.events().iter().any(|e| matches!(
            e,
            Event::ContractTransferred { .. }
        )));
    }

    #[test]
    fn test_failed_transfer_leaves_no_partial_effect() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP2, 10, PaymentFrequency::Monthly, 500, &time);
        insure_vehicle(&mut company, "c2", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        company.process_vehicle_claim("c2", Money::new(400)).unwrap();

        let snapshot = |company: &InsuranceCompany| {
            (
                company.contracts().len(),
                company.person(CORP).unwrap().contracts().to_vec(),
                company.person(CORP2).unwrap().contracts().to_vec(),
            )
        };
        let before = snapshot(&company);

        assert!(matches!(
            company.move_single_to_master("m1", "nope"),
            Err(InsuranceError::UnknownContract { .. })
        ));
        assert!(matches!(
            company.move_single_to_master("m1", "c1"),
            Err(InsuranceError::PolicyHolderMismatch { .. })
        ));
        assert!(matches!(
            company.move_single_to_master("m1", "c2"),
            Err(InsuranceError::ContractInactive { .. })
        ));
        assert!(matches!(
            company.move_single_to_master("c1", "c2"),
            Err(InsuranceError::WrongContractKind { .. })
        ));

        assert_eq!(snapshot(&company), before);
        assert!(company
            .contract("m1")
            .unwrap()
            .as_master()
            .unwrap()
            .children()
            .is_empty());
    }

    #[test]
    fn test_travel_claim_splits_coverage_and_spends_the_contract() {
        let time = test_time();
        let mut company = company();
        // three insured at 10 coverage each
        company
            .insure_persons(
                "t1",
                P1,
                Money::new(15),
                PaymentFrequency::Annual,
                &[P1, P2, P3],
                &time,
            )
            .unwrap();

        company.process_travel_claim("t1", &[P1, P2, P3]).unwrap();

        for id in [P1, P2, P3] {
            assert_eq!(company.person(id).unwrap().paid_out_amount(), Money::new(10));
        }
        assert!(!company.contract("t1").unwrap().is_active());
        assert_eq!(
            company.process_travel_claim("t1", &[P1]),
            Err(InsuranceError::ContractInactive { number: "t1".into() })
        );
    }

    #[test]
    fn test_travel_claim_forfeits_the_division_remainder() {
        let time = test_time();
        let mut company = company();
        // four insured, coverage 40; three affected get 13 each, 1 is kept
        company
            .insure_persons(
                "t1",
                P1,
                Money::new(20),
                PaymentFrequency::Annual,
                &[P1, P2, P3, P4],
                &time,
            )
            .unwrap();

        company.process_travel_claim("t1", &[P1, P2, P3]).unwrap();

        for id in [P1, P2, P3] {
            assert_eq!(company.person(id).unwrap().paid_out_amount(), Money::new(13));
        }
        assert_eq!(company.person(P4).unwrap().paid_out_amount(), Money::ZERO);
    }

    #[test]
    fn test_travel_claim_requires_every_affected_person_covered() {
        let time = test_time();
        let mut company = company();
        company
            .insure_persons(
                "t1",
                P1,
                Money::new(10),
                PaymentFrequency::Annual,
                &[P1, P2],
                &time,
            )
            .unwrap();

        assert_eq!(
            company.process_travel_claim("t1", &[P1, P3]),
            Err(InsuranceError::PersonNotCovered { id: P3.into() })
        );
        // nothing paid, contract still live
        assert_eq!(company.person(P1).unwrap().paid_out_amount(), Money::ZERO);
        assert!(company.contract("t1").unwrap().is_active());

        assert_eq!(
            company.process_travel_claim("t1", &[]),
            Err(InsuranceError::NoAffectedPersons)
        );
        assert_eq!(
            company.process_travel_claim("nope", &[P1]),
            Err(InsuranceError::UnknownContract { number: "nope".into() })
        );
    }

    #[test]
    fn test_travel_claim_rejects_other_contract_kinds() {
        let time = test_time();
        let mut company = company();
        insure_vehicle(&mut company, "c1", CORP, 25, PaymentFrequency::Monthly, 1_000, &time);
        assert_eq!(
            company.process_travel_claim("c1", &[P1]),
            Err(InsuranceError::WrongContractKind { number: "c1".into() })
        );
    }

    #[test]
    fn test_vehicle_claim_pays_the_beneficiary_full_coverage() {
        let time = test_time();
        let mut company = company();
        company
            .insure_vehicle(
                "c1",
                Some(P1),
                CORP,
                Money::new(25),
                PaymentFrequency::Monthly,
                vehicle(1_000),
                &time,
            )
            .unwrap();

        // 690 is below the 700 total-loss threshold
        company.process_vehicle_claim("c1", Money::new(690)).unwrap();
        assert_eq!(company.person(P1).unwrap().paid_out_amount(), Money::new(500));
        assert_eq!(company.person(CORP).unwrap().paid_out_amount(), Money::ZERO);
        assert!(company.contract("c1").unwrap().is_active());

        // below the threshold the contract can be claimed again
        company.process_vehicle_claim("c1", Money::new(700)).unwrap();
        assert_eq!(company.person(P1).unwrap().paid_out_amount(), Money::new(1_000));
        assert!(!company.contract("c1").unwrap().is_active());

        assert_eq!(
            company.process_vehicle_claim("c1", Money::new(100)),
            Err(InsuranceError::ContractInactive { number: "c1".into() })
        );
    }

    #[test]
    fn test_vehicle_claim_defaults_to_the_policy_holder() {
        let time = test_time();
        let mut company = company();
        insure_vehicle(&mut company, "c1", CORP, 25, PaymentFrequency::Monthly, 1_000, &time);

        company.process_vehicle_claim("c1", Money::new(100)).unwrap();
        assert_eq!(company.person(CORP).unwrap().paid_out_amount(), Money::new(500));

        assert_eq!(
            company.process_vehicle_claim("c1", Money::ZERO),
            Err(InsuranceError::NonPositiveDamages {
                damages: Money::ZERO
            })
        );
    }

    #[test]
    fn test_vehicle_claim_reaches_transferred_children() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        company.move_single_to_master("m1", "c1").unwrap();

        // total loss on the only child deactivates it and thus the master
        company.process_vehicle_claim("c1", Money::new(350)).unwrap();
        assert_eq!(company.person(CORP).unwrap().paid_out_amount(), Money::new(250));
        assert!(!company.contract("m1").unwrap().is_active());
    }

    #[test]
    fn test_master_payment_settles_children_with_one_ledger_entry() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        company.move_single_to_master("m1", "c1").unwrap();
        assert_eq!(balance_of(&company, "c1"), Money::new(10));

        // 25 clears the arrears of 10 and prepays the rest
        company.pay("m1", Money::new(25), &time).unwrap();
        assert_eq!(balance_of(&company, "c1"), Money::new(-15));

        let history = company.payment_history("m1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.iter().next().unwrap().amount(), Money::new(25));
        assert!(company.payment_history("c1").is_none());
    }

    #[test]
    fn test_children_accept_direct_payments() {
        let time = test_time();
        let mut company = company();
        company.create_master_contract("m1", None, CORP, &time).unwrap();
        insure_vehicle(&mut company, "c1", CORP, 10, PaymentFrequency::Monthly, 500, &time);
        company.move_single_to_master("m1", "c1").unwrap();

        company.pay("c1", Money::new(10), &time).unwrap();
        assert_eq!(balance_of(&company, "c1"), Money::ZERO);
        assert_eq!(company.payment_history("c1").unwrap().len(), 1);
    }

    #[test]
    fn test_payments_only_on_own_contracts() {
        let time = test_time();
        let mut company_a = company();
        let mut company_b = InsuranceCompany::new();
        company_b.register_person(Person::new(CORP).unwrap()).unwrap();
        insure_vehicle(&mut company_a, "c1", CORP, 25, PaymentFrequency::Monthly, 1_000, &time);

        assert_eq!(
            company_b.pay("c1", Money::new(25), &time),
            Err(InsuranceError::UnknownContract { number: "c1".into() })
        );
    }

    #[test]
    fn test_issuance_emits_events() {
        let time = test_time();
        let mut company = company();
        company.take_events();
        insure_vehicle(&mut company, "c1", CORP, 25, PaymentFrequency::Monthly, 1_000, &time);

        let events = company.take_events();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::PremiumsAccrued { cycles: 1, amount, .. } if *amount == Money::new(25)
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::ContractIssued { .. })));
        assert!(company.events().is_empty());
    }

    #[test]
    fn test_company_state_survives_serialization() {
        let time = test_time();
        let mut company = company();
        insure_vehicle(&mut company, "c1", CORP, 25, PaymentFrequency::Quarterly, 1_000, &time);
        company.pay("c1", Money::new(40), &time).unwrap();
        company.process_vehicle_claim("c1", Money::new(100)).unwrap();

        let json = serde_json::to_string(&company).unwrap();
        let restored: InsuranceCompany = serde_json::from_str(&json).unwrap();

        assert_eq!(balance_of(&restored, "c1"), Money::new(-15));
        assert_eq!(restored.payment_history("c1").unwrap().len(), 1);
        assert_eq!(
            restored.person(CORP).unwrap().paid_out_amount(),
            Money::new(500)
        );
        assert!(restored.events().is_empty());
    }

    fn frequency_strategy() -> impl Strategy<Value = PaymentFrequency> {
        prop_oneof![
            Just(PaymentFrequency::Monthly),
            Just(PaymentFrequency::Quarterly),
            Just(PaymentFrequency::SemiAnnual),
            Just(PaymentFrequency::Annual),
        ]
    }

    proptest! {
        /// after any clock jump a sweep leaves the next due time strictly
        /// in the future but no more than one period ahead, and the
        /// balance is a whole number of premiums
        #[test]
        fn prop_catch_up_invariants(
            premium in 1i64..500,
            frequency in frequency_strategy(),
            days in 0i64..1_500,
        ) {
            let time = test_time();
            let mut company = InsuranceCompany::new();
            company.register_person(Person::new(CORP).unwrap()).unwrap();
            company
                .insure_vehicle(
                    "c1",
                    None,
                    CORP,
                    Money::new(premium),
                    frequency,
                    Vehicle::new("BA111PZ", Money::new(1)).unwrap(),
                    &time,
                )
                .unwrap();

            time.test_control().unwrap().advance(Duration::days(days));
            company.charge_premiums(&time);

            let now = time.now();
            let data = company.contract("c1").unwrap().payment_data().unwrap();
            prop_assert!(data.next_payment_time() > now);
            let previous_due = data
                .next_payment_time()
                .checked_sub_months(chrono::Months::new(frequency.months()))
                .unwrap();
            prop_assert!(previous_due <= now);

            let balance = data.outstanding_balance();
            prop_assert!(balance >= Money::new(premium));
            prop_assert_eq!(balance.as_i64() % premium, 0);
        }
    }
}
