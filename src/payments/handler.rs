use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::contracts::{ContractCore, MasterVehicleContract, SingleVehicleContract};
use crate::errors::{InsuranceError, Result};
use crate::events::{Event, EventStore};
use crate::money::Money;
use crate::types::ContractNumber;

use super::PaymentInstance;

/// validates payment requests, allocates funds across contracts, and
/// keeps the per-contract payment ledger
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PaymentHandler {
    history: HashMap<ContractNumber, BTreeSet<PaymentInstance>>,
    next_sequence: u64,
}

impl PaymentHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// full payment ledger, keyed by contract number
    pub fn payment_history(&self) -> &HashMap<ContractNumber, BTreeSet<PaymentInstance>> {
        &self.history
    }

    /// time-ordered payments recorded against one contract
    pub fn history_for(&self, number: &ContractNumber) -> Option<&BTreeSet<PaymentInstance>> {
        self.history.get(number)
    }

    /// pay on a leaf contract: the outstanding balance decreases by the
    /// full amount unconditionally and may go negative (a credit carried
    /// forward), and one ledger entry is recorded
    pub(crate) fn pay_leaf(
        &mut self,
        core: &mut ContractCore,
        amount: Money,
        now: DateTime<Utc>,
        events: &mut EventStore,
    ) -> Result<()> {
        if !amount.is_positive() {
            return Err(InsuranceError::NonPositiveAmount { amount });
        }
        if !core.is_active() {
            return Err(InsuranceError::ContractInactive {
                number: core.number().to_string(),
            });
        }
        let number = core.number().clone();
        let data = core
            .payment_data_mut()
            .ok_or_else(|| InsuranceError::WrongContractKind {
                number: number.to_string(),
            })?;
        data.decrease_outstanding_balance(amount);

        self.record_payment(&number, amount, now)?;
        events.emit(Event::PaymentReceived {
            number,
            amount,
            timestamp: now,
        });
        Ok(())
    }

    /// pay on a master contract: settle the arrears of its active children
    /// in insertion order, then turn whatever remains into prepayments,
    /// and record a single ledger entry for the original total
    pub(crate) fn pay_master(
        &mut self,
        master: &mut MasterVehicleContract,
        amount: Money,
        now: DateTime<Utc>,
        events: &mut EventStore,
    ) -> Result<()> {
        if !amount.is_positive() {
            return Err(InsuranceError::NonPositiveAmount { amount });
        }
        if !master.is_active() {
            return Err(InsuranceError::ContractInactive {
                number: master.number().to_string(),
            });
        }
        if master.children().is_empty() {
            return Err(InsuranceError::NoChildContracts {
                number: master.number().to_string(),
            });
        }

        let original = amount;
        let remaining = Self::settle_arrears(master.children_mut(), amount);
        Self::create_prepayments(master.children_mut(), remaining);

        let number = master.number().clone();
        self.record_payment(&number, original, now)?;
        events.emit(Event::PaymentReceived {
            number,
            amount: original,
            timestamp: now,
        });
        Ok(())
    }

    /// phase one: walk active children in order and pay down positive
    /// balances, partially on the last one if funds run out
    fn settle_arrears(children: &mut [SingleVehicleContract], mut amount: Money) -> Money {
        for child in children.iter_mut() {
            if !child.is_active() {
                continue;
            }
            let Some(data) = child.core_mut().payment_data_mut() else {
                continue;
            };
            let balance = data.outstanding_balance();
            if balance.is_positive() {
                if amount >= balance {
                    amount -= balance;
                    data.set_outstanding_balance(Money::ZERO);
                } else {
                    data.decrease_outstanding_balance(amount);
                    amount = Money::ZERO;
                    break;
                }
            }
        }
        amount
    }

    /// phase two: sweep active children in repeated passes, deducting one
    /// full premium per child while funds allow; a remainder goes to the
    /// current child as a partial deduction, and the sweep stops once a
    /// full pass makes no payment
    fn create_prepayments(children: &mut [SingleVehicleContract], mut amount: Money) {
        while amount.is_positive() {
            let mut any_payment_made = false;

            for child in children.iter_mut() {
                if !child.is_active() {
                    continue;
                }
                let Some(data) = child.core_mut().payment_data_mut() else {
                    continue;
                };
                let premium = data.premium();
                if amount >= premium {
                    data.decrease_outstanding_balance(premium);
                    amount -= premium;
                    any_payment_made = true;
                } else if amount.is_positive() {
                    data.decrease_outstanding_balance(amount);
                    amount = Money::ZERO;
                    any_payment_made = true;
                    break;
                }
            }

            if !any_payment_made {
                break;
            }
        }
    }

    fn record_payment(
        &mut self,
        number: &ContractNumber,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let instance = PaymentInstance::new(now, amount, self.next_sequence)?;
        self.next_sequence += 1;
        self.history
            .entry(number.clone())
            .or_default()
            .insert(instance);
        Ok(())
    }
}
