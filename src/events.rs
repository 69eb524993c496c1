use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{ContractNumber, LegalForm};

/// all events emitted by company operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PersonRegistered {
        id: String,
        legal_form: LegalForm,
    },
    ContractIssued {
        number: ContractNumber,
        policy_holder: String,
        coverage: Money,
        timestamp: DateTime<Utc>,
    },
    /// one event per catch-up run that accrued at least one billing cycle
    PremiumsAccrued {
        number: ContractNumber,
        cycles: u32,
        amount: Money,
        next_due: DateTime<Utc>,
    },
    PaymentReceived {
        number: ContractNumber,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    ClaimPaid {
        number: ContractNumber,
        recipient: String,
        amount: Money,
    },
    ContractDeactivated {
        number: ContractNumber,
    },
    ContractTransferred {
        master: ContractNumber,
        single: ContractNumber,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
