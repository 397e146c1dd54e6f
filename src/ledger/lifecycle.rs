//! Derived per-account lifecycle flags, rebuilt from a full scan of a [`DataSet`].

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::account::AccountInfoClass;
use crate::domain::common::{EntityId, Identifiable};
use crate::domain::values::Money;
use crate::ledger::dataset::DataSet;

/// A transaction that touched an account, ordered by date then id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TouchEvent {
    pub date: NaiveDate,
    pub transaction: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleFlags {
    pub closeable: bool,
    /// A loan account names this account as its parent.
    pub has_loans: bool,
    pub has_rates: bool,
    pub has_prices: bool,
    /// Owns at least one pattern.
    pub has_patterns: bool,
    /// Partner of someone else's pattern.
    pub is_patterned: bool,
    pub is_parent: bool,
    pub is_aliased_to: bool,
    pub is_holding: bool,
    pub earliest: Option<TouchEvent>,
    pub latest: Option<TouchEvent>,
    /// Earliest recorded price.
    pub initial_price: Option<(NaiveDate, Money)>,
    pub close_date: Option<NaiveDate>,
}

impl Default for LifecycleFlags {
    fn default() -> Self {
        Self {
            closeable: true,
            has_loans: false,
            has_rates: false,
            has_prices: false,
            has_patterns: false,
            is_patterned: false,
            is_parent: false,
            is_aliased_to: false,
            is_holding: false,
            earliest: None,
            latest: None,
            initial_price: None,
            close_date: None,
        }
    }
}

impl LifecycleFlags {
    /// Whether anything references the account at all.
    pub fn is_touched(&self) -> bool {
        self.earliest.is_some()
            || self.has_loans
            || self.has_rates
            || self.has_prices
            || self.has_patterns
            || self.is_patterned
            || self.is_parent
            || self.is_aliased_to
            || self.is_holding
    }

    fn touch(&mut self, event: TouchEvent) {
        if self.earliest.map_or(true, |earliest| event < earliest) {
            self.earliest = Some(event);
        }
        if self.latest.map_or(true, |latest| event > latest) {
            self.latest = Some(event);
        }
    }
}

pub type LifecycleMap = BTreeMap<EntityId, LifecycleFlags>;

/// Rebuilds lifecycle flags for every account. Only live entities touch; a deleted
/// account can still be touched, which is what blocks its deletion. Running it twice
/// over the same data yields the same map.
pub fn recompute(data: &DataSet) -> LifecycleMap {
    let mut flags: LifecycleMap = data
        .accounts()
        .iter()
        .map(|account| (account.id(), LifecycleFlags::default()))
        .collect();

    for rate in data.rates().live() {
        if let Some(entry) = flags.get_mut(&rate.values().account) {
            entry.has_rates = true;
        }
    }

    for price in data.prices().live() {
        let values = price.values();
        if let Some(entry) = flags.get_mut(&values.account) {
            entry.has_prices = true;
            if entry
                .initial_price
                .map_or(true, |(date, _)| values.date < date)
            {
                entry.initial_price = Some((values.date, values.price));
            }
        }
    }

    for pattern in data.patterns().live() {
        let values = pattern.values();
        if let Some(entry) = flags.get_mut(&values.debit) {
            entry.has_patterns = true;
            entry.closeable = false;
        }
        if let Some(entry) = flags.get_mut(&values.credit) {
            entry.is_patterned = true;
            entry.closeable = false;
        }
    }

    for transaction in data.transactions().live() {
        let event = TouchEvent {
            date: transaction.date(),
            transaction: transaction.id(),
        };
        touch_with_parents(data, &mut flags, transaction.debit(), event);
        touch_with_parents(data, &mut flags, transaction.credit(), event);
        if let Some(third_party) = transaction.third_party() {
            touch_with_parents(data, &mut flags, third_party, event);
        }
    }

    for account in data.accounts().live() {
        let is_loan = data
            .account_class(account.id())
            .is_some_and(|class| class.is_loan());
        for class in AccountInfoClass::LINKS {
            let Some(target) = account.info().link_id(class) else {
                continue;
            };
            let Some(entry) = flags.get_mut(&target) else {
                continue;
            };
            match class {
                AccountInfoClass::Parent => {
                    entry.is_parent = true;
                    if is_loan {
                        entry.has_loans = true;
                    }
                }
                AccountInfoClass::Alias => entry.is_aliased_to = true,
                AccountInfoClass::Holding => entry.is_holding = true,
                _ => {}
            }
            if !account.is_closed() {
                entry.closeable = false;
            }
        }
    }

    for account in data.accounts().live() {
        if account.is_closed() {
            if let Some(entry) = flags.get_mut(&account.id()) {
                entry.close_date = entry.latest.map(|event| event.date);
            }
        }
    }

    debug!(accounts = flags.len(), "lifecycle flags recomputed");
    flags
}

/// Touches an account and every ancestor reachable through its parent links.
fn touch_with_parents(
    data: &DataSet,
    flags: &mut LifecycleMap,
    account: EntityId,
    event: TouchEvent,
) {
    let mut visited = HashSet::new();
    let mut current = Some(account);
    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let Some(entry) = flags.get_mut(&id) else {
            break;
        };
        entry.touch(event);
        current = data.accounts().get(id).and_then(|a| a.parent());
    }
}
