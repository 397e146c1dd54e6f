//! Canonical collection of every entity list, shared copy-on-write between sessions.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::domain::account::{Account, AccountView};
use crate::domain::category::{AccountCategory, AccountClass, TransactionCategory, TransactionClass};
use crate::domain::common::{Deletable, EntityId, Identifiable, NamedEntity, Ref};
use crate::domain::market::{AccountPrice, AccountRate};
use crate::domain::pattern::Pattern;
use crate::domain::tax_year::TaxYear;
use crate::domain::transaction::Transaction;
use crate::tracking::{AttributeClass, ExtensionSet, Record, Tracked};

/// Entities that fold their staged changes into the canonical snapshot.
pub trait Committable: Identifiable {
    fn commit(&mut self);

    /// Whether the entity is dropped from its list on commit.
    fn is_removed(&self) -> bool;
}

impl<V: Clone + PartialEq> Committable for Record<V> {
    fn commit(&mut self) {
        Record::commit(self);
    }

    fn is_removed(&self) -> bool {
        self.is_deleted()
    }
}

impl<V: Clone + PartialEq, C: AttributeClass> Committable for Tracked<Record<V>, ExtensionSet<C>> {
    fn commit(&mut self) {
        Tracked::commit(self);
    }

    fn is_removed(&self) -> bool {
        self.is_deleted()
    }
}

impl Committable for AccountCategory {
    fn commit(&mut self) {}

    fn is_removed(&self) -> bool {
        false
    }
}

impl Committable for TransactionCategory {
    fn commit(&mut self) {}

    fn is_removed(&self) -> bool {
        false
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.values().name
    }
}

/// Ordered list of entities with lookup by identity.
#[derive(Debug, Clone)]
pub struct EntityList<T> {
    items: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T> Default for EntityList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Identifiable> EntityList<T> {
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.index.get(&id).map(|&position| &self.items[position])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.index
            .get(&id)
            .copied()
            .map(move |position| &mut self.items[position])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn push(&mut self, item: T) {
        self.index.insert(item.id(), self.items.len());
        self.items.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.id(), position))
            .collect();
    }
}

impl<T: Identifiable + Deletable> EntityList<T> {
    pub fn live(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| !item.is_deleted())
    }

    pub fn get_live(&self, id: EntityId) -> Option<&T> {
        self.get(id).filter(|item| !item.is_deleted())
    }
}

impl<T: Identifiable + NamedEntity> EntityList<T> {
    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.name() == name)
    }
}

impl<T: Committable> EntityList<T> {
    fn commit(&mut self) {
        self.items.retain(|item| !item.is_removed());
        for item in &mut self.items {
            item.commit();
        }
        self.reindex();
    }
}

/// Every entity list of one ledger. Cloning is cheap; lists are copied on first write.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    account_categories: Rc<EntityList<AccountCategory>>,
    transaction_categories: Rc<EntityList<TransactionCategory>>,
    accounts: Rc<EntityList<Account>>,
    transactions: Rc<EntityList<Transaction>>,
    patterns: Rc<EntityList<Pattern>>,
    rates: Rc<EntityList<AccountRate>>,
    prices: Rc<EntityList<AccountPrice>>,
    tax_years: Rc<EntityList<TaxYear>>,
    next_id: u32,
}

fn write<'a, T: Clone>(
    list: &'a mut Rc<EntityList<T>>,
    name: &'static str,
) -> &'a mut EntityList<T> {
    if Rc::strong_count(list) > 1 {
        debug!(list = name, "copying shared list on first write");
    }
    Rc::make_mut(list)
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn account_categories(&self) -> &EntityList<AccountCategory> {
        &self.account_categories
    }

    pub fn transaction_categories(&self) -> &EntityList<TransactionCategory> {
        &self.transaction_categories
    }

    pub fn accounts(&self) -> &EntityList<Account> {
        &self.accounts
    }

    pub fn transactions(&self) -> &EntityList<Transaction> {
        &self.transactions
    }

    pub fn patterns(&self) -> &EntityList<Pattern> {
        &self.patterns
    }

    pub fn rates(&self) -> &EntityList<AccountRate> {
        &self.rates
    }

    pub fn prices(&self) -> &EntityList<AccountPrice> {
        &self.prices
    }

    pub fn tax_years(&self) -> &EntityList<TaxYear> {
        &self.tax_years
    }

    pub(crate) fn account_categories_mut(&mut self) -> &mut EntityList<AccountCategory> {
        write(&mut self.account_categories, "account_categories")
    }

    pub(crate) fn transaction_categories_mut(&mut self) -> &mut EntityList<TransactionCategory> {
        write(&mut self.transaction_categories, "transaction_categories")
    }

    pub(crate) fn accounts_mut(&mut self) -> &mut EntityList<Account> {
        write(&mut self.accounts, "accounts")
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut EntityList<Transaction> {
        write(&mut self.transactions, "transactions")
    }

    pub(crate) fn patterns_mut(&mut self) -> &mut EntityList<Pattern> {
        write(&mut self.patterns, "patterns")
    }

    pub(crate) fn rates_mut(&mut self) -> &mut EntityList<AccountRate> {
        write(&mut self.rates, "rates")
    }

    pub(crate) fn prices_mut(&mut self) -> &mut EntityList<AccountPrice> {
        write(&mut self.prices, "prices")
    }

    pub(crate) fn tax_years_mut(&mut self) -> &mut EntityList<TaxYear> {
        write(&mut self.tax_years, "tax_years")
    }

    /// True when both data sets still share the same storage for every list.
    pub fn shares_storage_with(&self, other: &DataSet) -> bool {
        Rc::ptr_eq(&self.account_categories, &other.account_categories)
            && Rc::ptr_eq(&self.transaction_categories, &other.transaction_categories)
            && Rc::ptr_eq(&self.accounts, &other.accounts)
            && Rc::ptr_eq(&self.transactions, &other.transactions)
            && Rc::ptr_eq(&self.patterns, &other.patterns)
            && Rc::ptr_eq(&self.rates, &other.rates)
            && Rc::ptr_eq(&self.prices, &other.prices)
            && Rc::ptr_eq(&self.tax_years, &other.tax_years)
    }

    pub fn account_class(&self, account: EntityId) -> Option<AccountClass> {
        let category = self.accounts.get(account)?.values().category;
        self.account_categories.get(category).map(|c| c.class)
    }

    pub fn transaction_class(&self, category: EntityId) -> Option<TransactionClass> {
        self.transaction_categories.get(category).map(|c| c.class)
    }

    /// Rule-table view of a live account, with its category class resolved.
    pub fn account_view(&self, account: EntityId) -> Option<AccountView> {
        let entity = self.accounts.get_live(account)?;
        let class = self.account_class(account)?;
        Some(AccountView::of(entity, class))
    }

    /// Resolves a reference to a live account by id or by name.
    pub fn resolve_account(&self, reference: &Ref) -> Option<EntityId> {
        match reference {
            Ref::Id(id) => self.accounts.get_live(*id).map(Identifiable::id),
            Ref::Name(name) => self
                .accounts
                .live()
                .find(|account| account.name() == name)
                .map(Identifiable::id),
        }
    }

    pub fn resolve_account_category(&self, reference: &Ref) -> Option<EntityId> {
        match reference {
            Ref::Id(id) => self.account_categories.get(*id).map(Identifiable::id),
            Ref::Name(name) => self
                .account_categories
                .find_by_name(name)
                .map(Identifiable::id),
        }
    }

    pub fn resolve_transaction_category(&self, reference: &Ref) -> Option<EntityId> {
        match reference {
            Ref::Id(id) => self.transaction_categories.get(*id).map(Identifiable::id),
            Ref::Name(name) => self
                .transaction_categories
                .find_by_name(name)
                .map(Identifiable::id),
        }
    }

    /// Folds staged changes into committed state and drops deleted entities. Lists
    /// still shared with `base` were never written and are left alone.
    pub(crate) fn commit_against(&mut self, base: &DataSet) {
        commit_list(&mut self.account_categories, &base.account_categories);
        commit_list(&mut self.transaction_categories, &base.transaction_categories);
        commit_list(&mut self.accounts, &base.accounts);
        commit_list(&mut self.transactions, &base.transactions);
        commit_list(&mut self.patterns, &base.patterns);
        commit_list(&mut self.rates, &base.rates);
        commit_list(&mut self.prices, &base.prices);
        commit_list(&mut self.tax_years, &base.tax_years);
    }
}

fn commit_list<T: Committable + Clone>(list: &mut Rc<EntityList<T>>, base: &Rc<EntityList<T>>) {
    if !Rc::ptr_eq(list, base) {
        Rc::make_mut(list).commit();
    }
}
