//! Isolated, copy-on-write edit sessions over a ledger snapshot.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::domain::account::{Account, AccountDraft, AccountValues};
use crate::domain::category::{AccountCategory, AccountClass, TransactionCategory, TransactionClass};
use crate::domain::common::{EntityId, Identifiable, Ref};
use crate::domain::market::{AccountPrice, AccountRate, PriceValues, RateValues};
use crate::domain::pattern::{Pattern, PatternDraft, PatternValues};
use crate::domain::tax_year::{TaxRegime, TaxYear, TaxYearInfoClass, TaxYearRange, TaxYearValues};
use crate::domain::transaction::{
    Transaction, TransactionDraft, TransactionInfoClass, TransactionValues,
};
use crate::domain::values::{Money, Rate};
use crate::errors::{LedgerError, ValidationErrors};
use crate::ledger::dataset::{DataSet, EntityList};
use crate::ledger::lifecycle::{recompute, LifecycleFlags, LifecycleMap};
use crate::ledger::recurring::{tax_credit_for, PatternExpander};
use crate::rules::requirements::{transaction_requirement, Requirement, TransactionContext};
use crate::rules::validation::{EntityErrors, Validator};
use crate::tracking::{
    AttributeClass, AttributeValue, ChangeTracked, ExtensionSet, Link, Record, Tracked,
};

/// Entities whose validation errors the session can replace wholesale.
trait CarriesErrors {
    fn has_errors(&self) -> bool;
    fn replace_errors(&mut self, errors: EntityErrors);
    fn collected_errors(&self) -> ValidationErrors;
}

impl<V: Clone + PartialEq> CarriesErrors for Record<V> {
    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    fn replace_errors(&mut self, errors: EntityErrors) {
        let mut all = errors.base;
        all.extend(errors.info);
        *self.errors_mut() = all;
    }

    fn collected_errors(&self) -> ValidationErrors {
        self.errors().clone()
    }
}

impl<V: Clone + PartialEq, C: AttributeClass> CarriesErrors for Tracked<Record<V>, ExtensionSet<C>> {
    fn has_errors(&self) -> bool {
        !self.base().errors().is_empty() || !self.info().errors().is_empty()
    }

    fn replace_errors(&mut self, errors: EntityErrors) {
        *self.base_mut().errors_mut() = errors.base;
        *self.info_mut().errors_mut() = errors.info;
    }

    fn collected_errors(&self) -> ValidationErrors {
        self.errors()
    }
}

type Findings = Vec<(EntityId, EntityErrors)>;

fn needs_write<T: Identifiable + CarriesErrors>(list: &EntityList<T>, found: &Findings) -> bool {
    found.iter().any(|(id, errors)| {
        !errors.is_empty() || list.get(*id).is_some_and(CarriesErrors::has_errors)
    })
}

fn apply_findings<T: Identifiable + CarriesErrors>(list: &mut EntityList<T>, found: Findings) {
    for (id, errors) in found {
        if let Some(entity) = list.get_mut(id) {
            entity.replace_errors(errors);
        }
    }
}

fn collect_errors<T: Identifiable + CarriesErrors>(
    list: &EntityList<T>,
    out: &mut Vec<(EntityId, ValidationErrors)>,
) {
    for entity in list.iter() {
        let errors = entity.collected_errors();
        if !errors.is_empty() {
            out.push((entity.id(), errors));
        }
    }
}

fn base_only(errors: ValidationErrors) -> EntityErrors {
    EntityErrors {
        base: errors,
        info: ValidationErrors::new(),
    }
}

fn unresolved(entity: impl Into<String>, field: &'static str, reference: &Ref) -> LedgerError {
    LedgerError::UnresolvedReference {
        entity: entity.into(),
        field,
        reference: reference.to_string(),
    }
}

/// A private working copy of a ledger. Lists are copied only when first written;
/// dropping the session discards every change.
#[derive(Debug, Clone)]
pub struct EditSession {
    data: DataSet,
    config: LedgerConfig,
    lifecycle: LifecycleMap,
    generation: u64,
}

impl EditSession {
    pub(crate) fn new(data: DataSet, config: LedgerConfig, generation: u64) -> Self {
        let lifecycle = recompute(&data);
        debug!(generation, "edit session opened");
        Self {
            data,
            config,
            lifecycle,
            generation,
        }
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn rebase(&mut self, data: DataSet, generation: u64) {
        self.data = data;
        self.generation = generation;
        self.lifecycle = recompute(&self.data);
    }

    /// Lifecycle flags as of the last [`refresh_lifecycle`](Self::refresh_lifecycle)
    /// or [`validate`](Self::validate).
    pub fn lifecycle(&self) -> &LifecycleMap {
        &self.lifecycle
    }

    pub fn flags(&self, account: EntityId) -> Option<&LifecycleFlags> {
        self.lifecycle.get(&account)
    }

    pub fn refresh_lifecycle(&mut self) -> &LifecycleMap {
        self.lifecycle = recompute(&self.data);
        &self.lifecycle
    }

    pub fn create_account_category(
        &mut self,
        name: &str,
        class: AccountClass,
        parent: Option<Ref>,
    ) -> Result<EntityId, LedgerError> {
        if self.data.account_categories().find_by_name(name).is_some() {
            return Err(LedgerError::DuplicateName {
                entity: "account category".into(),
                name: name.into(),
            });
        }
        let parent = match parent {
            Some(reference) => Some(
                self.data
                    .resolve_account_category(&reference)
                    .filter(|id| {
                        self.data
                            .account_categories()
                            .get(*id)
                            .is_some_and(|c| c.class.is_group())
                    })
                    .ok_or_else(|| unresolved(name, "Parent", &reference))?,
            ),
            None => None,
        };
        let id = self.data.allocate_id();
        self.data.account_categories_mut().push(AccountCategory {
            id,
            name: name.into(),
            class,
            parent,
        });
        Ok(id)
    }

    pub fn create_transaction_category(
        &mut self,
        name: &str,
        class: TransactionClass,
        parent: Option<Ref>,
    ) -> Result<EntityId, LedgerError> {
        if self.data.transaction_categories().find_by_name(name).is_some() {
            return Err(LedgerError::DuplicateName {
                entity: "transaction category".into(),
                name: name.into(),
            });
        }
        let parent = match parent {
            Some(reference) => Some(
                self.data
                    .resolve_transaction_category(&reference)
                    .filter(|id| {
                        self.data
                            .transaction_categories()
                            .get(*id)
                            .is_some_and(|c| c.class.is_group())
                    })
                    .ok_or_else(|| unresolved(name, "Parent", &reference))?,
            ),
            None => None,
        };
        let id = self.data.allocate_id();
        self.data.transaction_categories_mut().push(TransactionCategory {
            id,
            name: name.into(),
            class,
            parent,
        });
        Ok(id)
    }

    /// Resolves a link target to a live account and records its name alongside the id.
    fn resolve_link(
        &self,
        entity: &str,
        field: &'static str,
        reference: &Ref,
    ) -> Result<Link, LedgerError> {
        let id = self
            .data
            .resolve_account(reference)
            .ok_or_else(|| unresolved(entity, field, reference))?;
        let name = self.data.accounts().get(id).map(|a| a.name().to_string());
        Ok(Link { id, name })
    }

    fn resolve_attributes<C: AttributeClass>(
        &self,
        entity: &str,
        info: Vec<(C, AttributeValue)>,
        links: Vec<(C, Ref)>,
    ) -> Result<Vec<(C, AttributeValue)>, LedgerError> {
        let mut resolved = Vec::with_capacity(info.len() + links.len());
        for (class, value) in info {
            let value = match value {
                AttributeValue::Link(link) => AttributeValue::Link(self.resolve_link(
                    entity,
                    class.field(),
                    &Ref::Id(link.id),
                )?),
                other => other,
            };
            resolved.push((class, value));
        }
        for (class, reference) in links {
            let link = self.resolve_link(entity, class.field(), &reference)?;
            resolved.push((class, AttributeValue::Link(link)));
        }
        Ok(resolved)
    }

    pub fn create_account(&mut self, draft: AccountDraft) -> Result<EntityId, LedgerError> {
        let entity = format!("account `{}`", draft.name);
        let category = self
            .data
            .resolve_account_category(&draft.category)
            .ok_or_else(|| unresolved(entity.as_str(), "Category", &draft.category))?;
        let attributes = self.resolve_attributes(&entity, draft.info, draft.links)?;

        let id = self.data.allocate_id();
        let mut account = Account::new(
            id,
            AccountValues {
                name: draft.name,
                category,
                currency: draft.currency,
                closed: draft.closed,
                tax_free: draft.tax_free,
                gross_interest: draft.gross_interest,
                auto_expense: draft.auto_expense,
            },
        );
        for (class, value) in attributes {
            account.info_mut().set(class, Some(value))?;
        }
        self.data.accounts_mut().push(account);
        Ok(id)
    }

    pub fn create_transaction(&mut self, draft: TransactionDraft) -> Result<EntityId, LedgerError> {
        let entity = format!("transaction dated {}", draft.date);
        let debit = self
            .data
            .resolve_account(&draft.debit)
            .ok_or_else(|| unresolved(entity.as_str(), "Debit", &draft.debit))?;
        let credit = self
            .data
            .resolve_account(&draft.credit)
            .ok_or_else(|| unresolved(entity.as_str(), "Credit", &draft.credit))?;
        let category = self
            .data
            .resolve_transaction_category(&draft.category)
            .ok_or_else(|| unresolved(entity.as_str(), "Category", &draft.category))?;
        if let Some(parent) = draft.parent {
            if self.data.transactions().get_live(parent).is_none() {
                return Err(unresolved(entity, "Parent", &Ref::Id(parent)));
            }
        }
        if let Some(template) = draft.template {
            if self.data.patterns().get_live(template).is_none() {
                return Err(unresolved(entity, "Template", &Ref::Id(template)));
            }
        }
        let attributes = self.resolve_attributes(&entity, draft.info, draft.links)?;

        let id = self.data.allocate_id();
        let mut transaction = Transaction::new(
            id,
            TransactionValues {
                date: draft.date,
                debit,
                credit,
                amount: draft.amount,
                category,
                reconciled: draft.reconciled,
                parent: draft.parent,
                template: draft.template,
            },
        );
        for (class, value) in attributes {
            transaction.info_mut().set(class, Some(value))?;
        }
        self.data.transactions_mut().push(transaction);
        Ok(id)
    }

    pub fn create_pattern(&mut self, draft: PatternDraft) -> Result<EntityId, LedgerError> {
        let entity = format!("{} pattern", draft.frequency.label());
        let debit = self
            .data
            .resolve_account(&draft.debit)
            .ok_or_else(|| unresolved(entity.as_str(), "Debit", &draft.debit))?;
        let credit = self
            .data
            .resolve_account(&draft.credit)
            .ok_or_else(|| unresolved(entity.as_str(), "Credit", &draft.credit))?;
        let category = self
            .data
            .resolve_transaction_category(&draft.category)
            .ok_or_else(|| unresolved(entity.as_str(), "Category", &draft.category))?;

        let id = self.data.allocate_id();
        self.data.patterns_mut().push(Pattern::new(
            id,
            PatternValues {
                date: draft.date,
                frequency: draft.frequency,
                debit,
                credit,
                category,
                amount: draft.amount,
            },
        ));
        Ok(id)
    }

    pub fn create_rate(
        &mut self,
        account: impl Into<Ref>,
        rate: Rate,
        bonus: Option<Rate>,
        end_date: Option<NaiveDate>,
    ) -> Result<EntityId, LedgerError> {
        let reference = account.into();
        let account = self
            .data
            .resolve_account(&reference)
            .ok_or_else(|| unresolved("rate", "Account", &reference))?;
        let id = self.data.allocate_id();
        self.data.rates_mut().push(AccountRate::new(
            id,
            RateValues {
                account,
                rate,
                bonus,
                end_date,
            },
        ));
        Ok(id)
    }

    pub fn create_price(
        &mut self,
        account: impl Into<Ref>,
        date: NaiveDate,
        price: Money,
    ) -> Result<EntityId, LedgerError> {
        let reference = account.into();
        let account = self
            .data
            .resolve_account(&reference)
            .ok_or_else(|| unresolved("price", "Account", &reference))?;
        let id = self.data.allocate_id();
        self.data.prices_mut().push(AccountPrice::new(
            id,
            PriceValues {
                account,
                date,
                price,
            },
        ));
        Ok(id)
    }

    pub fn create_tax_year(
        &mut self,
        regime: TaxRegime,
        year_end: NaiveDate,
        info: Vec<(TaxYearInfoClass, AttributeValue)>,
    ) -> Result<EntityId, LedgerError> {
        let id = self.data.allocate_id();
        let mut tax_year = TaxYear::new(id, TaxYearValues { regime, year_end });
        for (class, value) in info {
            tax_year.info_mut().set(class, Some(value))?;
        }
        self.data.tax_years_mut().push(tax_year);
        Ok(id)
    }

    /// Applies `edit` as one undoable step. Returns whether anything changed.
    pub fn update_account(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut Account) -> Result<(), LedgerError>,
    ) -> Result<bool, LedgerError> {
        if !self.data.accounts().contains(id) {
            return Err(LedgerError::NotFound(id));
        }
        let account = self
            .data
            .accounts_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        staged(account, edit)
    }

    pub fn update_transaction(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut Transaction) -> Result<(), LedgerError>,
    ) -> Result<bool, LedgerError> {
        if !self.data.transactions().contains(id) {
            return Err(LedgerError::NotFound(id));
        }
        let transaction = self
            .data
            .transactions_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        staged(transaction, edit)
    }

    pub fn update_pattern(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut Pattern) -> Result<(), LedgerError>,
    ) -> Result<bool, LedgerError> {
        if !self.data.patterns().contains(id) {
            return Err(LedgerError::NotFound(id));
        }
        let pattern = self
            .data
            .patterns_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        staged(pattern, edit)
    }

    pub fn update_tax_year(
        &mut self,
        id: EntityId,
        edit: impl FnOnce(&mut TaxYear) -> Result<(), LedgerError>,
    ) -> Result<bool, LedgerError> {
        if !self.data.tax_years().contains(id) {
            return Err(LedgerError::NotFound(id));
        }
        let tax_year = self
            .data
            .tax_years_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        staged(tax_year, edit)
    }

    /// Marks the account closed. Validation rejects the close while the account is in use.
    pub fn close_account(&mut self, id: EntityId) -> Result<bool, LedgerError> {
        self.update_account(id, |account| {
            account.values_mut().closed = true;
            Ok(())
        })
    }

    /// Reverts the most recent update step.
    pub fn undo_account(&mut self, id: EntityId) -> Result<(), LedgerError> {
        if !self.data.accounts().contains(id) {
            return Err(LedgerError::NotFound(id));
        }
        if let Some(account) = self.data.accounts_mut().get_mut(id) {
            account.pop_history();
        }
        Ok(())
    }

    pub fn undo_transaction(&mut self, id: EntityId) -> Result<(), LedgerError> {
        if !self.data.transactions().contains(id) {
            return Err(LedgerError::NotFound(id));
        }
        if let Some(transaction) = self.data.transactions_mut().get_mut(id) {
            transaction.pop_history();
        }
        Ok(())
    }

    pub fn delete_account(&mut self, id: EntityId) -> Result<(), LedgerError> {
        let account = self
            .data
            .accounts_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        account.set_deleted(true);
        Ok(())
    }

    pub fn delete_transaction(&mut self, id: EntityId) -> Result<(), LedgerError> {
        let transaction = self
            .data
            .transactions_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        transaction.set_deleted(true);
        Ok(())
    }

    pub fn delete_pattern(&mut self, id: EntityId) -> Result<(), LedgerError> {
        let pattern = self
            .data
            .patterns_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        pattern.set_deleted(true);
        Ok(())
    }

    pub fn delete_rate(&mut self, id: EntityId) -> Result<(), LedgerError> {
        let rate = self
            .data
            .rates_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        rate.set_deleted(true);
        Ok(())
    }

    pub fn delete_price(&mut self, id: EntityId) -> Result<(), LedgerError> {
        let price = self
            .data
            .prices_mut()
            .get_mut(id)
            .ok_or(LedgerError::NotFound(id))?;
        price.set_deleted(true);
        Ok(())
    }

    /// Recomputes lifecycle flags, then validates every entity and stores the
    /// findings on each. Returns the total number of errors.
    pub fn validate(&mut self) -> usize {
        let lifecycle = recompute(&self.data);
        let validator = Validator::new(&self.data, &lifecycle, &self.config);

        let accounts: Findings = self
            .data
            .accounts()
            .iter()
            .map(|account| (account.id(), validator.account(account)))
            .collect();
        let transactions: Findings = self
            .data
            .transactions()
            .iter()
            .map(|transaction| (transaction.id(), validator.transaction(transaction)))
            .collect();
        let patterns: Findings = self
            .data
            .patterns()
            .iter()
            .map(|pattern| (pattern.id(), base_only(validator.pattern(pattern))))
            .collect();
        let rates: Findings = self
            .data
            .rates()
            .iter()
            .map(|rate| (rate.id(), base_only(validator.rate(rate))))
            .collect();
        let prices: Findings = self
            .data
            .prices()
            .iter()
            .map(|price| (price.id(), base_only(validator.price(price))))
            .collect();
        let tax_years: Findings = self
            .data
            .tax_years()
            .iter()
            .map(|tax_year| (tax_year.id(), validator.tax_year(tax_year)))
            .collect();

        let total: usize = [&accounts, &transactions, &patterns, &rates, &prices, &tax_years]
            .iter()
            .flat_map(|found| found.iter())
            .map(|(_, errors)| errors.len())
            .sum();

        if needs_write(self.data.accounts(), &accounts) {
            apply_findings(self.data.accounts_mut(), accounts);
        }
        if needs_write(self.data.transactions(), &transactions) {
            apply_findings(self.data.transactions_mut(), transactions);
        }
        if needs_write(self.data.patterns(), &patterns) {
            apply_findings(self.data.patterns_mut(), patterns);
        }
        if needs_write(self.data.rates(), &rates) {
            apply_findings(self.data.rates_mut(), rates);
        }
        if needs_write(self.data.prices(), &prices) {
            apply_findings(self.data.prices_mut(), prices);
        }
        if needs_write(self.data.tax_years(), &tax_years) {
            apply_findings(self.data.tax_years_mut(), tax_years);
        }

        self.lifecycle = lifecycle;
        debug!(errors = total, "session validated");
        total
    }

    /// Every entity currently carrying validation errors.
    pub fn errors(&self) -> Vec<(EntityId, ValidationErrors)> {
        let mut out = Vec::new();
        collect_errors(self.data.accounts(), &mut out);
        collect_errors(self.data.transactions(), &mut out);
        collect_errors(self.data.patterns(), &mut out);
        collect_errors(self.data.rates(), &mut out);
        collect_errors(self.data.prices(), &mut out);
        collect_errors(self.data.tax_years(), &mut out);
        out
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Drafts for every live pattern inside `year`, in pattern order.
    pub fn expand_patterns(&self, year: TaxYearRange) -> Result<Vec<TransactionDraft>, LedgerError> {
        let window = self.config.reference_window()?;
        let mut drafts = Vec::new();
        for pattern in self.data.patterns().live() {
            let maturity = self
                .data
                .accounts()
                .get(pattern.values().debit)
                .and_then(|account| account.maturity());
            drafts.extend(PatternExpander::new(pattern, window, maturity).expand(year));
        }
        debug!(patterns = self.data.patterns().len(), drafts = drafts.len(), "patterns expanded");
        Ok(drafts)
    }

    /// Expands every live pattern into `tax_year` and admits the resulting
    /// transactions, seeding tax credits where one is required. Nothing is admitted
    /// when any draft fails.
    pub fn materialize_patterns(&mut self, tax_year: EntityId) -> Result<Vec<EntityId>, LedgerError> {
        let year = self
            .data
            .tax_years()
            .get_live(tax_year)
            .cloned()
            .ok_or(LedgerError::NotFound(tax_year))?;
        let drafts = self.expand_patterns(year.range())?;
        let mut created = Vec::with_capacity(drafts.len());
        for mut draft in drafts {
            self.seed_tax_credit(&mut draft, &year);
            match self.create_transaction(draft) {
                Ok(id) => created.push(id),
                Err(err) => {
                    if !created.is_empty() {
                        self.data
                            .transactions_mut()
                            .retain(|transaction| !created.contains(&transaction.id()));
                    }
                    debug!(rolled_back = created.len(), "pattern materialization failed");
                    return Err(err);
                }
            }
        }
        Ok(created)
    }

    fn seed_tax_credit(&self, draft: &mut TransactionDraft, tax_year: &TaxYear) {
        if draft.info_value(TransactionInfoClass::TaxCredit).is_some() {
            return;
        }
        let debit = self
            .data
            .resolve_account(&draft.debit)
            .and_then(|id| self.data.account_view(id));
        let credit = self
            .data
            .resolve_account(&draft.credit)
            .and_then(|id| self.data.account_view(id));
        let class = self
            .data
            .resolve_transaction_category(&draft.category)
            .and_then(|id| self.data.transaction_class(id));
        let (Some(debit), Some(credit), Some(class)) = (debit, credit, class) else {
            return;
        };
        let ctx = TransactionContext {
            class,
            debit: &debit,
            credit: &credit,
            amount: draft.amount,
        };
        if transaction_requirement(TransactionInfoClass::TaxCredit, &ctx) != Requirement::MustExist {
            return;
        }
        let Some(rate) = tax_year.credit_rate(class) else {
            return;
        };
        if let Some(credit) = tax_credit_for(draft.amount, rate) {
            draft
                .info
                .push((TransactionInfoClass::TaxCredit, AttributeValue::Money(credit)));
        }
    }
}

fn staged<T: ChangeTracked>(
    entity: &mut T,
    edit: impl FnOnce(&mut T) -> Result<(), LedgerError>,
) -> Result<bool, LedgerError> {
    entity.push_history();
    if let Err(err) = edit(entity) {
        entity.pop_history();
        return Err(err);
    }
    Ok(entity.check_for_history())
}
