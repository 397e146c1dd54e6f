//! Validators that apply the rule tables and per-field checks to whole entities.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::LedgerConfig;
use crate::domain::account::{Account, AccountInfoClass, AccountView};
use crate::domain::category::{AccountClass, TransactionClass};
use crate::domain::common::{Deletable, EntityId, Identifiable};
use crate::domain::dates::is_end_of_month;
use crate::domain::market::{AccountPrice, AccountRate};
use crate::domain::pattern::{Frequency, Pattern};
use crate::domain::tax_year::{TaxYear, TaxYearInfoClass};
use crate::domain::transaction::{Transaction, TransactionInfoClass};
use crate::errors::{ErrorKind, ValidationErrors};
use crate::ledger::dataset::DataSet;
use crate::ledger::lifecycle::LifecycleMap;
use crate::rules::compatibility::is_valid_event;
use crate::rules::requirements::{
    account_requirement, transaction_requirement, Requirement, TransactionContext,
};
use crate::tracking::{AttributeClass, AttributeValue, ExtensionSet};

/// Errors for an entity split into base values and extension attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityErrors {
    pub base: ValidationErrors,
    pub info: ValidationErrors,
}

impl EntityErrors {
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.info.is_empty()
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.info.len()
    }
}

/// Applies a requirement table to every attribute class of `set`.
pub fn check_requirements<C: AttributeClass>(
    set: &ExtensionSet<C>,
    requirement: impl Fn(C) -> Requirement,
    errors: &mut ValidationErrors,
) {
    for &class in C::ALL {
        match (requirement(class), set.contains(class)) {
            (Requirement::MustExist, false) => errors.missing(class.field()),
            (Requirement::NotAllowed, true) => errors.must_not_exist(class.field()),
            _ => {}
        }
    }
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    text: &str,
    limit: usize,
) {
    if text.chars().count() > limit {
        errors.add(
            field,
            ErrorKind::Structural,
            format!("longer than {} characters", limit),
        );
    }
}

/// Read-only validation over one data set and its freshly computed lifecycle flags.
pub struct Validator<'a> {
    data: &'a DataSet,
    lifecycle: &'a LifecycleMap,
    config: &'a LedgerConfig,
}

impl<'a> Validator<'a> {
    pub fn new(data: &'a DataSet, lifecycle: &'a LifecycleMap, config: &'a LedgerConfig) -> Self {
        Self {
            data,
            lifecycle,
            config,
        }
    }

    pub fn account(&self, account: &Account) -> EntityErrors {
        let mut errors = EntityErrors::default();
        let flags = self.lifecycle.get(&account.id());

        if account.is_deleted() {
            if flags.is_some_and(|flags| flags.is_touched()) {
                errors
                    .base
                    .add("Deleted", ErrorKind::State, "account is still referenced");
            }
            return errors;
        }

        let values = account.values();
        let base = &mut errors.base;

        let name = values.name.trim();
        if name.is_empty() {
            base.missing("Name");
        } else {
            check_length(base, "Name", name, self.config.name_max_len);
            let duplicate = self
                .data
                .accounts()
                .live()
                .any(|other| other.id() != account.id() && other.name() == values.name);
            if duplicate {
                base.add("Name", ErrorKind::Structural, "duplicate name");
            }
        }

        if !is_currency_code(&values.currency) {
            base.add("Currency", ErrorKind::Structural, "invalid currency code");
        }

        let Some(category) = self.data.account_categories().get(values.category) else {
            base.add("Category", ErrorKind::Referential, "unknown category");
            return errors;
        };
        let class = category.class;
        if class.is_group() {
            base.add("Category", ErrorKind::Semantic, "must be a leaf category");
            return errors;
        }
        if class.is_singular() {
            let another = self.data.accounts().live().any(|other| {
                other.id() != account.id() && self.data.account_class(other.id()) == Some(class)
            });
            if another {
                base.add(
                    "Category",
                    ErrorKind::Structural,
                    "only one account of this class is allowed",
                );
            }
        }
        if values.tax_free && !class.can_tax_free() {
            base.add("TaxFree", ErrorKind::Semantic, "not available for this account class");
        }
        if values.gross_interest && !class.can_gross_interest() {
            base.add(
                "GrossInterest",
                ErrorKind::Semantic,
                "not available for this account class",
            );
        }
        if values.auto_expense && class != AccountClass::Cash {
            base.add("AutoExpense", ErrorKind::Semantic, "only cash accounts may auto-expense");
        }
        if values.closed && flags.is_some_and(|flags| !flags.closeable) {
            base.add("Closed", ErrorKind::State, "account cannot be closed while in use");
        }

        let view = AccountView::of(account, class);
        check_requirements(
            account.info(),
            |info_class| account_requirement(info_class, &view),
            &mut errors.info,
        );
        for (info_class, value) in account.info().iter() {
            self.account_attribute(account, class, info_class, value, &mut errors.info);
        }
        errors
    }

    fn account_attribute(
        &self,
        account: &Account,
        class: AccountClass,
        info_class: AccountInfoClass,
        value: &AttributeValue,
        errors: &mut ValidationErrors,
    ) {
        let field = info_class.field();
        match (info_class, value) {
            (AccountInfoClass::Parent, AttributeValue::Link(link)) => {
                match self.linked_view(account, link.id, field, errors) {
                    Some(target) if !target.class.is_payee() => {
                        errors.add(field, ErrorKind::Semantic, "parent must be a payee");
                    }
                    _ => {}
                }
            }
            (AccountInfoClass::Alias, AttributeValue::Link(link)) => {
                if let Some(target) = self.linked_view(account, link.id, field, errors) {
                    if target.class != class {
                        errors.add(field, ErrorKind::Semantic, "alias must share the account class");
                    }
                    let chained = self
                        .data
                        .accounts()
                        .get(link.id)
                        .and_then(|target| target.alias())
                        .is_some();
                    if chained {
                        errors.add(field, ErrorKind::Semantic, "alias target is itself aliased");
                    }
                }
            }
            (AccountInfoClass::Holding, AttributeValue::Link(link)) => {
                match self.linked_view(account, link.id, field, errors) {
                    Some(target) if !target.class.is_portfolio() => {
                        errors.add(field, ErrorKind::Semantic, "holding must be a portfolio");
                    }
                    _ => {}
                }
            }
            (AccountInfoClass::Notes, value) => {
                if let Some(text) = value.as_text() {
                    check_length(errors, field, text, self.config.notes_max_len);
                }
            }
            (AccountInfoClass::AccountNumber | AccountInfoClass::WebSite, value) => {
                if let Some(text) = value.as_text() {
                    check_length(errors, field, text, self.config.short_text_max_len);
                }
            }
            _ => {}
        }
    }

    fn linked_view(
        &self,
        account: &Account,
        target: EntityId,
        field: &'static str,
        errors: &mut ValidationErrors,
    ) -> Option<AccountView> {
        if target == account.id() {
            errors.add(field, ErrorKind::Semantic, "account cannot link to itself");
            return None;
        }
        let view = self.data.account_view(target);
        if view.is_none() {
            errors.add(field, ErrorKind::Referential, "unknown account");
        }
        view
    }

    pub fn transaction(&self, transaction: &Transaction) -> EntityErrors {
        let mut errors = EntityErrors::default();
        if transaction.is_deleted() {
            return errors;
        }

        let values = transaction.values();
        let base = &mut errors.base;

        if values.date < self.config.earliest_date {
            base.add("Date", ErrorKind::Semantic, "before the earliest permitted date");
        }
        if values.amount.value() < Decimal::ZERO {
            base.add("Amount", ErrorKind::Semantic, "must not be negative");
        }

        let class = match self.data.transaction_categories().get(values.category) {
            None => {
                base.add("Category", ErrorKind::Referential, "unknown category");
                None
            }
            Some(category) if category.class.is_group() => {
                base.add("Category", ErrorKind::Semantic, "must be a leaf category");
                None
            }
            Some(category) => Some(category.class),
        };
        let debit = self.data.account_view(values.debit);
        if debit.is_none() {
            base.add("Debit", ErrorKind::Referential, "unknown account");
        }
        let credit = self.data.account_view(values.credit);
        if credit.is_none() {
            base.add("Credit", ErrorKind::Referential, "unknown account");
        }
        if class.is_some()
            && debit.is_some()
            && credit.is_some()
            && !is_valid_event(class, debit.as_ref(), credit.as_ref())
        {
            base.add(
                "Category",
                ErrorKind::Semantic,
                "not valid between these accounts",
            );
        }

        if let Some(parent_id) = values.parent {
            match self.data.transactions().get_live(parent_id) {
                None => base.add("Parent", ErrorKind::Referential, "unknown transaction"),
                Some(parent) => {
                    if parent.values().parent.is_some() {
                        base.add("Parent", ErrorKind::Semantic, "parent is itself a split");
                    }
                    if parent.date() != values.date {
                        base.add("Date", ErrorKind::Semantic, "must match the parent date");
                    }
                }
            }
        }
        if let Some(template) = values.template {
            if self.data.patterns().get_live(template).is_none() {
                base.add("Template", ErrorKind::Referential, "unknown pattern");
            }
        }

        let info = transaction.info();
        if let (Some(class), Some(debit), Some(credit)) = (class, debit.as_ref(), credit.as_ref()) {
            let ctx = TransactionContext {
                class,
                debit,
                credit,
                amount: values.amount,
            };
            check_requirements(
                info,
                |info_class| transaction_requirement(info_class, &ctx),
                &mut errors.info,
            );
            if class == TransactionClass::StockAdjust
                && info.contains(TransactionInfoClass::DebitUnits)
                    == info.contains(TransactionInfoClass::CreditUnits)
            {
                errors.info.add(
                    TransactionInfoClass::DebitUnits.field(),
                    ErrorKind::Semantic,
                    "exactly one of debit or credit units is required",
                );
            }
        }
        for (info_class, value) in info.iter() {
            self.transaction_attribute(values.date, info_class, value, &mut errors.info);
        }
        errors
    }

    fn transaction_attribute(
        &self,
        date: NaiveDate,
        class: TransactionInfoClass,
        value: &AttributeValue,
        errors: &mut ValidationErrors,
    ) {
        let field = class.field();
        match value {
            AttributeValue::Date(credit_date) if *credit_date <= date => {
                errors.add(field, ErrorKind::Semantic, "must be after the transaction date");
            }
            AttributeValue::Integer(years) if *years <= 0 => {
                errors.add(field, ErrorKind::Semantic, "must be positive");
            }
            AttributeValue::Money(money) if !money.is_positive() => {
                errors.add(field, ErrorKind::Semantic, "must be positive");
            }
            AttributeValue::Units(units) if !units.is_positive() => {
                errors.add(field, ErrorKind::Semantic, "must be positive");
            }
            AttributeValue::Dilution(dilution) if !dilution.is_in_range() => {
                errors.add(field, ErrorKind::Semantic, "out of range");
            }
            AttributeValue::Link(link) => match self.data.account_view(link.id) {
                None => errors.add(field, ErrorKind::Referential, "unknown account"),
                Some(view) if !view.class.is_savings() => {
                    errors.add(field, ErrorKind::Semantic, "must be a savings account");
                }
                Some(_) => {}
            },
            AttributeValue::ShortText(text) | AttributeValue::String(text) => {
                let limit = match class {
                    TransactionInfoClass::Reference => self.config.reference_max_len,
                    _ => self.config.comments_max_len,
                };
                check_length(errors, field, text, limit);
            }
            _ => {}
        }
    }

    pub fn pattern(&self, pattern: &Pattern) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if pattern.is_deleted() {
            let generated = self
                .data
                .transactions()
                .live()
                .any(|transaction| transaction.values().template == Some(pattern.id()));
            if generated {
                errors.add("Deleted", ErrorKind::State, "pattern is still referenced");
            }
            return errors;
        }
        let values = pattern.values();

        match self.config.reference_window() {
            Ok(window) if !window.contains(values.date) => {
                errors.add("Date", ErrorKind::Semantic, "outside the reference window");
            }
            Err(err) => errors.add("Date", ErrorKind::Semantic, err.to_string()),
            Ok(_) => {}
        }
        if values.frequency == Frequency::EndOfMonth && !is_end_of_month(values.date) {
            errors.add("Date", ErrorKind::Semantic, "must be the last day of a month");
        }
        if values.amount.value() < Decimal::ZERO {
            errors.add("Amount", ErrorKind::Semantic, "must not be negative");
        }

        let class = self.data.transaction_class(values.category);
        if class.is_none() {
            errors.add("Category", ErrorKind::Referential, "unknown category");
        }
        let debit = self.data.account_view(values.debit);
        if debit.is_none() {
            errors.add("Debit", ErrorKind::Referential, "unknown account");
        }
        let credit = self.data.account_view(values.credit);
        if credit.is_none() {
            errors.add("Credit", ErrorKind::Referential, "unknown account");
        }
        if class.is_some()
            && debit.is_some()
            && credit.is_some()
            && !is_valid_event(class, debit.as_ref(), credit.as_ref())
        {
            errors.add("Category", ErrorKind::Semantic, "not valid between these accounts");
        }
        if values.frequency == Frequency::Maturity
            && debit.is_some_and(|debit| !matches!(debit.class, AccountClass::Bond | AccountClass::Endowment))
        {
            errors.add(
                "Frequency",
                ErrorKind::Semantic,
                "maturity patterns need an account with a maturity date",
            );
        }
        errors
    }

    pub fn tax_year(&self, tax_year: &TaxYear) -> EntityErrors {
        let mut errors = EntityErrors::default();
        if tax_year.is_deleted() {
            return errors;
        }
        let year_end = tax_year.values().year_end;
        if !self.config.is_tax_year_end(year_end) {
            errors
                .base
                .add("YearEnd", ErrorKind::Semantic, "not on the tax year boundary");
        }
        let duplicate = self
            .data
            .tax_years()
            .live()
            .any(|other| other.id() != tax_year.id() && other.values().year_end == year_end);
        if duplicate {
            errors
                .base
                .add("YearEnd", ErrorKind::Structural, "duplicate tax year");
        }
        for (class, value) in tax_year.info().iter() {
            let out_of_range = match value {
                AttributeValue::Rate(rate) => {
                    rate.value() < Decimal::ZERO || rate.value() >= Decimal::ONE
                }
                AttributeValue::Money(money) => money.value() < Decimal::ZERO,
                _ => false,
            };
            if out_of_range {
                errors.info.add(class.field(), ErrorKind::Semantic, "out of range");
            }
        }
        if tax_year.info().rate(TaxYearInfoClass::BasicTaxRate).is_none() {
            errors.info.missing(TaxYearInfoClass::BasicTaxRate.field());
        }
        errors
    }

    pub fn rate(&self, rate: &AccountRate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if rate.is_deleted() {
            return errors;
        }
        let values = rate.values();
        match self.data.account_view(values.account) {
            None => errors.add("Account", ErrorKind::Referential, "unknown account"),
            Some(view) if !view.class.is_savings() => {
                errors.add("Account", ErrorKind::Semantic, "rates apply to savings accounts");
            }
            Some(_) => {}
        }
        if values.rate.value() < Decimal::ZERO {
            errors.add("Rate", ErrorKind::Semantic, "must not be negative");
        }
        errors
    }

    pub fn price(&self, price: &AccountPrice) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if price.is_deleted() {
            return errors;
        }
        let values = price.values();
        match self.data.account_view(values.account) {
            None => errors.add("Account", ErrorKind::Referential, "unknown account"),
            Some(view) if !view.class.has_units() => {
                errors.add("Account", ErrorKind::Semantic, "prices apply to unit accounts");
            }
            Some(_) => {}
        }
        if !values.price.is_positive() {
            errors.add("Price", ErrorKind::Semantic, "must be positive");
        }
        if values.date < self.config.earliest_date {
            errors.add("Date", ErrorKind::Semantic, "before the earliest permitted date");
        }
        errors
    }
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::Money;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    enum Probe {
        Needed,
        Banned,
        Optional,
    }

    impl AttributeClass for Probe {
        const ALL: &'static [Self] = &[Probe::Needed, Probe::Banned, Probe::Optional];

        fn field(self) -> &'static str {
            match self {
                Probe::Needed => "Needed",
                Probe::Banned => "Banned",
                Probe::Optional => "Optional",
            }
        }

        fn data_type(self) -> crate::tracking::DataType {
            crate::tracking::DataType::Money
        }
    }

    fn rule(class: Probe) -> Requirement {
        match class {
            Probe::Needed => Requirement::MustExist,
            Probe::Banned => Requirement::NotAllowed,
            Probe::Optional => Requirement::CanExist,
        }
    }

    #[test]
    fn requirement_loop_reports_missing_and_forbidden() {
        let mut set = ExtensionSet::new();
        set.set(Probe::Banned, Some(AttributeValue::Money(Money::new(dec!(1)))))
            .unwrap();
        let mut errors = ValidationErrors::new();
        check_requirements(&set, rule, &mut errors);
        assert_eq!(errors.len(), 2);
        assert!(errors.has_error("Needed", crate::errors::ERROR_MISSING));
        assert!(errors.has_error("Banned", crate::errors::ERROR_EXISTS));
    }

    #[test]
    fn satisfied_requirements_are_silent() {
        let mut set = ExtensionSet::new();
        set.set(Probe::Needed, Some(AttributeValue::Money(Money::new(dec!(1)))))
            .unwrap();
        let mut errors = ValidationErrors::new();
        check_requirements(&set, rule, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn currency_codes_are_three_capitals() {
        assert!(is_currency_code("GBP"));
        assert!(!is_currency_code("gbp"));
        assert!(!is_currency_code("EURO"));
    }
}
