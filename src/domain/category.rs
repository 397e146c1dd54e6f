use serde::{Deserialize, Serialize};

use crate::domain::common::{EntityId, Identifiable, NamedEntity};

/// Semantic classification of an account category. Every rule table keys off these
/// predicates, never off names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountClass {
    Current,
    Savings,
    Bond,
    Cash,
    Portfolio,
    CreditCard,
    Loan,
    PrivateLoan,
    Shares,
    UnitTrust,
    LifeBond,
    Property,
    Vehicle,
    Endowment,
    Employer,
    Government,
    TaxMan,
    Market,
    Inheritance,
    Institution,
    Individual,
    Payee,
    /// Non-leaf category used only to group others.
    Group,
}

impl AccountClass {
    /// Money-holding accounts that can earn interest.
    pub fn is_savings(self) -> bool {
        matches!(
            self,
            AccountClass::Current
                | AccountClass::Savings
                | AccountClass::Bond
                | AccountClass::Cash
                | AccountClass::Portfolio
        )
    }

    pub fn is_loan(self) -> bool {
        matches!(
            self,
            AccountClass::CreditCard | AccountClass::Loan | AccountClass::PrivateLoan
        )
    }

    pub fn has_units(self) -> bool {
        matches!(
            self,
            AccountClass::Shares | AccountClass::UnitTrust | AccountClass::LifeBond
        )
    }

    /// Accounts whose balance is tracked as a money value rather than units.
    pub fn has_value(self) -> bool {
        self.is_savings()
            || self.is_loan()
            || matches!(
                self,
                AccountClass::Property | AccountClass::Vehicle | AccountClass::Endowment
            )
    }

    pub fn is_bond(self) -> bool {
        matches!(self, AccountClass::Bond | AccountClass::LifeBond)
    }

    pub fn is_shares(self) -> bool {
        matches!(self, AccountClass::Shares)
    }

    /// Unit-bearing accounts that can absorb reinvested income.
    pub fn is_capital(self) -> bool {
        self.has_units()
    }

    pub fn is_dividend_capable(self) -> bool {
        matches!(self, AccountClass::Shares | AccountClass::UnitTrust)
    }

    pub fn is_portfolio(self) -> bool {
        matches!(self, AccountClass::Portfolio)
    }

    /// Counterparties that are not owned by the ledger holder.
    pub fn is_payee(self) -> bool {
        matches!(
            self,
            AccountClass::Employer
                | AccountClass::Government
                | AccountClass::TaxMan
                | AccountClass::Market
                | AccountClass::Inheritance
                | AccountClass::Institution
                | AccountClass::Individual
                | AccountClass::Payee
        )
    }

    pub fn is_asset(self) -> bool {
        !self.is_payee() && !self.is_group()
    }

    pub fn is_group(self) -> bool {
        matches!(self, AccountClass::Group)
    }

    pub fn can_tax_free(self) -> bool {
        matches!(
            self,
            AccountClass::Savings
                | AccountClass::Bond
                | AccountClass::Shares
                | AccountClass::UnitTrust
        )
    }

    pub fn can_gross_interest(self) -> bool {
        self.is_savings()
    }

    /// Only one live account of this class may exist in a data set.
    pub fn is_singular(self) -> bool {
        matches!(
            self,
            AccountClass::TaxMan | AccountClass::Government | AccountClass::Market
        )
    }

    pub fn needs_parent(self) -> bool {
        self.is_loan()
    }

    pub fn can_parent(self) -> bool {
        self.is_asset()
    }

    pub fn can_alias(self) -> bool {
        self.has_units()
    }
}

/// Semantic classification of a transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionClass {
    TaxedIncome,
    BenefitIncome,
    GrantIncome,
    OtherIncome,
    Inherited,
    CashBack,
    Interest,
    Dividend,
    RentalIncome,
    LoanInterestEarned,
    LoanInterestCharged,
    StockSplit,
    StockAdjust,
    StockDemerger,
    StockTakeOver,
    StockRightsTaken,
    StockRightsWaived,
    Transfer,
    Expense,
    LocalTaxes,
    CharityDonation,
    WriteOff,
    TaxSettlement,
    TaxRelief,
    /// Non-leaf category used only to group others.
    Group,
}

impl TransactionClass {
    pub fn is_income(self) -> bool {
        matches!(
            self,
            TransactionClass::TaxedIncome
                | TransactionClass::BenefitIncome
                | TransactionClass::GrantIncome
                | TransactionClass::OtherIncome
                | TransactionClass::Inherited
                | TransactionClass::CashBack
                | TransactionClass::Interest
                | TransactionClass::Dividend
                | TransactionClass::RentalIncome
                | TransactionClass::LoanInterestEarned
                | TransactionClass::TaxRelief
        )
    }

    pub fn is_stock_event(self) -> bool {
        matches!(
            self,
            TransactionClass::StockSplit
                | TransactionClass::StockAdjust
                | TransactionClass::StockDemerger
                | TransactionClass::StockTakeOver
                | TransactionClass::StockRightsTaken
                | TransactionClass::StockRightsWaived
        )
    }

    pub fn is_transfer(self) -> bool {
        matches!(self, TransactionClass::Transfer)
    }

    pub fn is_expense(self) -> bool {
        matches!(
            self,
            TransactionClass::Expense
                | TransactionClass::LoanInterestCharged
                | TransactionClass::LocalTaxes
                | TransactionClass::CharityDonation
                | TransactionClass::WriteOff
                | TransactionClass::TaxSettlement
        )
    }

    pub fn is_group(self) -> bool {
        matches!(self, TransactionClass::Group)
    }

    /// Income that arrives with tax already deducted at source.
    pub fn is_net_of_tax(self) -> bool {
        matches!(
            self,
            TransactionClass::TaxedIncome
                | TransactionClass::BenefitIncome
                | TransactionClass::Interest
                | TransactionClass::Dividend
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCategory {
    pub id: EntityId,
    pub name: String,
    pub class: AccountClass,
    pub parent: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCategory {
    pub id: EntityId,
    pub name: String,
    pub class: TransactionClass,
    pub parent: Option<EntityId>,
}

impl Identifiable for AccountCategory {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl NamedEntity for AccountCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Identifiable for TransactionCategory {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl NamedEntity for TransactionCategory {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payees_are_never_assets() {
        for class in [
            AccountClass::Employer,
            AccountClass::TaxMan,
            AccountClass::Payee,
            AccountClass::Individual,
        ] {
            assert!(class.is_payee());
            assert!(!class.is_asset());
            assert!(!class.has_value());
        }
    }

    #[test]
    fn unit_accounts_are_capital_but_not_valued() {
        assert!(AccountClass::Shares.has_units());
        assert!(AccountClass::Shares.is_capital());
        assert!(!AccountClass::Shares.has_value());
        assert!(AccountClass::LifeBond.is_bond());
        assert!(!AccountClass::LifeBond.is_dividend_capable());
    }

    #[test]
    fn group_class_is_neither_asset_nor_payee() {
        assert!(!AccountClass::Group.is_asset());
        assert!(!AccountClass::Group.is_payee());
    }
}
