//! Decides whether a transaction category is meaningful between two accounts.
//!
//! The debit account is the source of the funds and the credit account the
//! destination. Every rule is a boolean expression over account-class predicates
//! and parent links; free text never takes part.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::domain::account::AccountView;
use crate::domain::category::{AccountClass, TransactionClass};

/// Abstract shape of a debit/credit account pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairShape {
    AssetToAsset,
    AssetToPayee,
    PayeeToAsset,
    /// One side is an expense bucket rather than a real holding.
    AutoExpense,
    Illegal,
}

impl PairShape {
    pub fn of(debit: &AccountView, credit: &AccountView) -> PairShape {
        if debit.class.is_group() || credit.class.is_group() {
            return PairShape::Illegal;
        }
        match (debit.auto_expense, credit.auto_expense) {
            (true, true) => return PairShape::Illegal,
            (true, false) | (false, true) => return PairShape::AutoExpense,
            (false, false) => {}
        }
        match (debit.class.is_asset(), credit.class.is_asset()) {
            (true, true) => PairShape::AssetToAsset,
            (true, false) => PairShape::AssetToPayee,
            (false, true) => PairShape::PayeeToAsset,
            (false, false) => PairShape::Illegal,
        }
    }
}

/// Abstract shape of a transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryShape {
    Income,
    Expense,
    Transfer,
    Corporate,
    Illegal,
}

impl CategoryShape {
    pub fn of(class: TransactionClass) -> CategoryShape {
        if class.is_group() {
            CategoryShape::Illegal
        } else if class.is_transfer() {
            CategoryShape::Transfer
        } else if class.is_stock_event() {
            CategoryShape::Corporate
        } else if class.is_income() {
            CategoryShape::Income
        } else if class.is_expense() {
            CategoryShape::Expense
        } else {
            CategoryShape::Illegal
        }
    }

    /// Coarse pre-check before the per-class rule.
    pub fn admits(self, pair: PairShape) -> bool {
        match self {
            CategoryShape::Income => {
                matches!(pair, PairShape::PayeeToAsset | PairShape::AssetToAsset)
            }
            CategoryShape::Expense => {
                matches!(pair, PairShape::AssetToPayee | PairShape::PayeeToAsset)
            }
            CategoryShape::Transfer | CategoryShape::Corporate => {
                matches!(pair, PairShape::AssetToAsset)
            }
            CategoryShape::Illegal => false,
        }
    }
}

/// The two accounts of a proposed transaction.
#[derive(Debug, Clone, Copy)]
pub struct EventPair<'a> {
    pub debit: &'a AccountView,
    pub credit: &'a AccountView,
    pub is_recursive: bool,
}

impl<'a> EventPair<'a> {
    pub fn new(debit: &'a AccountView, credit: &'a AccountView) -> Self {
        Self {
            debit,
            credit,
            is_recursive: debit.id == credit.id,
        }
    }
}

/// One row of the compatibility table.
#[derive(Clone, Copy)]
pub struct EventRule {
    pub description: &'static str,
    pub check: fn(&EventPair<'_>) -> bool,
}

fn taxed_income(p: &EventPair<'_>) -> bool {
    p.debit.class == AccountClass::Employer && p.credit.class.is_savings()
}

fn benefit_income(p: &EventPair<'_>) -> bool {
    p.debit.class == AccountClass::Government && p.credit.class.is_savings()
}

fn grant_income(p: &EventPair<'_>) -> bool {
    p.debit.class.is_payee() && p.credit.class.has_value()
}

fn other_income(p: &EventPair<'_>) -> bool {
    p.debit.class.is_payee() && p.credit.class.is_asset()
}

fn inherited(p: &EventPair<'_>) -> bool {
    p.debit.class == AccountClass::Inheritance && p.credit.class.is_asset()
}

fn cash_back(p: &EventPair<'_>) -> bool {
    p.debit.class.is_payee() && (p.credit.class.is_savings() || p.credit.class.is_loan())
}

fn interest(p: &EventPair<'_>) -> bool {
    p.debit.class.is_savings() && p.credit.class.has_value()
}

fn dividend(p: &EventPair<'_>) -> bool {
    p.debit.class.is_dividend_capable()
        && (p.credit.class.has_value() || (p.is_recursive && p.debit.class.is_capital()))
}

fn reflexive_capital(p: &EventPair<'_>) -> bool {
    p.is_recursive && p.debit.class.is_capital()
}

fn share_exchange(p: &EventPair<'_>) -> bool {
    !p.is_recursive && p.debit.class.is_shares() && p.credit.class.is_shares()
}

fn rights_taken(p: &EventPair<'_>) -> bool {
    p.debit.class.is_savings() && p.credit.class.is_shares()
}

fn rights_waived(p: &EventPair<'_>) -> bool {
    p.debit.class.is_shares() && p.credit.class.is_savings()
}

fn loan_income(p: &EventPair<'_>) -> bool {
    p.credit.class.is_loan() && p.credit.parent == Some(p.debit.id)
}

fn loan_charge(p: &EventPair<'_>) -> bool {
    p.debit.class.is_loan() && p.debit.parent == Some(p.credit.id)
}

fn transfer(p: &EventPair<'_>) -> bool {
    !p.is_recursive && p.debit.class.is_asset() && p.credit.class.is_asset()
}

fn expense(p: &EventPair<'_>) -> bool {
    let forward = p.debit.class.is_asset() && p.credit.class.is_payee();
    let recovered = p.debit.class.is_payee() && p.credit.class.is_asset();
    forward || recovered
}

fn local_taxes(p: &EventPair<'_>) -> bool {
    p.debit.class.has_value() && p.credit.class == AccountClass::Government
}

fn charity_donation(p: &EventPair<'_>) -> bool {
    p.debit.class.is_savings() && p.credit.class.is_payee()
}

fn write_off(p: &EventPair<'_>) -> bool {
    p.debit.class.is_loan() && p.credit.class.is_payee()
}

fn tax_settlement(p: &EventPair<'_>) -> bool {
    (p.debit.class == AccountClass::TaxMan && p.credit.class.is_savings())
        || (p.debit.class.is_savings() && p.credit.class == AccountClass::TaxMan)
}

fn tax_relief(p: &EventPair<'_>) -> bool {
    p.debit.class == AccountClass::TaxMan
        && (p.credit.class.is_savings() || p.credit.class.is_loan())
}

static EVENT_RULES: Lazy<HashMap<TransactionClass, EventRule>> = Lazy::new(|| {
    use TransactionClass::*;

    let rows: [(TransactionClass, &'static str, fn(&EventPair<'_>) -> bool); 24] = [
        (TaxedIncome, "employer into savings", taxed_income),
        (BenefitIncome, "government into savings", benefit_income),
        (GrantIncome, "payee into valued account", grant_income),
        (OtherIncome, "payee into asset", other_income),
        (Inherited, "inheritance into asset", inherited),
        (CashBack, "payee into savings or loan", cash_back),
        (Interest, "savings into valued account", interest),
        (Dividend, "shares into valued account or reinvested", dividend),
        (StockSplit, "reflexive on capital account", reflexive_capital),
        (StockAdjust, "reflexive on capital account", reflexive_capital),
        (StockDemerger, "between two shares accounts", share_exchange),
        (StockTakeOver, "between two shares accounts", share_exchange),
        (StockRightsTaken, "savings into shares", rights_taken),
        (StockRightsWaived, "shares into savings", rights_waived),
        (RentalIncome, "loan parent into loan", loan_income),
        (LoanInterestEarned, "loan parent into loan", loan_income),
        (LoanInterestCharged, "loan into loan parent", loan_charge),
        (Transfer, "between two distinct assets", transfer),
        (Expense, "asset to payee or recovered from payee", expense),
        (LocalTaxes, "valued account to government", local_taxes),
        (CharityDonation, "savings to payee", charity_donation),
        (WriteOff, "loan to payee", write_off),
        (TaxSettlement, "between taxman and savings", tax_settlement),
        (TaxRelief, "taxman into savings or loan", tax_relief),
    ];

    rows.into_iter()
        .map(|(class, description, check)| (class, EventRule { description, check }))
        .collect()
});

/// Looks up the rule for a transaction class; `None` means the class is never legal.
pub fn rule_for(class: TransactionClass) -> Option<&'static EventRule> {
    EVENT_RULES.get(&class)
}

/// Restricted rule applied when an expense-bucket account is involved.
fn auto_expense_allows(class: TransactionClass, pair: &EventPair<'_>) -> bool {
    let other = if pair.debit.auto_expense {
        pair.credit
    } else {
        pair.debit
    };
    match class {
        TransactionClass::Transfer => other.class.is_savings(),
        TransactionClass::Expense => other.class.is_payee(),
        _ => false,
    }
}

/// Whether `class` is a legal transaction from `debit` to `credit`.
///
/// Total over its inputs: any absent input yields `false`.
pub fn is_valid_event(
    class: Option<TransactionClass>,
    debit: Option<&AccountView>,
    credit: Option<&AccountView>,
) -> bool {
    let (Some(class), Some(debit), Some(credit)) = (class, debit, credit) else {
        return false;
    };
    let pair = EventPair::new(debit, credit);

    let pair_shape = PairShape::of(debit, credit);
    let category_shape = CategoryShape::of(class);
    if pair_shape == PairShape::Illegal || category_shape == CategoryShape::Illegal {
        return false;
    }

    if pair_shape == PairShape::AutoExpense {
        return auto_expense_allows(class, &pair);
    }

    if !category_shape.admits(pair_shape) {
        return false;
    }

    rule_for(class).is_some_and(|rule| (rule.check)(&pair))
}
