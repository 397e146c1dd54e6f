//! Which extension attributes an entity must, may, or must not carry.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::domain::account::{AccountInfoClass, AccountView};
use crate::domain::category::{AccountClass, TransactionClass};
use crate::domain::transaction::TransactionInfoClass;
use crate::domain::values::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    MustExist,
    CanExist,
    NotAllowed,
}

impl Requirement {
    fn allowed_if(condition: bool) -> Requirement {
        if condition {
            Requirement::CanExist
        } else {
            Requirement::NotAllowed
        }
    }

    fn required_if(condition: bool) -> Requirement {
        if condition {
            Requirement::MustExist
        } else {
            Requirement::NotAllowed
        }
    }
}

/// Owning transaction state read by the transaction requirement table.
#[derive(Debug, Clone, Copy)]
pub struct TransactionContext<'a> {
    pub class: TransactionClass,
    pub debit: &'a AccountView,
    pub credit: &'a AccountView,
    pub amount: Money,
}

impl TransactionContext<'_> {
    pub fn is_recursive(&self) -> bool {
        self.debit.id == self.credit.id
    }

    fn is_bond_transfer(&self) -> bool {
        self.class == TransactionClass::Transfer && self.debit.class.is_bond()
    }
}

type TransactionRule = fn(&TransactionContext<'_>) -> Requirement;

fn always_allowed(_: &TransactionContext<'_>) -> Requirement {
    Requirement::CanExist
}

fn credit_date(ctx: &TransactionContext<'_>) -> Requirement {
    Requirement::allowed_if(matches!(
        ctx.class,
        TransactionClass::Transfer | TransactionClass::Expense
    ))
}

fn salary_only(ctx: &TransactionContext<'_>) -> Requirement {
    Requirement::allowed_if(ctx.class == TransactionClass::TaxedIncome)
}

fn donation(ctx: &TransactionContext<'_>) -> Requirement {
    Requirement::allowed_if(matches!(
        ctx.class,
        TransactionClass::TaxedIncome | TransactionClass::CharityDonation
    ))
}

fn tax_credit(ctx: &TransactionContext<'_>) -> Requirement {
    match ctx.class {
        TransactionClass::TaxedIncome | TransactionClass::BenefitIncome => {
            Requirement::MustExist
        }
        TransactionClass::GrantIncome => Requirement::CanExist,
        TransactionClass::Interest | TransactionClass::Dividend => {
            if ctx.debit.tax_free || ctx.debit.gross_interest {
                Requirement::NotAllowed
            } else {
                Requirement::MustExist
            }
        }
        _ => Requirement::required_if(ctx.is_bond_transfer()),
    }
}

fn debit_units(ctx: &TransactionContext<'_>) -> Requirement {
    if !ctx.debit.class.has_units() {
        return Requirement::NotAllowed;
    }
    Requirement::allowed_if(matches!(
        ctx.class,
        TransactionClass::Transfer
            | TransactionClass::StockAdjust
            | TransactionClass::StockDemerger
            | TransactionClass::StockTakeOver
            | TransactionClass::StockRightsWaived
    ))
}

fn credit_units(ctx: &TransactionContext<'_>) -> Requirement {
    if !ctx.credit.class.has_units() {
        return Requirement::NotAllowed;
    }
    match ctx.class {
        TransactionClass::StockTakeOver
        | TransactionClass::StockDemerger
        | TransactionClass::StockRightsTaken => Requirement::MustExist,
        TransactionClass::Dividend if ctx.is_recursive() => Requirement::MustExist,
        TransactionClass::Transfer
        | TransactionClass::StockAdjust
        | TransactionClass::StockSplit
        | TransactionClass::Dividend => Requirement::CanExist,
        _ => Requirement::NotAllowed,
    }
}

fn dilution(ctx: &TransactionContext<'_>) -> Requirement {
    Requirement::required_if(matches!(
        ctx.class,
        TransactionClass::StockSplit
            | TransactionClass::StockRightsTaken
            | TransactionClass::StockRightsWaived
            | TransactionClass::StockDemerger
    ))
}

fn qualify_years(ctx: &TransactionContext<'_>) -> Requirement {
    Requirement::required_if(ctx.is_bond_transfer())
}

fn third_party(ctx: &TransactionContext<'_>) -> Requirement {
    Requirement::required_if(
        ctx.class == TransactionClass::StockTakeOver && ctx.amount.is_non_zero(),
    )
}

static TRANSACTION_RULES: Lazy<HashMap<TransactionInfoClass, TransactionRule>> =
    Lazy::new(|| {
        use TransactionInfoClass::*;

        let rows: [(TransactionInfoClass, TransactionRule); 13] = [
            (DebitUnits, debit_units),
            (CreditUnits, credit_units),
            (TaxCredit, tax_credit),
            (NatInsurance, salary_only),
            (Benefit, salary_only),
            (Pension, salary_only),
            (Donation, donation),
            (Dilution, dilution),
            (QualifyYears, qualify_years),
            (ThirdParty, third_party),
            (CreditDate, credit_date),
            (Reference, always_allowed),
            (Comments, always_allowed),
        ];
        rows.into_iter().collect()
    });

/// Requirement for a transaction attribute given the owning transaction's state.
pub fn transaction_requirement(
    class: TransactionInfoClass,
    ctx: &TransactionContext<'_>,
) -> Requirement {
    TRANSACTION_RULES
        .get(&class)
        .map(|rule| rule(ctx))
        .unwrap_or(Requirement::NotAllowed)
}

type AccountRule = fn(&AccountView) -> Requirement;

fn maturity(account: &AccountView) -> Requirement {
    match account.class {
        AccountClass::Bond => Requirement::MustExist,
        AccountClass::Endowment => Requirement::CanExist,
        _ => Requirement::NotAllowed,
    }
}

fn parent(account: &AccountView) -> Requirement {
    if account.class.needs_parent() {
        Requirement::MustExist
    } else {
        Requirement::allowed_if(account.class.can_parent())
    }
}

fn unit_link(account: &AccountView) -> Requirement {
    Requirement::allowed_if(account.class.can_alias())
}

fn owned_account(account: &AccountView) -> Requirement {
    Requirement::allowed_if(account.class.is_asset())
}

fn any_account(_: &AccountView) -> Requirement {
    Requirement::CanExist
}

static ACCOUNT_RULES: Lazy<HashMap<AccountInfoClass, AccountRule>> = Lazy::new(|| {
    use AccountInfoClass::*;

    let rows: [(AccountInfoClass, AccountRule); 7] = [
        (Maturity, maturity),
        (Parent, parent),
        (Alias, unit_link),
        (Holding, unit_link),
        (AccountNumber, owned_account),
        (WebSite, owned_account),
        (Notes, any_account),
    ];
    rows.into_iter().collect()
});

/// Requirement for an account attribute given the account's class.
pub fn account_requirement(class: AccountInfoClass, account: &AccountView) -> Requirement {
    ACCOUNT_RULES
        .get(&class)
        .map(|rule| rule(account))
        .unwrap_or(Requirement::NotAllowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::EntityId;
    use rust_decimal_macros::dec;

    fn view(id: u32, class: AccountClass) -> AccountView {
        AccountView {
            id: EntityId(id),
            class,
            parent: None,
            closed: false,
            tax_free: false,
            gross_interest: false,
            auto_expense: false,
            maturity: None,
        }
    }

    fn requirement(
        info: TransactionInfoClass,
        class: TransactionClass,
        debit: &AccountView,
        credit: &AccountView,
    ) -> Requirement {
        let ctx = TransactionContext {
            class,
            debit,
            credit,
            amount: Money(dec!(100)),
        };
        transaction_requirement(info, &ctx)
    }

    #[test]
    fn tax_credit_not_allowed_on_tax_free_interest() {
        let mut isa = view(1, AccountClass::Savings);
        isa.tax_free = true;
        let current = view(2, AccountClass::Current);
        assert_eq!(
            requirement(
                TransactionInfoClass::TaxCredit,
                TransactionClass::Interest,
                &isa,
                &current
            ),
            Requirement::NotAllowed
        );

        let taxed = view(3, AccountClass::Savings);
        assert_eq!(
            requirement(
                TransactionInfoClass::TaxCredit,
                TransactionClass::Interest,
                &taxed,
                &current
            ),
            Requirement::MustExist
        );
    }

    #[test]
    fn tax_credit_for_income_and_bond_transfers() {
        let employer = view(1, AccountClass::Employer);
        let government = view(2, AccountClass::Government);
        let current = view(3, AccountClass::Current);
        let bond = view(4, AccountClass::Bond);
        use TransactionClass::*;
        let tc = TransactionInfoClass::TaxCredit;
        assert_eq!(
            requirement(tc, TaxedIncome, &employer, &current),
            Requirement::MustExist
        );
        assert_eq!(
            requirement(tc, GrantIncome, &government, &current),
            Requirement::CanExist
        );
        assert_eq!(
            requirement(tc, Transfer, &bond, &current),
            Requirement::MustExist
        );
        assert_eq!(
            requirement(tc, Transfer, &current, &bond),
            Requirement::NotAllowed
        );
        assert_eq!(
            requirement(TransactionInfoClass::QualifyYears, Transfer, &bond, &current),
            Requirement::MustExist
        );
    }

    #[test]
    fn national_insurance_only_on_salary() {
        let employer = view(1, AccountClass::Employer);
        let current = view(2, AccountClass::Current);
        let ni = TransactionInfoClass::NatInsurance;
        assert_eq!(
            requirement(ni, TransactionClass::TaxedIncome, &employer, &current),
            Requirement::CanExist
        );
        assert_eq!(
            requirement(ni, TransactionClass::OtherIncome, &employer, &current),
            Requirement::NotAllowed
        );
    }

    #[test]
    fn units_need_unit_bearing_accounts() {
        let current = view(1, AccountClass::Current);
        let shares = view(2, AccountClass::Shares);
        let other = view(3, AccountClass::Shares);
        use TransactionInfoClass::{CreditUnits, DebitUnits};
        assert_eq!(
            requirement(DebitUnits, TransactionClass::Transfer, &current, &shares),
            Requirement::NotAllowed
        );
        assert_eq!(
            requirement(CreditUnits, TransactionClass::Transfer, &current, &shares),
            Requirement::CanExist
        );
        assert_eq!(
            requirement(CreditUnits, TransactionClass::StockTakeOver, &shares, &other),
            Requirement::MustExist
        );
        assert_eq!(
            requirement(CreditUnits, TransactionClass::Dividend, &shares, &shares),
            Requirement::MustExist
        );
    }

    #[test]
    fn dilution_only_for_capital_events() {
        let shares = view(1, AccountClass::Shares);
        let dil = TransactionInfoClass::Dilution;
        assert_eq!(
            requirement(dil, TransactionClass::StockSplit, &shares, &shares),
            Requirement::MustExist
        );
        assert_eq!(
            requirement(dil, TransactionClass::StockAdjust, &shares, &shares),
            Requirement::NotAllowed
        );
    }

    #[test]
    fn third_party_only_for_paid_takeovers() {
        let shares = view(1, AccountClass::Shares);
        let other = view(2, AccountClass::Shares);
        let mut ctx = TransactionContext {
            class: TransactionClass::StockTakeOver,
            debit: &shares,
            credit: &other,
            amount: Money(dec!(10)),
        };
        assert_eq!(
            transaction_requirement(TransactionInfoClass::ThirdParty, &ctx),
            Requirement::MustExist
        );
        ctx.amount = Money::ZERO;
        assert_eq!(
            transaction_requirement(TransactionInfoClass::ThirdParty, &ctx),
            Requirement::NotAllowed
        );
    }

    #[test]
    fn account_links_follow_class() {
        let loan = view(1, AccountClass::Loan);
        let shares = view(2, AccountClass::Shares);
        let shop = view(3, AccountClass::Payee);
        let bond = view(4, AccountClass::Bond);
        assert_eq!(
            account_requirement(AccountInfoClass::Parent, &loan),
            Requirement::MustExist
        );
        assert_eq!(
            account_requirement(AccountInfoClass::Parent, &shop),
            Requirement::NotAllowed
        );
        assert_eq!(
            account_requirement(AccountInfoClass::Alias, &shares),
            Requirement::CanExist
        );
        assert_eq!(
            account_requirement(AccountInfoClass::Maturity, &bond),
            Requirement::MustExist
        );
        assert_eq!(
            account_requirement(AccountInfoClass::AccountNumber, &shop),
            Requirement::NotAllowed
        );
    }
}
