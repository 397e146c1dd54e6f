#![allow(dead_code)]

use chrono::NaiveDate;
use ledger_core::domain::{
    AccountClass, AccountDraft, AccountInfoClass, AccountView, EntityId, Money, Rate, TaxRegime,
    TaxYearInfoClass, TransactionClass, TransactionDraft,
};
use ledger_core::tracking::AttributeValue;
use ledger_core::{EditSession, Ledger, ValidationErrors};
use rust_decimal::Decimal;

pub const ACCOUNT_CLASSES: [AccountClass; 15] = [
    AccountClass::Current,
    AccountClass::Savings,
    AccountClass::Bond,
    AccountClass::Cash,
    AccountClass::Portfolio,
    AccountClass::Loan,
    AccountClass::Shares,
    AccountClass::UnitTrust,
    AccountClass::Endowment,
    AccountClass::Employer,
    AccountClass::Government,
    AccountClass::TaxMan,
    AccountClass::Institution,
    AccountClass::Payee,
    AccountClass::Group,
];

pub const TRANSACTION_CLASSES: [TransactionClass; 12] = [
    TransactionClass::TaxedIncome,
    TransactionClass::BenefitIncome,
    TransactionClass::Interest,
    TransactionClass::Dividend,
    TransactionClass::Transfer,
    TransactionClass::Expense,
    TransactionClass::StockSplit,
    TransactionClass::StockAdjust,
    TransactionClass::StockTakeOver,
    TransactionClass::CharityDonation,
    TransactionClass::LoanInterestCharged,
    TransactionClass::Group,
];

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn money(value: Decimal) -> Money {
    Money::new(value)
}

/// Category names are the class names, so drafts can refer to them by name.
pub fn class_name<T: std::fmt::Debug>(class: T) -> String {
    format!("{:?}", class)
}

/// A committed ledger with one account per common role and an open session on it.
pub struct Fixture {
    pub ledger: Ledger,
    pub session: EditSession,
    pub bank: EntityId,
    pub employer: EntityId,
    pub current: EntityId,
    pub isa: EntityId,
    pub deposit: EntityId,
    pub shops: EntityId,
    pub mortgage: EntityId,
    pub shares: EntityId,
    pub taxman: EntityId,
    pub tax_year: EntityId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut ledger = Ledger::default();
        let mut session = ledger.edit();
        for class in ACCOUNT_CLASSES {
            session
                .create_account_category(&class_name(class), class, None)
                .expect("account category");
        }
        for class in TRANSACTION_CLASSES {
            session
                .create_transaction_category(&class_name(class), class, None)
                .expect("transaction category");
        }

        let bank = session
            .create_account(AccountDraft::new("Bank", "Institution"))
            .expect("bank");
        let employer = session
            .create_account(AccountDraft::new("Acme Ltd", "Employer"))
            .expect("employer");
        let current = session
            .create_account(
                AccountDraft::new("Current", "Current").with_link(AccountInfoClass::Parent, "Bank"),
            )
            .expect("current");
        let isa = session
            .create_account(
                AccountDraft::new("ISA", "Savings")
                    .with_link(AccountInfoClass::Parent, bank)
                    .tax_free(),
            )
            .expect("isa");
        let deposit = session
            .create_account(AccountDraft::new("Deposit", "Savings"))
            .expect("deposit");
        let shops = session
            .create_account(AccountDraft::new("Shops", "Payee"))
            .expect("shops");
        let mortgage = session
            .create_account(
                AccountDraft::new("Mortgage", "Loan").with_link(AccountInfoClass::Parent, bank),
            )
            .expect("mortgage");
        let shares = session
            .create_account(AccountDraft::new("Shares", "Shares"))
            .expect("shares");
        let taxman = session
            .create_account(AccountDraft::new("HMRC", "TaxMan"))
            .expect("taxman");
        let tax_year = session
            .create_tax_year(
                TaxRegime::Standard,
                date(2025, 4, 5),
                vec![
                    (
                        TaxYearInfoClass::BasicTaxRate,
                        AttributeValue::Rate(Rate::new(Decimal::new(20, 2))),
                    ),
                    (
                        TaxYearInfoClass::InterestTaxRate,
                        AttributeValue::Rate(Rate::new(Decimal::new(20, 2))),
                    ),
                    (
                        TaxYearInfoClass::DividendTaxRate,
                        AttributeValue::Rate(Rate::new(Decimal::new(10, 2))),
                    ),
                ],
            )
            .expect("tax year");

        ledger.commit(&mut session).expect("fixture commits cleanly");

        Self {
            ledger,
            session,
            bank,
            employer,
            current,
            isa,
            deposit,
            shops,
            mortgage,
            shares,
            taxman,
            tax_year,
        }
    }

    pub fn view(&self, account: EntityId) -> AccountView {
        self.session
            .data()
            .account_view(account)
            .expect("live account")
    }

    pub fn transaction(
        &mut self,
        on: NaiveDate,
        debit: EntityId,
        credit: EntityId,
        class: TransactionClass,
        amount: Decimal,
    ) -> EntityId {
        self.session
            .create_transaction(TransactionDraft::new(
                on,
                debit,
                credit,
                class_name(class).as_str(),
                money(amount),
            ))
            .expect("transaction admitted")
    }

    pub fn admit(&mut self, draft: TransactionDraft) -> EntityId {
        self.session
            .create_transaction(draft)
            .expect("transaction admitted")
    }

    pub fn transaction_errors(&self, id: EntityId) -> ValidationErrors {
        self.session
            .data()
            .transactions()
            .get(id)
            .expect("transaction exists")
            .errors()
    }

    pub fn account_errors(&self, id: EntityId) -> ValidationErrors {
        self.session
            .data()
            .accounts()
            .get(id)
            .expect("account exists")
            .errors()
    }
}
