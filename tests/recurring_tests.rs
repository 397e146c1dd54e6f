mod common;

use common::{class_name, date, money, Fixture};
use ledger_core::domain::dates::shift_months;
use ledger_core::domain::{
    AccountDraft, AccountInfoClass, EntityId, Frequency, PatternDraft, TaxYearRange,
    TransactionClass, TransactionInfoClass,
};
use ledger_core::tracking::AttributeValue;
use ledger_core::LedgerError;
use rust_decimal_macros::dec;

fn year_2025() -> TaxYearRange {
    TaxYearRange::ending(date(2025, 4, 5))
}

fn add_pattern(
    fixture: &mut Fixture,
    anchor: chrono::NaiveDate,
    frequency: Frequency,
    debit: EntityId,
    credit: EntityId,
    class: TransactionClass,
    amount: rust_decimal::Decimal,
) -> EntityId {
    fixture
        .session
        .create_pattern(PatternDraft {
            date: anchor,
            frequency,
            debit: debit.into(),
            credit: credit.into(),
            category: class_name(class).as_str().into(),
            amount: money(amount),
        })
        .expect("pattern admitted")
}

#[test]
fn monthly_pattern_yields_twelve_dated_a_month_apart() {
    let mut fixture = Fixture::new();
    let (current, shops) = (fixture.current, fixture.shops);
    let pattern = add_pattern(
        &mut fixture,
        date(1999, 4, 10),
        Frequency::Monthly,
        current,
        shops,
        TransactionClass::Expense,
        dec!(45),
    );

    let drafts = fixture.session.expand_patterns(year_2025()).unwrap();
    assert_eq!(drafts.len(), 12);
    let year = year_2025();
    for (index, draft) in drafts.iter().enumerate() {
        assert!(year.contains(draft.date));
        assert_eq!(draft.date, shift_months(date(2024, 4, 10), index as i32));
        assert_eq!(draft.template, Some(pattern));
    }
}

#[test]
fn maturity_pattern_without_maturity_date_yields_nothing() {
    let mut fixture = Fixture::new();
    let current = fixture.current;
    let bond = fixture
        .session
        .create_account(AccountDraft::new("Savings Bond", "Bond"))
        .unwrap();
    add_pattern(
        &mut fixture,
        date(1999, 9, 1),
        Frequency::Maturity,
        bond,
        current,
        TransactionClass::Transfer,
        dec!(1000),
    );

    assert!(fixture.session.expand_patterns(year_2025()).unwrap().is_empty());
}

#[test]
fn maturity_pattern_fires_on_maturity_date() {
    let mut fixture = Fixture::new();
    let current = fixture.current;
    let bond = fixture
        .session
        .create_account(AccountDraft::new("Savings Bond", "Bond").with_info(
            AccountInfoClass::Maturity,
            AttributeValue::Date(date(2024, 11, 30)),
        ))
        .unwrap();
    add_pattern(
        &mut fixture,
        date(1999, 9, 1),
        Frequency::Maturity,
        bond,
        current,
        TransactionClass::Transfer,
        dec!(1000),
    );

    let drafts = fixture.session.expand_patterns(year_2025()).unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].date, date(2024, 11, 30));
    let next_year = TaxYearRange::ending(date(2026, 4, 5));
    assert!(fixture.session.expand_patterns(next_year).unwrap().is_empty());
}

#[test]
fn deleted_patterns_do_not_expand() {
    let mut fixture = Fixture::new();
    let (current, shops) = (fixture.current, fixture.shops);
    let pattern = add_pattern(
        &mut fixture,
        date(1999, 4, 10),
        Frequency::Quarterly,
        current,
        shops,
        TransactionClass::Expense,
        dec!(45),
    );
    fixture.session.delete_pattern(pattern).unwrap();

    assert!(fixture.session.expand_patterns(year_2025()).unwrap().is_empty());
}

#[test]
fn materialized_salary_carries_a_seeded_tax_credit() {
    let mut fixture = Fixture::new();
    let (employer, current) = (fixture.employer, fixture.current);
    add_pattern(
        &mut fixture,
        date(1999, 4, 25),
        Frequency::Monthly,
        employer,
        current,
        TransactionClass::TaxedIncome,
        dec!(1600),
    );

    let created = fixture.session.materialize_patterns(fixture.tax_year).unwrap();
    assert_eq!(created.len(), 12);
    for id in &created {
        let transaction = fixture.session.data().transactions().get(*id).unwrap();
        assert_eq!(
            transaction.info().money(TransactionInfoClass::TaxCredit),
            Some(money(dec!(400)))
        );
    }

    assert_eq!(fixture.session.validate(), 0);
    let summary = fixture.ledger.commit(&mut fixture.session).unwrap();
    assert_eq!(summary.created, 13);
}

#[test]
fn tax_free_interest_is_not_seeded() {
    let mut fixture = Fixture::new();
    let (isa, deposit, current) = (fixture.isa, fixture.deposit, fixture.current);
    add_pattern(
        &mut fixture,
        date(1999, 12, 31),
        Frequency::Annually,
        isa,
        current,
        TransactionClass::Interest,
        dec!(30),
    );
    add_pattern(
        &mut fixture,
        date(1999, 12, 31),
        Frequency::Annually,
        deposit,
        current,
        TransactionClass::Interest,
        dec!(40),
    );

    let created = fixture.session.materialize_patterns(fixture.tax_year).unwrap();
    assert_eq!(created.len(), 2);
    let data = fixture.session.data();
    let credits: Vec<_> = created
        .iter()
        .map(|id| {
            data.transactions()
                .get(*id)
                .unwrap()
                .info()
                .money(TransactionInfoClass::TaxCredit)
        })
        .collect();
    assert_eq!(credits, vec![None, Some(money(dec!(10)))]);
}

#[test]
fn pattern_with_generated_transactions_cannot_be_deleted() {
    let mut fixture = Fixture::new();
    let (current, shops) = (fixture.current, fixture.shops);
    let pattern = add_pattern(
        &mut fixture,
        date(1999, 12, 31),
        Frequency::Annually,
        current,
        shops,
        TransactionClass::Expense,
        dec!(120),
    );
    let created = fixture.session.materialize_patterns(fixture.tax_year).unwrap();
    assert_eq!(created.len(), 1);
    fixture.ledger.commit(&mut fixture.session).unwrap();

    fixture.session.delete_pattern(pattern).unwrap();
    assert!(matches!(
        fixture.ledger.commit(&mut fixture.session),
        Err(LedgerError::ValidationFailed { .. })
    ));
    let errors = fixture.session.data().patterns().get(pattern).unwrap().errors().clone();
    assert_eq!(errors.for_field("Deleted").count(), 1);
    assert_eq!(fixture.transaction_errors(created[0]).for_field("Template").count(), 1);

    fixture.session.delete_transaction(created[0]).unwrap();
    let summary = fixture.ledger.commit(&mut fixture.session).unwrap();
    assert_eq!(summary.deleted, 2);
    assert!(!fixture.ledger.snapshot().patterns().contains(pattern));
}

#[test]
fn failed_materialization_admits_nothing() {
    let mut fixture = Fixture::new();
    let (current, shops) = (fixture.current, fixture.shops);
    let gym = fixture
        .session
        .create_account(AccountDraft::new("Gym", "Payee"))
        .unwrap();
    add_pattern(
        &mut fixture,
        date(1999, 4, 10),
        Frequency::Monthly,
        current,
        shops,
        TransactionClass::Expense,
        dec!(45),
    );
    add_pattern(
        &mut fixture,
        date(1999, 5, 1),
        Frequency::Monthly,
        current,
        gym,
        TransactionClass::Expense,
        dec!(30),
    );
    fixture.ledger.commit(&mut fixture.session).unwrap();
    fixture.session.delete_account(gym).unwrap();

    let before = fixture.session.data().transactions().len();
    let result = fixture.session.materialize_patterns(fixture.tax_year);
    assert!(matches!(
        result,
        Err(LedgerError::UnresolvedReference { field: "Credit", .. })
    ));
    assert_eq!(fixture.session.data().transactions().len(), before);
}
