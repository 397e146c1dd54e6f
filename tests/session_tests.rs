mod common;

use common::{date, Fixture};
use ledger_core::domain::{
    AccountDraft, AccountInfoClass, Identifiable, TransactionClass, TransactionInfoClass,
};
use ledger_core::tracking::{AttributeValue, ChangeTracked, EditState, EntityState};
use ledger_core::LedgerError;
use rust_decimal_macros::dec;

#[test]
fn new_session_shares_storage_until_first_write() {
    let mut fixture = Fixture::new();
    let mut session = fixture.ledger.edit();
    assert!(session.data().shares_storage_with(fixture.ledger.snapshot()));

    session
        .create_account(AccountDraft::new("Wallet", "Cash"))
        .unwrap();
    assert!(!session.data().shares_storage_with(fixture.ledger.snapshot()));
    assert_eq!(
        session.data().accounts().len(),
        fixture.ledger.snapshot().accounts().len() + 1
    );

    drop(session);
    assert!(fixture.ledger.snapshot().accounts().find_by_name("Wallet").is_none());
    fixture.ledger.commit(&mut fixture.session).unwrap();
}

#[test]
fn commit_folds_changes_and_cleans_state() {
    let mut fixture = Fixture::new();
    let wallet = fixture
        .session
        .create_account(AccountDraft::new("Wallet", "Cash"))
        .unwrap();
    assert_eq!(
        fixture.session.data().accounts().get(wallet).unwrap().state(),
        EntityState::New
    );

    let summary = fixture.ledger.commit(&mut fixture.session).unwrap();
    assert_eq!(summary.created, 1);
    let committed = fixture.ledger.snapshot().accounts().get(wallet).unwrap();
    assert_eq!(committed.state(), EntityState::Clean);
    assert!(fixture.session.data().shares_storage_with(fixture.ledger.snapshot()));
}

#[test]
fn no_op_update_leaves_no_history() {
    let mut fixture = Fixture::new();
    let deposit = fixture.deposit;
    let changed = fixture
        .session
        .update_account(deposit, |account| {
            account.values_mut().currency = "GBP".into();
            Ok(())
        })
        .unwrap();
    assert!(!changed);
    let account = fixture.session.data().accounts().get(deposit).unwrap();
    assert_eq!(account.state(), EntityState::Clean);
}

#[test]
fn update_then_undo_restores_clean_state() {
    let mut fixture = Fixture::new();
    let deposit = fixture.deposit;
    let changed = fixture
        .session
        .update_account(deposit, |account| {
            account.values_mut().name = "Rainy Day".into();
            Ok(())
        })
        .unwrap();
    assert!(changed);
    assert_eq!(
        fixture.session.data().accounts().get(deposit).unwrap().state(),
        EntityState::Changed
    );

    fixture.session.undo_account(deposit).unwrap();
    let account = fixture.session.data().accounts().get(deposit).unwrap();
    assert_eq!(account.name(), "Deposit");
    assert_eq!(account.state(), EntityState::Clean);
}

#[test]
fn undo_rolls_back_one_edit_at_a_time() {
    let mut fixture = Fixture::new();
    let (current, shops) = (fixture.current, fixture.shops);
    let spend = fixture.transaction(date(2024, 6, 1), current, shops, TransactionClass::Expense, dec!(5));
    fixture.ledger.commit(&mut fixture.session).unwrap();

    let reconciled = fixture
        .session
        .update_transaction(spend, |transaction| {
            transaction.values_mut().reconciled = true;
            Ok(())
        })
        .unwrap();
    let referenced = fixture
        .session
        .update_transaction(spend, |transaction| {
            transaction.info_mut().set(
                TransactionInfoClass::Reference,
                Some(AttributeValue::ShortText("INV-42".into())),
            )
        })
        .unwrap();
    assert!(reconciled && referenced);

    fixture.session.undo_transaction(spend).unwrap();
    let transaction = fixture.session.data().transactions().get(spend).unwrap();
    assert!(transaction.values().reconciled);
    assert!(transaction.info().get(TransactionInfoClass::Reference).is_none());

    fixture.session.undo_transaction(spend).unwrap();
    let transaction = fixture.session.data().transactions().get(spend).unwrap();
    assert!(!transaction.values().reconciled);
    assert_eq!(transaction.state(), EntityState::Clean);
}

#[test]
fn clean_base_defers_to_extension_state() {
    let mut fixture = Fixture::new();
    let deposit = fixture.deposit;
    fixture
        .session
        .update_account(deposit, |account| {
            account.info_mut().set(
                AccountInfoClass::Notes,
                Some(AttributeValue::String("emergency fund".into())),
            )
        })
        .unwrap();

    let account = fixture.session.data().accounts().get(deposit).unwrap();
    assert_eq!(account.base().state(), EntityState::Clean);
    assert_eq!(account.state(), EntityState::Changed);
    assert_eq!(account.edit_state(), EditState::Valid);
}

#[test]
fn extension_errors_surface_through_a_clean_base() {
    let mut fixture = Fixture::new();
    let deposit = fixture.deposit;
    fixture
        .session
        .update_account(deposit, |account| {
            account.info_mut().set(
                AccountInfoClass::Notes,
                Some(AttributeValue::String("x".repeat(150))),
            )
        })
        .unwrap();

    fixture.session.validate();
    let account = fixture.session.data().accounts().get(deposit).unwrap();
    assert_eq!(account.edit_state(), EditState::Error);
    assert_eq!(account.errors().for_field("Notes").count(), 1);
}

#[test]
fn dirty_base_wins_over_extension() {
    let mut fixture = Fixture::new();
    let deposit = fixture.deposit;
    fixture.session.delete_account(deposit).unwrap();

    let account = fixture.session.data().accounts().get(deposit).unwrap();
    assert_eq!(account.state(), EntityState::Deleted);
    assert!(account.info().is_deleted());
}

#[test]
fn commit_drops_deleted_entities() {
    let mut fixture = Fixture::new();
    let (current, shops) = (fixture.current, fixture.shops);
    let spend = fixture.transaction(date(2024, 6, 1), current, shops, TransactionClass::Expense, dec!(5));
    fixture.ledger.commit(&mut fixture.session).unwrap();
    assert!(fixture.ledger.snapshot().transactions().contains(spend));

    fixture.session.delete_transaction(spend).unwrap();
    let summary = fixture.ledger.commit(&mut fixture.session).unwrap();
    assert_eq!(summary.deleted, 1);
    assert!(!fixture.ledger.snapshot().transactions().contains(spend));
}

#[test]
fn stale_session_is_refused() {
    let mut fixture = Fixture::new();
    let mut other = fixture.ledger.edit();
    fixture
        .session
        .create_account(AccountDraft::new("Wallet", "Cash"))
        .unwrap();
    fixture.ledger.commit(&mut fixture.session).unwrap();

    other
        .create_account(AccountDraft::new("Purse", "Cash"))
        .unwrap();
    assert!(matches!(
        fixture.ledger.commit(&mut other),
        Err(LedgerError::StaleSession)
    ));
}

#[test]
fn references_resolve_by_id_or_name() {
    let mut fixture = Fixture::new();
    let bank = fixture.bank;
    let by_name = fixture
        .session
        .create_account(AccountDraft::new("Easy Saver", "Savings").with_link(AccountInfoClass::Parent, "Bank"))
        .unwrap();
    let by_id = fixture
        .session
        .create_account(AccountDraft::new("Notice Saver", "Savings").with_link(AccountInfoClass::Parent, bank))
        .unwrap();

    let accounts = fixture.session.data().accounts();
    for id in [by_name, by_id] {
        let link = accounts.get(id).unwrap().info().link(AccountInfoClass::Parent).unwrap();
        assert_eq!(link.id, bank);
        assert_eq!(link.name.as_deref(), Some("Bank"));
    }
    assert_eq!(accounts.get(by_id).unwrap().id(), by_id);
}

#[test]
fn duplicate_category_names_are_rejected() {
    let mut fixture = Fixture::new();
    let result = fixture.session.create_account_category(
        "Savings",
        ledger_core::domain::AccountClass::Savings,
        None,
    );
    assert!(matches!(result, Err(LedgerError::DuplicateName { .. })));
}

#[test]
fn mismatched_attribute_type_is_rejected() {
    let mut fixture = Fixture::new();
    let deposit = fixture.deposit;
    let result = fixture.session.update_account(deposit, |account| {
        account
            .info_mut()
            .set(AccountInfoClass::Maturity, Some(AttributeValue::Integer(3)))
    });
    assert!(matches!(result, Err(LedgerError::AttributeType { .. })));
    assert_eq!(
        fixture.session.data().accounts().get(deposit).unwrap().state(),
        EntityState::Clean
    );
}
