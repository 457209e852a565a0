use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, EngineError, ExchangeCmd, NewUserCmd, NewWalletCmd, TransactionStatus, TransferCmd,
    UpdateWalletCmd, WalletSide,
};

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn member(engine: &Engine, email: &str, name: &str) -> i32 {
    engine
        .create_user(NewUserCmd::new(email, name, "password"))
        .await
        .unwrap()
        .id
}

async fn usd_and_eur(engine: &Engine) {
    engine
        .create_currency("USD", "United States dollar")
        .await
        .unwrap();
    engine.create_currency("EUR", "Euro").await.unwrap();
}

async fn balance_of(engine: &Engine, user_id: i32, wallet_id: i32) -> f64 {
    engine.wallet(user_id, wallet_id).await.unwrap().balance
}

async fn wallet_version(db: &DatabaseConnection, wallet_id: i32) -> i64 {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT version FROM wallets WHERE id = ?",
            [wallet_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "version").unwrap()
}

#[tokio::test]
async fn transfer_moves_funds_and_records_ledger_row() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    let alice_wallet = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 100.0))
        .await
        .unwrap();
    let bob_wallet = engine
        .new_wallet(NewWalletCmd::new(bob, "USD", "Main", 50.0))
        .await
        .unwrap();

    let settled = engine
        .transfer(TransferCmd::new(alice, bob, "USD", 30.0))
        .await
        .unwrap();

    assert_eq!(settled.status, TransactionStatus::Successful);
    assert_eq!(settled.from_user.id, alice);
    assert_eq!(settled.to_user.id, bob);
    assert_eq!(settled.amount, 30.0);
    assert_eq!(settled.currency.code, "USD");

    let alice_after = balance_of(&engine, alice, alice_wallet.id).await;
    let bob_after = balance_of(&engine, bob, bob_wallet.id).await;
    assert_eq!(alice_after, 70.0);
    assert_eq!(bob_after, 80.0);
    // sum conserved
    assert_eq!(alice_after + bob_after, 150.0);

    let page = engine.list_transactions(alice, 10, 0).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].id, settled.id);
}

#[tokio::test]
async fn transfer_with_insufficient_funds_leaves_balances_unchanged() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    let alice_wallet = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 10.0))
        .await
        .unwrap();
    let bob_wallet = engine
        .new_wallet(NewWalletCmd::new(bob, "USD", "Main", 0.0))
        .await
        .unwrap();

    let err = engine
        .transfer(TransferCmd::new(alice, bob, "USD", 10.5))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    assert_eq!(balance_of(&engine, alice, alice_wallet.id).await, 10.0);
    assert_eq!(balance_of(&engine, bob, bob_wallet.id).await, 0.0);
    assert_eq!(engine.list_transactions(alice, 10, 0).await.unwrap().count, 0);
}

#[tokio::test]
async fn transfer_to_self_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let wallet = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 100.0))
        .await
        .unwrap();

    let err = engine
        .transfer(TransferCmd::new(alice, alice, "USD", 5.0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::SelfTransfer);
    assert_eq!(balance_of(&engine, alice, wallet.id).await, 100.0);
}

#[tokio::test]
async fn transfer_without_sender_wallet_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    engine
        .new_wallet(NewWalletCmd::new(bob, "USD", "Main", 0.0))
        .await
        .unwrap();

    let err = engine
        .transfer(TransferCmd::new(alice, bob, "USD", 5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn transfer_to_receiver_without_wallet_leaves_no_trace() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    let alice_wallet = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 100.0))
        .await
        .unwrap();

    let err = engine
        .transfer(TransferCmd::new(alice, bob, "USD", 5.0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ReceiverWalletMissing);

    // the sender debit rolled back with the transaction
    assert_eq!(balance_of(&engine, alice, alice_wallet.id).await, 100.0);
    assert_eq!(engine.list_transactions(alice, 10, 0).await.unwrap().count, 0);
}

#[tokio::test]
async fn transfer_rejects_non_positive_amounts() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;

    for amount in [0.0, -12.5] {
        let err = engine
            .transfer(TransferCmd::new(alice, bob, "USD", amount))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount("amount", _)));
    }
}

#[tokio::test]
async fn transfer_with_unknown_currency_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;

    let err = engine
        .transfer(TransferCmd::new(alice, bob, "XYZ", 5.0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UnknownCurrency("XYZ".to_string()));
}

#[tokio::test]
async fn hidden_receivers_are_invisible_to_transfers() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 100.0))
        .await
        .unwrap();

    let staff = engine
        .create_user(NewUserCmd::new("staff@example.com", "Staff", "password").staff(true))
        .await
        .unwrap();
    let inactive = engine
        .create_user(NewUserCmd::new("gone@example.com", "Gone", "password").active(false))
        .await
        .unwrap();

    for hidden in [staff.id, inactive.id] {
        let err = engine
            .transfer(TransferCmd::new(alice, hidden, "USD", 5.0))
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownUser(hidden));
    }
}

#[tokio::test]
async fn exchange_applies_the_directed_rate() {
    let (engine, db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    engine.set_rate("USD", "EUR", 0.9).await.unwrap();
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let usd = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Dollars", 100.0))
        .await
        .unwrap();
    let eur = engine
        .new_wallet(NewWalletCmd::new(alice, "EUR", "Euros", 0.0))
        .await
        .unwrap();

    let outcome = engine
        .exchange(ExchangeCmd::new(alice, usd.id, eur.id, 10.0))
        .await
        .unwrap();

    assert_eq!(outcome.from_wallet.balance, 90.0);
    assert_eq!(outcome.to_wallet.balance, 9.0);
    assert_eq!(outcome.to_amount, 9.0);

    // stored balances match what the outcome reported
    assert_eq!(balance_of(&engine, alice, usd.id).await, 90.0);
    assert_eq!(balance_of(&engine, alice, eur.id).await, 9.0);

    // each balance write bumps the wallet version
    assert_eq!(wallet_version(&db, usd.id).await, 1);
    assert_eq!(wallet_version(&db, eur.id).await, 1);
}

#[tokio::test]
async fn exchange_requires_the_exact_direction() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    // only the reverse pair exists
    engine.set_rate("EUR", "USD", 1.1).await.unwrap();
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let usd = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Dollars", 100.0))
        .await
        .unwrap();
    let eur = engine
        .new_wallet(NewWalletCmd::new(alice, "EUR", "Euros", 0.0))
        .await
        .unwrap();

    let err = engine
        .exchange(ExchangeCmd::new(alice, usd.id, eur.id, 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::RateNotFound(_, _)));
    assert_eq!(balance_of(&engine, alice, usd.id).await, 100.0);
}

#[tokio::test]
async fn exchange_with_insufficient_funds_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    engine.set_rate("USD", "EUR", 0.9).await.unwrap();
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let usd = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Dollars", 5.0))
        .await
        .unwrap();
    let eur = engine
        .new_wallet(NewWalletCmd::new(alice, "EUR", "Euros", 0.0))
        .await
        .unwrap();

    let err = engine
        .exchange(ExchangeCmd::new(alice, usd.id, eur.id, 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
}

#[tokio::test]
async fn exchange_checks_ownership_of_both_wallets() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    engine.set_rate("USD", "EUR", 0.9).await.unwrap();
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    let alice_usd = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Dollars", 100.0))
        .await
        .unwrap();
    let bob_usd = engine
        .new_wallet(NewWalletCmd::new(bob, "USD", "Dollars", 100.0))
        .await
        .unwrap();
    let bob_eur = engine
        .new_wallet(NewWalletCmd::new(bob, "EUR", "Euros", 0.0))
        .await
        .unwrap();

    let err = engine
        .exchange(ExchangeCmd::new(alice, bob_usd.id, bob_eur.id, 10.0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotWalletOwner(WalletSide::Source));

    let err = engine
        .exchange(ExchangeCmd::new(alice, alice_usd.id, bob_eur.id, 10.0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotWalletOwner(WalletSide::Target));
}

#[tokio::test]
async fn exchange_between_the_same_wallet_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let usd = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Dollars", 100.0))
        .await
        .unwrap();

    let err = engine
        .exchange(ExchangeCmd::new(alice, usd.id, usd.id, 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount("to_wallet", _)));
}

#[tokio::test]
async fn second_wallet_in_a_currency_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 0.0))
        .await
        .unwrap();

    let err = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Second", 0.0))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::DuplicateWallet);

    // a different currency is fine
    engine
        .new_wallet(NewWalletCmd::new(alice, "EUR", "Euros", 0.0))
        .await
        .unwrap();
}

#[tokio::test]
async fn wallet_update_is_partial_and_guarded() {
    let (engine, db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let wallet = engine
        .new_wallet(NewWalletCmd::new(alice, "USD", "Main", 25.0))
        .await
        .unwrap();

    let renamed = engine
        .update_wallet(UpdateWalletCmd::new(alice, wallet.id).name("Savings"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Savings");
    assert_eq!(renamed.balance, 25.0);

    let topped_up = engine
        .update_wallet(UpdateWalletCmd::new(alice, wallet.id).balance(40.0))
        .await
        .unwrap();
    assert_eq!(topped_up.name, "Savings");
    assert_eq!(topped_up.balance, 40.0);
    assert_eq!(topped_up.currency.code, "USD");

    assert_eq!(wallet_version(&db, wallet.id).await, 2);

    let err = engine
        .update_wallet(UpdateWalletCmd::new(alice, wallet.id).balance(-1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount("balance", _)));

    let err = engine
        .update_wallet(UpdateWalletCmd::new(alice, wallet.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_, _)));
}

#[tokio::test]
async fn wallet_lookups_are_scoped_to_the_owner() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    let bob_wallet = engine
        .new_wallet(NewWalletCmd::new(bob, "USD", "Main", 0.0))
        .await
        .unwrap();

    let err = engine.wallet(alice, bob_wallet.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .update_wallet(UpdateWalletCmd::new(alice, bob_wallet.id).balance(1000.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert!(engine.list_wallets(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn transaction_history_pages_newest_first_in_both_directions() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;
    let alice = member(&engine, "alice@example.com", "Alice").await;
    let bob = member(&engine, "bob@example.com", "Bob").await;
    let carol = member(&engine, "carol@example.com", "Carol").await;
    for (user, balance) in [(alice, 100.0), (bob, 100.0), (carol, 100.0)] {
        engine
            .new_wallet(NewWalletCmd::new(user, "USD", "Main", balance))
            .await
            .unwrap();
    }

    let first = engine
        .transfer(TransferCmd::new(alice, bob, "USD", 1.0))
        .await
        .unwrap();
    let second = engine
        .transfer(TransferCmd::new(carol, bob, "USD", 2.0))
        .await
        .unwrap();
    let third = engine
        .transfer(TransferCmd::new(bob, alice, "USD", 3.0))
        .await
        .unwrap();

    // bob took part in all three, newest first
    let page = engine.list_transactions(bob, 10, 0).await.unwrap();
    assert_eq!(page.count, 3);
    let ids: Vec<i32> = page.items.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    // carol only in the one she sent
    let page = engine.list_transactions(carol, 10, 0).await.unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].id, second.id);

    // limit/offset walk the same ordering
    let page = engine.list_transactions(bob, 1, 1).await.unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, second.id);
}

#[tokio::test]
async fn rate_set_upserts_the_ordered_pair() {
    let (engine, _db) = engine_with_db().await;
    usd_and_eur(&engine).await;

    engine.set_rate("USD", "EUR", 0.9).await.unwrap();
    engine.set_rate("USD", "EUR", 0.95).await.unwrap();
    engine.set_rate("EUR", "USD", 1.05).await.unwrap();

    let rates = engine.list_exchange_rates().await.unwrap();
    assert_eq!(rates.len(), 2);
    let usd_eur = rates
        .iter()
        .find(|r| r.from_currency.code == "USD")
        .unwrap();
    assert_eq!(usd_eur.amount, 0.95);
}

#[tokio::test]
async fn currencies_are_unique_by_code_and_name() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_currency("USD", "United States dollar")
        .await
        .unwrap();

    let err = engine
        .create_currency("USD", "Dollar again")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .create_currency("USX", "United States dollar")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}
