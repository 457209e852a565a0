use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};

use crate::{
    Currency, EngineError, NewWalletCmd, ResultEngine, UpdateWalletCmd, Wallet, currencies,
    wallets,
};

use super::{Engine, normalize_required_name, require_non_negative_amount, with_tx};

/// 404 detail for wallet lookups scoped to the caller.
const NO_WALLET_MATCH: &str = "No Wallet matches the given query.";

impl Engine {
    /// Open a wallet for a user in a given currency.
    ///
    /// A user can hold at most one wallet per currency, so a second request
    /// for the same currency is rejected rather than silently returning the
    /// existing wallet.
    pub async fn new_wallet(&self, cmd: NewWalletCmd) -> ResultEngine<Wallet> {
        require_non_negative_amount("balance", cmd.balance)?;
        let name = normalize_required_name(&cmd.name)?;

        with_tx!(self, |db_tx| {
            let currency = self
                .require_currency_by_code(&db_tx, &cmd.currency_code)
                .await?;
            let clash = self
                .wallet_in_currency(&db_tx, cmd.user_id, currency.id)
                .await?;
            if clash.is_some() {
                return Err(EngineError::DuplicateWallet);
            }

            let now = Utc::now();
            let model = wallets::ActiveModel {
                user_id: ActiveValue::Set(cmd.user_id),
                currency_id: ActiveValue::Set(currency.id),
                name: ActiveValue::Set(name),
                balance: ActiveValue::Set(cmd.balance),
                version: ActiveValue::Set(0),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(Wallet::from((model, Currency::from(currency))))
        })
    }

    /// A single wallet owned by the caller.
    ///
    /// The query is scoped to the owner, so someone else's wallet id comes
    /// back as not-found rather than forbidden.
    pub async fn wallet(&self, user_id: i32, wallet_id: i32) -> ResultEngine<Wallet> {
        let found = wallets::Entity::find_by_id(wallet_id)
            .filter(wallets::Column::UserId.eq(user_id))
            .find_also_related(currencies::Entity)
            .one(&self.database)
            .await?;
        let (model, currency) =
            found.ok_or_else(|| EngineError::KeyNotFound(NO_WALLET_MATCH.to_string()))?;
        let currency = require_related_currency(&model, currency)?;
        Ok(Wallet::from((model, currency)))
    }

    /// All wallets owned by the caller, oldest first.
    pub async fn list_wallets(&self, user_id: i32) -> ResultEngine<Vec<Wallet>> {
        let rows = wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .find_also_related(currencies::Entity)
            .order_by_asc(wallets::Column::Id)
            .all(&self.database)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (model, currency) in rows {
            let currency = require_related_currency(&model, currency)?;
            out.push(Wallet::from((model, currency)));
        }
        Ok(out)
    }

    /// Rename a wallet and/or set its balance directly.
    ///
    /// The currency is fixed at creation. A direct balance write goes through
    /// the same versioned update as settlement, so it cannot clobber a
    /// concurrent transfer.
    pub async fn update_wallet(&self, cmd: UpdateWalletCmd) -> ResultEngine<Wallet> {
        if cmd.name.is_none() && cmd.balance.is_none() {
            return Err(EngineError::InvalidAmount(
                "non_field_errors",
                "At least one field must be provided.".to_string(),
            ));
        }
        let name = match &cmd.name {
            Some(name) => Some(normalize_required_name(name)?),
            None => None,
        };
        if let Some(balance) = cmd.balance {
            require_non_negative_amount("balance", balance)?;
        }

        with_tx!(self, |db_tx| {
            let found = wallets::Entity::find_by_id(cmd.wallet_id)
                .filter(wallets::Column::UserId.eq(cmd.user_id))
                .find_also_related(currencies::Entity)
                .one(&db_tx)
                .await?;
            let (model, currency) =
                found.ok_or_else(|| EngineError::KeyNotFound(NO_WALLET_MATCH.to_string()))?;
            let currency = require_related_currency(&model, currency)?;

            let now = Utc::now();
            let mut update = wallets::Entity::update_many()
                .col_expr(wallets::Column::Version, Expr::value(model.version + 1))
                .col_expr(wallets::Column::UpdatedAt, Expr::value(now));
            if let Some(name) = &name {
                update = update.col_expr(wallets::Column::Name, Expr::value(name.clone()));
            }
            if let Some(balance) = cmd.balance {
                update = update.col_expr(wallets::Column::Balance, Expr::value(balance));
            }
            let written = update
                .filter(wallets::Column::Id.eq(model.id))
                .filter(wallets::Column::Version.eq(model.version))
                .exec(&db_tx)
                .await?;
            if written.rows_affected == 0 {
                return Err(EngineError::BalanceConflict(
                    "Wallet changed concurrently, please retry.".to_string(),
                ));
            }

            let model = wallets::Model {
                name: name.unwrap_or(model.name),
                balance: cmd.balance.unwrap_or(model.balance),
                version: model.version + 1,
                updated_at: now,
                ..model
            };
            Ok(Wallet::from((model, currency)))
        })
    }

    /// The caller's wallet in a currency, if any.
    pub(crate) async fn wallet_in_currency(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
        currency_id: i32,
    ) -> ResultEngine<Option<wallets::Model>> {
        Ok(wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .filter(wallets::Column::CurrencyId.eq(currency_id))
            .one(db_tx)
            .await?)
    }

    /// Write a wallet balance guarded by the version the caller read.
    ///
    /// The update only lands if no one else has written the wallet since it
    /// was loaded; otherwise the settlement must be retried.
    pub(crate) async fn write_wallet_balance(
        &self,
        db_tx: &DatabaseTransaction,
        wallet: &wallets::Model,
        balance: f64,
    ) -> ResultEngine<()> {
        let written = wallets::Entity::update_many()
            .col_expr(wallets::Column::Balance, Expr::value(balance))
            .col_expr(wallets::Column::Version, Expr::value(wallet.version + 1))
            .col_expr(wallets::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wallets::Column::Id.eq(wallet.id))
            .filter(wallets::Column::Version.eq(wallet.version))
            .exec(db_tx)
            .await?;
        if written.rows_affected == 0 {
            return Err(EngineError::BalanceConflict(
                "Wallet changed concurrently, please retry.".to_string(),
            ));
        }
        Ok(())
    }
}

/// A wallet row always has a currency; a missing join row is storage
/// corruption, not a user error.
fn require_related_currency(
    wallet: &wallets::Model,
    currency: Option<currencies::Model>,
) -> ResultEngine<Currency> {
    let currency = currency.ok_or_else(|| {
        DbErr::RecordNotFound(format!(
            "currency {} for wallet {}",
            wallet.currency_id, wallet.id
        ))
    })?;
    Ok(Currency::from(currency))
}

#[cfg(test)]
mod tests {
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

    use crate::{Engine, EngineError, NewUserCmd, NewWalletCmd, Wallet, wallets};

    use super::*;

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

    async fn funded_wallet(engine: &Engine) -> (i32, Wallet) {
        let user = engine
            .create_user(NewUserCmd::new("alice@example.com", "Alice", "password"))
            .await
            .unwrap();
        engine
            .create_currency("USD", "United States dollar")
            .await
            .unwrap();
        let wallet = engine
            .new_wallet(NewWalletCmd::new(user.id, "USD", "Main", 100.0))
            .await
            .unwrap();
        (user.id, wallet)
    }

    #[tokio::test]
    async fn stale_version_write_is_rejected_and_rolls_back() {
        let (engine, db) = engine_with_db().await;
        let (user_id, wallet) = funded_wallet(&engine).await;

        let stale = wallets::Entity::find_by_id(wallet.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();

        // another settlement lands between the read and the write
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "UPDATE wallets SET version = version + 1 WHERE id = ?",
            [wallet.id.into()],
        ))
        .await
        .unwrap();

        let db_tx = db.begin().await.unwrap();
        let err = engine
            .write_wallet_balance(&db_tx, &stale, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::BalanceConflict(_)));
        // dropping the transaction rolls back, as a failed settlement would
        drop(db_tx);

        let after = engine.wallet(user_id, wallet.id).await.unwrap();
        assert_eq!(after.balance, 100.0);

        // a fresh read-modify-write still goes through
        let updated = engine
            .update_wallet(crate::UpdateWalletCmd::new(user_id, wallet.id).balance(55.0))
            .await
            .unwrap();
        assert_eq!(updated.balance, 55.0);
    }
}
