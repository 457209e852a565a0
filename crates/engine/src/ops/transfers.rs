use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    Currency, EngineError, ResultEngine, Transaction, TransactionStatus, TransferCmd, User,
    transactions, users,
};

use super::{Engine, require_positive_amount, with_tx};

/// One page of a user's transaction history plus the overall total.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub count: u64,
}

impl Engine {
    /// Send money from one user to another in a shared currency.
    ///
    /// Both users must hold a wallet in the transfer currency. The debit,
    /// the credit and the ledger row commit atomically; the balance writes
    /// are version-guarded, so two settlements racing over the same wallet
    /// cannot both apply against the same starting balance.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<Transaction> {
        require_positive_amount("amount", cmd.amount)?;

        let settled = with_tx!(self, |db_tx| {
            let currency = self
                .require_currency_by_code(&db_tx, &cmd.currency_code)
                .await?;
            let to_user = self.require_visible_user(&db_tx, cmd.to_user_id).await?;
            if to_user.id == cmd.from_user_id {
                return Err(EngineError::SelfTransfer);
            }

            let sender_wallet = self
                .wallet_in_currency(&db_tx, cmd.from_user_id, currency.id)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("No Wallet matches the given query.".to_string())
                })?;
            if sender_wallet.balance < cmd.amount {
                return Err(EngineError::InsufficientFunds(
                    "You don't have enough money to send.".to_string(),
                ));
            }
            let receiver_wallet = self
                .wallet_in_currency(&db_tx, to_user.id, currency.id)
                .await?
                .ok_or(EngineError::ReceiverWalletMissing)?;

            self.write_wallet_balance(&db_tx, &sender_wallet, sender_wallet.balance - cmd.amount)
                .await?;
            self.write_wallet_balance(
                &db_tx,
                &receiver_wallet,
                receiver_wallet.balance + cmd.amount,
            )
            .await?;

            let sender = users::Entity::find_by_id(cmd.from_user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("user {}", cmd.from_user_id)))?;

            let now = Utc::now();
            let model = transactions::ActiveModel {
                from_user_id: ActiveValue::Set(cmd.from_user_id),
                to_user_id: ActiveValue::Set(to_user.id),
                currency_id: ActiveValue::Set(currency.id),
                amount: ActiveValue::Set(cmd.amount),
                status: ActiveValue::Set(TransactionStatus::Successful.as_str().to_string()),
                paid_at: ActiveValue::Set(now),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Transaction::from_parts(
                model,
                User::from(sender),
                User::from(to_user),
                Currency::from(currency),
            )
        })?;

        tracing::info!(
            transaction_id = settled.id,
            from_user_id = settled.from_user.id,
            to_user_id = settled.to_user.id,
            currency = %settled.currency.code,
            amount = settled.amount,
            "transfer settled"
        );
        Ok(settled)
    }

    /// One page of the transactions the user took part in, newest first.
    ///
    /// Covers both directions: rows where the user is the sender and rows
    /// where the user is the receiver. `count` is the total across all
    /// pages.
    pub async fn list_transactions(
        &self,
        user_id: i32,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<TransactionPage> {
        with_tx!(self, |db_tx| {
            let involving = transactions::Entity::find().filter(
                Condition::any()
                    .add(transactions::Column::FromUserId.eq(user_id))
                    .add(transactions::Column::ToUserId.eq(user_id)),
            );
            let count = involving.clone().count(&db_tx).await?;
            let rows = involving
                .order_by_desc(transactions::Column::Id)
                .limit(limit)
                .offset(offset)
                .all(&db_tx)
                .await?;

            let mut user_ids = Vec::with_capacity(rows.len() * 2);
            let mut currency_ids = Vec::with_capacity(rows.len());
            for row in &rows {
                user_ids.push(row.from_user_id);
                user_ids.push(row.to_user_id);
                currency_ids.push(row.currency_id);
            }
            let user_map = users_by_id(&db_tx, user_ids).await?;
            let currency_map = self.currencies_by_id(&db_tx, currency_ids).await?;

            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                let from_user = user_map
                    .get(&row.from_user_id)
                    .cloned()
                    .ok_or_else(|| missing_user(row.from_user_id, row.id))?;
                let to_user = user_map
                    .get(&row.to_user_id)
                    .cloned()
                    .ok_or_else(|| missing_user(row.to_user_id, row.id))?;
                let currency = currency_map
                    .get(&row.currency_id)
                    .cloned()
                    .ok_or_else(|| missing_currency(row.currency_id, row.id))?;
                items.push(Transaction::from_parts(row, from_user, to_user, currency)?);
            }

            Ok(TransactionPage { items, count })
        })
    }
}

/// Load the referenced users in one query, keyed by id.
///
/// Ledger rows keep pointing at users who later go inactive or staff, so
/// this deliberately skips the visibility predicate.
async fn users_by_id(
    db_tx: &DatabaseTransaction,
    ids: Vec<i32>,
) -> ResultEngine<HashMap<i32, User>> {
    let models = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db_tx)
        .await?;
    Ok(models
        .into_iter()
        .map(|model| (model.id, User::from(model)))
        .collect())
}

fn missing_user(user_id: i32, transaction_id: i32) -> EngineError {
    EngineError::Database(DbErr::RecordNotFound(format!(
        "user {user_id} for transaction {transaction_id}"
    )))
}

fn missing_currency(currency_id: i32, transaction_id: i32) -> EngineError {
    EngineError::Database(DbErr::RecordNotFound(format!(
        "currency {currency_id} for transaction {transaction_id}"
    )))
}
