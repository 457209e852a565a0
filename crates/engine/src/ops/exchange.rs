use sea_orm::{DatabaseTransaction, TransactionTrait, prelude::*};

use crate::{Currency, EngineError, ExchangeCmd, ResultEngine, Wallet, WalletSide, wallets};

use super::{Engine, require_positive_amount, with_tx};

/// Result of a currency exchange: both wallets as stored after the swap.
///
/// Exchanges leave no ledger row; the outcome is the caller's only record
/// besides the log.
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeOutcome {
    pub from_wallet: Wallet,
    pub to_wallet: Wallet,
    pub from_amount: f64,
    pub to_amount: f64,
}

impl Engine {
    /// Convert funds between two wallets of the same user at the stored
    /// directed rate.
    ///
    /// The rate lookup never inverts a pair: converting back requires its
    /// own record. Debit and credit are version-guarded and commit
    /// atomically.
    pub async fn exchange(&self, cmd: ExchangeCmd) -> ResultEngine<ExchangeOutcome> {
        require_positive_amount("from_amount", cmd.from_amount)?;
        if cmd.from_wallet_id == cmd.to_wallet_id {
            return Err(EngineError::InvalidAmount(
                "to_wallet",
                "Source and target wallet must differ.".to_string(),
            ));
        }

        let outcome = with_tx!(self, |db_tx| {
            let from_model = self
                .require_owned_wallet(&db_tx, cmd.user_id, cmd.from_wallet_id, WalletSide::Source)
                .await?;
            let to_model = self
                .require_owned_wallet(&db_tx, cmd.user_id, cmd.to_wallet_id, WalletSide::Target)
                .await?;

            if from_model.balance < cmd.from_amount {
                return Err(EngineError::InsufficientFunds(
                    "You don't have enough money to exchange.".to_string(),
                ));
            }

            let from_currency = self
                .require_currency_by_id(&db_tx, from_model.currency_id)
                .await?;
            let to_currency = self
                .require_currency_by_id(&db_tx, to_model.currency_id)
                .await?;
            let rate = self
                .rate_between(&db_tx, from_currency.id, to_currency.id)
                .await?
                .ok_or_else(|| {
                    EngineError::RateNotFound(from_currency.code.clone(), to_currency.code.clone())
                })?;
            let to_amount = cmd.from_amount * rate.amount;

            let from_balance = from_model.balance - cmd.from_amount;
            let to_balance = to_model.balance + to_amount;
            self.write_wallet_balance(&db_tx, &from_model, from_balance)
                .await?;
            self.write_wallet_balance(&db_tx, &to_model, to_balance)
                .await?;

            let from_wallet = Wallet::from((
                wallets::Model {
                    balance: from_balance,
                    version: from_model.version + 1,
                    ..from_model
                },
                Currency::from(from_currency),
            ));
            let to_wallet = Wallet::from((
                wallets::Model {
                    balance: to_balance,
                    version: to_model.version + 1,
                    ..to_model
                },
                Currency::from(to_currency),
            ));

            Ok::<_, EngineError>(ExchangeOutcome {
                from_wallet,
                to_wallet,
                from_amount: cmd.from_amount,
                to_amount,
            })
        })?;

        tracing::info!(
            user_id = cmd.user_id,
            from_wallet_id = outcome.from_wallet.id,
            to_wallet_id = outcome.to_wallet.id,
            from_currency = %outcome.from_wallet.currency.code,
            to_currency = %outcome.to_wallet.currency.code,
            from_amount = outcome.from_amount,
            to_amount = outcome.to_amount,
            "currencies exchanged"
        );
        Ok(outcome)
    }

    /// Load a wallet referenced by an exchange request and check it belongs
    /// to the caller.
    ///
    /// Unlike the store lookups, the query is not scoped to the owner: a
    /// real wallet owned by someone else must report as an ownership error,
    /// not as an unknown id.
    async fn require_owned_wallet(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
        wallet_id: i32,
        side: WalletSide,
    ) -> ResultEngine<wallets::Model> {
        let model = wallets::Entity::find_by_id(wallet_id)
            .one(db_tx)
            .await?
            .ok_or(EngineError::UnknownWallet(side, wallet_id))?;
        if model.user_id != user_id {
            return Err(EngineError::NotWalletOwner(side));
        }
        Ok(model)
    }
}
