use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{Currency, EngineError, ExchangeRate, ResultEngine, exchange_rates};

use super::{Engine, require_positive_amount, with_tx};

impl Engine {
    /// All configured rates with their currencies, oldest first.
    pub async fn list_exchange_rates(&self) -> ResultEngine<Vec<ExchangeRate>> {
        with_tx!(self, |db_tx| {
            let models = exchange_rates::Entity::find()
                .order_by_asc(exchange_rates::Column::Id)
                .all(&db_tx)
                .await?;

            let mut ids = Vec::with_capacity(models.len() * 2);
            for model in &models {
                ids.push(model.from_currency_id);
                ids.push(model.to_currency_id);
            }
            let currencies = self.currencies_by_id(&db_tx, ids).await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let from_currency = currencies
                    .get(&model.from_currency_id)
                    .cloned()
                    .ok_or_else(|| missing_currency(model.from_currency_id, model.id))?;
                let to_currency = currencies
                    .get(&model.to_currency_id)
                    .cloned()
                    .ok_or_else(|| missing_currency(model.to_currency_id, model.id))?;
                out.push(ExchangeRate::from((model, from_currency, to_currency)));
            }
            Ok(out)
        })
    }

    /// Directed rate for an ordered currency pair.
    ///
    /// No inversion: a missing (EUR, USD) record is an error even when
    /// (USD, EUR) exists.
    pub async fn rate(
        &self,
        from_currency_id: i32,
        to_currency_id: i32,
    ) -> ResultEngine<ExchangeRate> {
        with_tx!(self, |db_tx| {
            let from = self.require_currency_by_id(&db_tx, from_currency_id).await?;
            let to = self.require_currency_by_id(&db_tx, to_currency_id).await?;
            let model = self
                .rate_between(&db_tx, from.id, to.id)
                .await?
                .ok_or_else(|| EngineError::RateNotFound(from.code.clone(), to.code.clone()))?;
            Ok(ExchangeRate::from((
                model,
                Currency::from(from),
                Currency::from(to),
            )))
        })
    }

    /// Create or overwrite the rate for an ordered currency pair. Seed/admin
    /// path; the public API never writes rates.
    pub async fn set_rate(
        &self,
        from_code: &str,
        to_code: &str,
        amount: f64,
    ) -> ResultEngine<ExchangeRate> {
        require_positive_amount("amount", amount)?;

        with_tx!(self, |db_tx| {
            let from = self.require_currency_by_code(&db_tx, from_code).await?;
            let to = self.require_currency_by_code(&db_tx, to_code).await?;
            if from.id == to.id {
                return Err(EngineError::InvalidAmount(
                    "to_currency",
                    "Source and target currency must differ.".to_string(),
                ));
            }

            let now = Utc::now();
            let existing = self.rate_between(&db_tx, from.id, to.id).await?;
            let model = match existing {
                Some(model) => {
                    let mut active: exchange_rates::ActiveModel = model.into();
                    active.amount = ActiveValue::Set(amount);
                    active.updated_at = ActiveValue::Set(now);
                    active.update(&db_tx).await?
                }
                None => {
                    exchange_rates::ActiveModel {
                        from_currency_id: ActiveValue::Set(from.id),
                        to_currency_id: ActiveValue::Set(to.id),
                        amount: ActiveValue::Set(amount),
                        created_at: ActiveValue::Set(now),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    }
                    .insert(&db_tx)
                    .await?
                }
            };
            Ok(ExchangeRate::from((
                model,
                Currency::from(from),
                Currency::from(to),
            )))
        })
    }

    /// First stored rate for the ordered pair, if any. The table has no
    /// uniqueness constraint, so duplicates resolve to the oldest record.
    pub(crate) async fn rate_between(
        &self,
        db_tx: &DatabaseTransaction,
        from_currency_id: i32,
        to_currency_id: i32,
    ) -> ResultEngine<Option<exchange_rates::Model>> {
        Ok(exchange_rates::Entity::find()
            .filter(exchange_rates::Column::FromCurrencyId.eq(from_currency_id))
            .filter(exchange_rates::Column::ToCurrencyId.eq(to_currency_id))
            .order_by_asc(exchange_rates::Column::Id)
            .one(db_tx)
            .await?)
    }
}

fn missing_currency(currency_id: i32, rate_id: i32) -> EngineError {
    EngineError::Database(DbErr::RecordNotFound(format!(
        "currency {currency_id} for exchange rate {rate_id}"
    )))
}
