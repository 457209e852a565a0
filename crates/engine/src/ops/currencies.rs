use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};

use crate::{Currency, EngineError, ResultEngine, currencies};

use super::{Engine, with_tx};

impl Engine {
    /// All known currencies, ordered by display name.
    pub async fn list_currencies(&self) -> ResultEngine<Vec<Currency>> {
        let models = currencies::Entity::find()
            .order_by_asc(currencies::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Currency::from).collect())
    }

    /// Look up a currency by its client-facing code (exact match).
    pub async fn currency_by_code(&self, code: &str) -> ResultEngine<Currency> {
        let model = currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::UnknownCurrency(code.to_string()))?;
        Ok(Currency::from(model))
    }

    /// Register a currency. Seed/admin path; the public API never creates
    /// currencies.
    pub async fn create_currency(&self, code: &str, name: &str) -> ResultEngine<Currency> {
        let code = code.trim().to_uppercase();
        let name = name.trim().to_string();
        if code.is_empty() {
            return Err(EngineError::InvalidAmount(
                "code",
                "This field may not be blank.".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(EngineError::InvalidAmount(
                "name",
                "This field may not be blank.".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let clash = currencies::Entity::find()
                .filter(
                    Condition::any()
                        .add(currencies::Column::Code.eq(code.clone()))
                        .add(currencies::Column::Name.eq(name.clone())),
                )
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(code));
            }

            let now = Utc::now();
            let model = currencies::ActiveModel {
                code: ActiveValue::Set(code),
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(Currency::from(model))
        })
    }

    /// Resolve a client-supplied currency code inside a transaction.
    pub(crate) async fn require_currency_by_code(
        &self,
        db_tx: &DatabaseTransaction,
        code: &str,
    ) -> ResultEngine<currencies::Model> {
        currencies::Entity::find()
            .filter(currencies::Column::Code.eq(code))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::UnknownCurrency(code.to_string()))
    }

    /// Load a currency row by id inside a transaction.
    ///
    /// Ids come from stored rows, never from clients; a miss is a broken
    /// reference rather than a validation error.
    pub(crate) async fn require_currency_by_id(
        &self,
        db_tx: &DatabaseTransaction,
        currency_id: i32,
    ) -> ResultEngine<currencies::Model> {
        currencies::Entity::find_by_id(currency_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| {
                EngineError::Database(DbErr::RecordNotFound(format!("currency {currency_id}")))
            })
    }

    /// Load a batch of currencies keyed by id.
    pub(crate) async fn currencies_by_id(
        &self,
        db_tx: &DatabaseTransaction,
        ids: Vec<i32>,
    ) -> ResultEngine<HashMap<i32, Currency>> {
        let models = currencies::Entity::find()
            .filter(currencies::Column::Id.is_in(ids))
            .all(db_tx)
            .await?;
        Ok(models
            .into_iter()
            .map(|model| (model.id, Currency::from(model)))
            .collect())
    }
}
