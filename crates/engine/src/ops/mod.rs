use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod currencies;
mod exchange;
mod rates;
mod transfers;
mod users;
mod wallets;

pub use exchange::ExchangeOutcome;
pub use transfers::TransactionPage;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(
            "name",
            "This field may not be blank.".to_string(),
        ));
    }
    if trimmed.chars().count() > 64 {
        return Err(EngineError::InvalidAmount(
            "name",
            "Ensure this field has no more than 64 characters.".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn require_positive_amount(field: &'static str, amount: f64) -> ResultEngine<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::InvalidAmount(
            field,
            "Ensure this value is greater than 0.".to_string(),
        ));
    }
    Ok(amount)
}

fn require_non_negative_amount(field: &'static str, amount: f64) -> ResultEngine<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EngineError::InvalidAmount(
            field,
            "Ensure this value is greater than or equal to 0.".to_string(),
        ));
    }
    Ok(amount)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
