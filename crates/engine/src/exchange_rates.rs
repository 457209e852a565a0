//! Directed conversion rates between two currencies.

use sea_orm::entity::prelude::*;

use crate::Currency;

/// A conversion factor from one currency into another.
///
/// Rates are directed: the pair (EUR, USD) says nothing about (USD, EUR),
/// which needs its own record. The engine never inverts or chains rates; a
/// missing direction simply means the exchange is not offered.
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeRate {
    pub id: i32,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub amount: f64,
    pub updated_at: DateTimeUtc,
}

impl From<(Model, Currency, Currency)> for ExchangeRate {
    fn from((model, from_currency, to_currency): (Model, Currency, Currency)) -> Self {
        Self {
            id: model.id,
            from_currency,
            to_currency,
            amount: model.amount,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub from_currency_id: i32,
    pub to_currency_id: i32,
    pub amount: f64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::FromCurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromCurrency,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::ToCurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToCurrency,
}

impl ActiveModelBehavior for ActiveModel {}
