//! The module contains the `Wallet` struct and its storage model.

use sea_orm::entity::prelude::*;

use crate::Currency;

/// A per-currency purse owned by one account.
///
/// An account holds at most one wallet per currency. The balance is a plain
/// amount in the wallet currency; every mutation goes through the engine so
/// the non-negativity rule and the version counter are enforced in one
/// place.
#[derive(Clone, Debug, PartialEq)]
pub struct Wallet {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub balance: f64,
    pub currency: Currency,
}

impl From<(Model, Currency)> for Wallet {
    fn from((model, currency): (Model, Currency)) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            balance: model.balance,
            currency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub currency_id: i32,
    pub name: String,
    pub balance: f64,
    /// Bumped on every balance write; guards against concurrent settlement.
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currencies,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
