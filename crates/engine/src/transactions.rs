//! The module contains the settled transfer ledger.

use sea_orm::DbErr;
use sea_orm::entity::prelude::*;

use crate::{Currency, EngineError, ResultEngine, users::User};

/// Lifecycle state of a ledger row.
///
/// Settlement only ever writes `Successful`: a transfer either commits fully
/// or leaves no row behind. `Pending` and `Canceled` exist for storage and
/// wire compatibility; no engine operation produces them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Successful,
    Canceled,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Successful => "SUCCESSFUL",
            Self::Canceled => "CANCELED",
        }
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "SUCCESSFUL" => Ok(Self::Successful),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(EngineError::Database(DbErr::Type(format!(
                "unknown transaction status: {other}"
            )))),
        }
    }
}

/// A settled peer-to-peer transfer, as read back from the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: i32,
    pub status: TransactionStatus,
    pub from_user: User,
    pub to_user: User,
    pub amount: f64,
    pub currency: Currency,
    pub paid_at: DateTimeUtc,
}

impl Transaction {
    pub(crate) fn from_parts(
        model: Model,
        from_user: User,
        to_user: User,
        currency: Currency,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            status: TransactionStatus::try_from(model.status.as_str())?,
            from_user,
            to_user,
            amount: model.amount,
            currency,
            paid_at: model.paid_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub from_user_id: i32,
    pub to_user_id: i32,
    pub currency_id: i32,
    pub amount: f64,
    pub status: String,
    pub paid_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Currencies,
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
