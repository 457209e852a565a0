//! The module contains the `Currency` reference data.

use sea_orm::entity::prelude::*;

/// A currency the system knows about.
///
/// Currencies are reference data: they are seeded by the admin tooling and
/// never created through the public API. `code` is the short identifier
/// clients send (for example `USD`), `name` the human readable label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currency {
    pub id: i32,
    pub code: String,
    pub name: String,
}

impl From<Model> for Currency {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            code: value.code,
            name: value.name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub code: String,
    pub name: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallets::Entity")]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
