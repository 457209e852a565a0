//! Account records and the visibility rules applied when one member
//! references another.

use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};

/// Public identity of an account, as other members see it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
}

impl From<Model> for User {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

/// Which accounts a query is allowed to see.
///
/// `ActiveMembers` is the predicate applied whenever a client names another
/// account (for example the receiver of a transfer): deactivated, staff and
/// superuser accounts are hidden. `All` is reserved for authentication and
/// admin tooling. There is no default on purpose; every call site states
/// which set it wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserVisibility {
    ActiveMembers,
    All,
}

impl UserVisibility {
    pub(crate) fn apply(self, query: Select<Entity>) -> Select<Entity> {
        match self {
            Self::ActiveMembers => query
                .filter(Column::IsActive.eq(true))
                .filter(Column::IsStaff.eq(false))
                .filter(Column::IsSuperuser.eq(false)),
            Self::All => query,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
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
