use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, NewUserCmd, ResultEngine, UserVisibility, users};

use super::{Engine, with_tx};

impl Engine {
    /// Look up an account by email under the given visibility rules.
    ///
    /// Emails are stored lowercased, so the lookup lowercases its input.
    /// Used by the authentication boundary; a missing account is not an
    /// error there, hence the `Option`.
    pub async fn find_user_by_email(
        &self,
        email: &str,
        visibility: UserVisibility,
    ) -> ResultEngine<Option<users::Model>> {
        let email = email.trim().to_lowercase();
        Ok(visibility
            .apply(users::Entity::find().filter(users::Column::Email.eq(email)))
            .one(&self.database)
            .await?)
    }

    /// Create an account. Admin tooling and tests only; the public API has
    /// no registration flow.
    pub async fn create_user(&self, cmd: NewUserCmd) -> ResultEngine<users::Model> {
        let email = cmd.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(EngineError::InvalidAmount(
                "email",
                "This field may not be blank.".to_string(),
            ));
        }
        if cmd.password.is_empty() {
            return Err(EngineError::InvalidAmount(
                "password",
                "This field may not be blank.".to_string(),
            ));
        }
        let name = cmd.name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::InvalidAmount(
                "name",
                "This field may not be blank.".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let clash = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(email));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                email: ActiveValue::Set(email),
                name: ActiveValue::Set(name),
                password: ActiveValue::Set(cmd.password),
                is_active: ActiveValue::Set(cmd.is_active),
                is_staff: ActiveValue::Set(cmd.is_staff),
                is_superuser: ActiveValue::Set(cmd.is_superuser),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Ok(model)
        })
    }

    /// Resolve a user id under the member-facing visibility rules.
    pub(crate) async fn require_visible_user(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<users::Model> {
        UserVisibility::ActiveMembers
            .apply(users::Entity::find_by_id(user_id))
            .one(db_tx)
            .await?
            .ok_or(EngineError::UnknownUser(user_id))
    }
}
