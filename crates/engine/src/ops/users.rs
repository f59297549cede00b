use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

use crate::{
    Actor, EngineError, ResultEngine, Role, users,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

/// Public view of a user row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub role: Role,
    pub email: Option<String>,
}

impl TryFrom<users::Model> for UserProfile {
    type Error = EngineError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::try_from(model.role.as_str())?,
            username: model.username,
            email: model.email,
        })
    }
}

impl Engine {
    /// Create a user. Fails with `ExistingKey` if the username is taken.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        email: Option<&str>,
    ) -> ResultEngine<UserProfile> {
        let username = normalize_required_text(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }
        let email = normalize_optional_text(email);
        if email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(EngineError::Validation("invalid email address".to_string()));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password.to_string()),
                role: ActiveValue::Set(role.as_str().to_string()),
                email: ActiveValue::Set(email.clone()),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })?;

        info!(%username, role = role.as_str(), "user registered");
        Ok(UserProfile {
            username,
            role,
            email,
        })
    }

    /// Resolve Basic credentials to an [`Actor`].
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Actor> {
        let user = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .filter(|user| user.password == password)
            .ok_or_else(|| EngineError::Unauthorized("invalid credentials".to_string()))?;
        let role = Role::try_from(user.role.as_str())?;
        Ok(Actor::new(user.username, role))
    }

    pub async fn user_profile(&self, actor: &Actor) -> ResultEngine<UserProfile> {
        let model = users::Entity::find_by_id(actor.user_id.clone())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        UserProfile::try_from(model)
    }
}
