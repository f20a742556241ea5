//! User repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use spendflow_core::auth::{Role, User, UserStore, UserStoreError};
use spendflow_shared::types::UserId;

use crate::entities::users;

/// `SeaORM` implementation of [`UserStore`].
#[derive(Debug, Clone)]
pub struct SeaOrmUserStore {
    db: DatabaseConnection,
}

impl SeaOrmUserStore {
    /// Creates a new user store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_error(err: DbErr) -> UserStoreError {
    UserStoreError::Database(err.to_string())
}

fn model_to_user(model: users::Model) -> Result<User, UserStoreError> {
    let role = Role::parse(&model.role).map_err(|e| {
        UserStoreError::Database(format!("corrupt user row {}: {e}", model.id))
    })?;
    Ok(User {
        id: UserId::from_uuid(model.id),
        username: model.username,
        password_hash: model.password_hash,
        role,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[async_trait]
impl UserStore for SeaOrmUserStore {
    async fn create(&self, user: User) -> Result<User, UserStoreError> {
        let model = users::ActiveModel {
            id: Set(user.id.into_inner()),
            username: Set(user.username.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(user.role.as_str().to_string()),
            created_at: Set(user.created_at.into()),
        };

        match model.insert(&self.db).await {
            Ok(inserted) => model_to_user(inserted),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(UserStoreError::Duplicate(user.username))
            }
            Err(e) => Err(db_error(e)),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(model_to_user)
            .transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .map(model_to_user)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_to_user() {
        let id = uuid::Uuid::now_v7();
        let user = model_to_user(users::Model {
            id,
            username: "kim".to_string(),
            password_hash: "$argon2id$x".to_string(),
            role: "director".to_string(),
            created_at: Utc::now().into(),
        })
        .unwrap();
        assert_eq!(user.id, UserId::from_uuid(id));
        assert_eq!(user.role, Role::Director);
    }

    #[test]
    fn test_model_with_unknown_role_is_corrupt() {
        let result = model_to_user(users::Model {
            id: uuid::Uuid::now_v7(),
            username: "kim".to_string(),
            password_hash: "$argon2id$x".to_string(),
            role: "overlord".to_string(),
            created_at: Utc::now().into(),
        });
        assert!(matches!(result, Err(UserStoreError::Database(_))));
    }
}
