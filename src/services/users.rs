use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::user::{self, UserRole};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct CreateUserCommand {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, cmd))]
    pub async fn create_user(&self, cmd: CreateUserCommand) -> Result<user::Model, ServiceError> {
        let username = cmd.username.trim().to_lowercase();
        if username.is_empty() {
            return Err(ServiceError::ValidationError(
                "username must not be empty".to_string(),
            ));
        }
        if cmd.password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "username {} already exists",
                username
            )));
        }

        let password_hash = hash_password(&cmd.password)?;

        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            display_name: Set(cmd.display_name.trim().to_string()),
            password_hash: Set(password_hash),
            role: Set(cmd.role.to_string()),
            active: Set(true),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        self.event_sender
            .send_best_effort(Event::UserCreated(created.id))
            .await;
        Ok(created)
    }

    /// Checks a username/password pair. The failure mode never distinguishes
    /// an unknown user from a wrong password.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let username = username.trim().to_lowercase();
        let user = user::Entity::find()
            .filter(user::Column::Username.eq(username.as_str()))
            .filter(user::Column::Active.eq(true))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".to_string()))?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|_| ServiceError::Unauthorized("invalid credentials".to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| ServiceError::Unauthorized("invalid credentials".to_string()))?;

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<user::Model>, ServiceError> {
        let users = user::Entity::find()
            .order_by_asc(user::Column::Username)
            .all(self.db.as_ref())
            .await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn set_role(&self, id: Uuid, role: UserRole) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;
        let mut active_model: user::ActiveModel = existing.into();
        active_model.role = Set(role.to_string());
        let updated = active_model.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        let existing = self.get_user(id).await?;
        let mut active_model: user::ActiveModel = existing.into();
        active_model.active = Set(false);
        let updated = active_model.update(self.db.as_ref()).await?;
        Ok(updated)
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InternalError(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips() {
        let hash = hash_password("correct horse battery").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"correct horse battery", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong password", &parsed)
            .is_err());
    }
}
