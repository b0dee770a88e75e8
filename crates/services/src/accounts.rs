//! Identity & session: registration, login, token checks, profile edits and
//! self-deletion.

use std::sync::Arc;

use bytes::Bytes;
use domains::errors::{DomainError, Result};
use domains::models::{NewUser, ProfileChanges, User, UserId};
use domains::ports::{CredentialHasher, MediaStorage, TokenService, UserRepository};
use mime::Mime;
use tracing::{info, instrument, warn};

use crate::validation;

pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A freshly issued bearer token and the account it is bound to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Requested profile edit as it arrives from the client.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub username: Option<String>,
    pub slogan: Option<String>,
}

pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    media: Arc<dyn MediaStorage>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
        media: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            media,
        }
    }

    #[instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<User> {
        let username = validation::username(&registration.username)?;
        let email = validation::email(&registration.email)?;
        validation::password(&registration.password)?;

        let password_hash = self.hasher.hash_password(&registration.password).await?;
        let user = self
            .users
            .create_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                DomainError::Conflict(_) => {
                    DomainError::Conflict("username or email is already registered".to_owned())
                }
                other => other,
            })?;

        info!(user_id = user.id, "registered new user");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !self.hasher.verify_password(password, &user.password_hash).await? {
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        info!(user_id = user.id, "issued session token");
        Ok(Session { token, user })
    }

    /// Resolves a bearer token to the user id it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<UserId> {
        self.tokens.verify(token)
    }

    pub async fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.users.find_user(id).await?.is_some())
    }

    pub async fn current_user(&self, id: UserId) -> Result<User> {
        self.users
            .find_user(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user"))
    }

    #[instrument(skip(self, edit))]
    pub async fn update_profile(&self, id: UserId, edit: ProfileEdit) -> Result<User> {
        let changes = ProfileChanges {
            username: edit.username.as_deref().map(validation::username).transpose()?,
            slogan: edit
                .slogan
                .as_deref()
                .map(|raw| validation::optional_text("slogan", Some(raw), validation::SLOGAN_MAX))
                .transpose()?,
        };
        if changes.is_empty() {
            return self.current_user(id).await;
        }

        self.users
            .update_profile(id, changes)
            .await
            .map_err(|err| match err {
                DomainError::Conflict(_) => DomainError::Conflict("username is already taken".to_owned()),
                other => other,
            })?
            .ok_or_else(|| DomainError::not_found("user"))
    }

    /// Stores a new avatar and drops the previous file.
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn update_profile_picture(&self, id: UserId, data: Bytes, content_type: Mime) -> Result<User> {
        if content_type.type_() != mime::IMAGE {
            return Err(DomainError::validation("profile picture must be an image"));
        }
        if data.is_empty() {
            return Err(DomainError::validation("profile picture is empty"));
        }

        let previous = self.current_user(id).await?.profile_picture;
        let path = self.media.store_avatar(id, data, content_type).await?;

        let Some(user) = self.users.set_profile_picture(id, Some(path.clone())).await? else {
            self.discard(&path).await;
            return Err(DomainError::not_found("user"));
        };

        if let Some(old) = previous.filter(|old| *old != path) {
            self.discard(&old).await;
        }
        info!(user_id = id, path = %path, "profile picture updated");
        Ok(user)
    }

    /// Deletes the account; the store cascades to every owned row.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: UserId) -> Result<()> {
        let user = self.current_user(id).await?;
        if !self.users.delete_user(id).await? {
            return Err(DomainError::not_found("user"));
        }
        if let Some(path) = user.profile_picture {
            self.discard(&path).await;
        }
        info!(user_id = id, "account deleted");
        Ok(())
    }

    async fn discard(&self, path: &str) {
        if let Err(err) = self.media.remove(path).await {
            warn!(path, error = %err, "could not remove stored file");
        }
    }
}
