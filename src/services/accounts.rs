//! Account flows that sit outside the generic CRUD pipeline: credential
//! login, password reset with out-of-band delivery, the public avatar
//! lookup and the contact-form relay.

use crate::{
    auth::{self, AuthService},
    config::LimitsConfig,
    db::DbPool,
    entities::user::{self, Entity as User},
    errors::ServiceError,
    gates::validate,
    mailer::Mailer,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct AccountService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
    mailer: Arc<dyn Mailer>,
    limits: LimitsConfig,
}

/// Successful login payload
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i32,
    pub token: String,
}

/// Public profile subset served without authentication
#[derive(Debug, Serialize)]
pub struct AvatarView {
    pub name: String,
    pub image: String,
    pub role: String,
}

impl AccountService {
    pub fn new(
        db: Arc<DbPool>,
        auth: Arc<AuthService>,
        mailer: Arc<dyn Mailer>,
        limits: LimitsConfig,
    ) -> Self {
        Self {
            db,
            auth,
            mailer,
            limits,
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, ServiceError> {
        User::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Credential login: unknown account and bad password stay separate
    /// responses (404 and 401).
    #[instrument(skip(self, pass))]
    pub async fn login(&self, email: &str, pass: &str) -> Result<LoginResponse, ServiceError> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

        let pass = pass.to_string();
        let hash = account.pass.clone();
        let verified = tokio::task::spawn_blocking(move || auth::verify_password(&pass, &hash))
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))??;

        if !verified {
            return Err(ServiceError::Unauthorized("Incorrect password".into()));
        }

        let token = self.auth.issue_token(account.id)?;

        info!(user_id = account.id, "login succeeded");
        Ok(LoginResponse {
            user_id: account.id,
            token,
        })
    }

    /// Replaces the account password with a generated one and mails the
    /// plaintext to the account address. The delivery is awaited: a
    /// transport failure surfaces as an error, never as a false success.
    #[instrument(skip(self, subject, body))]
    pub async fn forgot_password(
        &self,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), ServiceError> {
        if !validate::email_ok(email) {
            return Err(ServiceError::ValidationRejected(
                "email must be a valid address".into(),
            ));
        }

        let account = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))?;

        let replacement = auth::generate_password(self.limits.generate_length);

        let for_hash = replacement.clone();
        let hash = tokio::task::spawn_blocking(move || auth::hash_password(&for_hash))
            .await
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))??;

        let account_id = account.id;
        let mut model: user::ActiveModel = account.into();
        model.pass = Set(hash);
        model
            .update(&*self.db)
            .await
            .map_err(ServiceError::from_db_write)?;

        let html = format!("<p>{}</p>\n<b>{}</b>", body, replacement);
        self.mailer.send(email, subject, &html).await?;

        info!(user_id = account_id, "replacement password delivered");
        Ok(())
    }

    /// Public profile subset for display next to comments and articles.
    pub async fn avatar(&self, id: i32) -> Result<AvatarView, ServiceError> {
        User::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(|_| ServiceError::NotFound("User not found".into()))?
            .map(|account| AvatarView {
                name: account.name,
                image: account.image,
                role: account.role,
            })
            .ok_or_else(|| ServiceError::NotFound("User not found".into()))
    }

    /// Relays a contact-form message to the configured inbox.
    pub async fn contact(&self, email: &str, subject: &str, body: &str) -> Result<(), ServiceError> {
        if !validate::email_ok(email) {
            return Err(ServiceError::ValidationRejected(
                "email must be a valid address".into(),
            ));
        }

        let html = format!("<p>{}</p>\n<p>From: {}</p>", body, email);
        let inbox = self.mailer.inbox().to_string();
        self.mailer.send(&inbox, subject, &html).await?;

        Ok(())
    }
}
