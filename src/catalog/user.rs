use super::{check_range, Resource};
use crate::{
    auth,
    config::LimitsConfig,
    db::DbPool,
    entities::user::{self, Entity as User},
    errors::ServiceError,
    forms::FormFields,
    gates::{unique::UniqueWitness, validate},
    media::{ImageKind, MediaStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DbErr, EntityTrait, Set};
use serde::Serialize;

pub struct UserResource;

pub struct UserDraft {
    name: String,
    email: String,
    role: String,
    /// Plaintext password; taken by `prepare` and replaced with a hash
    pass: Option<String>,
    pass_hash: Option<String>,
}

/// Account shape exposed by reads; the password hash stays server-side.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub image: String,
    pub role: String,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl From<user::Model> for UserView {
    fn from(row: user::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            image: row.image,
            role: row.role,
            created: row.created,
            updated: row.updated,
        }
    }
}

impl UniqueWitness for user::Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn unique_values(&self) -> Vec<(&'static str, String)> {
        vec![("name", self.name.clone()), ("email", self.email.clone())]
    }
}

#[async_trait]
impl Resource for UserResource {
    const NOUN: &'static str = "User";
    const COLLECTION: &'static str = "users";
    const STORE_DIR: &'static str = "users";
    // Avatars only need the thumbnail render
    const IMAGE: Option<ImageKind> = Some(ImageKind::ThumbnailOnly);

    type Row = user::Model;
    type Draft = UserDraft;
    type View = UserView;

    fn draft(form: &FormFields, limits: &LimitsConfig) -> Result<Self::Draft, ServiceError> {
        let name = form.require("name")?;
        let email = form.require("email")?;
        let role = form.require("role")?;

        check_range("name", name, limits.string_min, limits.string_max)?;
        check_range("role", role, limits.string_min, limits.string_max)?;

        if !validate::email_ok(email) {
            return Err(ServiceError::ValidationRejected(
                "email must be a valid address".into(),
            ));
        }

        // Optional here: a replacement password on update. Creation
        // requires one via ensure_create.
        let pass = form.get("pass").filter(|pass| !pass.is_empty());
        if let Some(pass) = pass {
            if !validate::password_ok(pass, limits.pass_min, limits.pass_max) {
                return Err(ServiceError::ValidationRejected(
                    "password must mix upper and lower case letters, digits and symbols, without spaces"
                        .into(),
                ));
            }
        }

        Ok(UserDraft {
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            pass: pass.map(str::to_string),
            pass_hash: None,
        })
    }

    fn ensure_create(draft: &Self::Draft) -> Result<(), ServiceError> {
        if draft.pass.is_none() {
            return Err(ServiceError::ValidationRejected(
                "a password is required".into(),
            ));
        }
        Ok(())
    }

    fn unique_pairs(draft: &Self::Draft) -> Vec<(&'static str, String)> {
        vec![("name", draft.name.clone()), ("email", draft.email.clone())]
    }

    async fn prepare(
        _db: &DbPool,
        _media: &MediaStore,
        draft: &mut Self::Draft,
    ) -> Result<(), ServiceError> {
        if let Some(pass) = draft.pass.take() {
            let hash = tokio::task::spawn_blocking(move || auth::hash_password(&pass))
                .await
                .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))??;
            draft.pass_hash = Some(hash);
        }
        Ok(())
    }

    async fn naming_source(_db: &DbPool, draft: &Self::Draft) -> Result<String, ServiceError> {
        Ok(draft.name.clone())
    }

    async fn load_all(db: &DbPool, _scope: Option<i32>) -> Result<Vec<Self::Row>, DbErr> {
        User::find().all(db).await
    }

    async fn find(db: &DbPool, id: i32) -> Result<Option<Self::Row>, DbErr> {
        User::find_by_id(id).one(db).await
    }

    fn stored_image(row: &Self::Row) -> Option<&str> {
        Some(&row.image)
    }

    fn view(row: Self::Row) -> Self::View {
        row.into()
    }

    async fn insert(db: &DbPool, draft: Self::Draft, image: Option<String>) -> Result<(), DbErr> {
        let model = user::ActiveModel {
            name: Set(draft.name),
            email: Set(draft.email),
            image: Set(image.unwrap_or_default()),
            pass: Set(draft.pass_hash.unwrap_or_default()),
            role: Set(draft.role),
            ..Default::default()
        };

        model.insert(db).await.map(|_| ())
    }

    async fn apply_update(
        db: &DbPool,
        row: Self::Row,
        draft: Self::Draft,
        image: Option<String>,
    ) -> Result<(), DbErr> {
        let mut model: user::ActiveModel = row.into();

        model.name = Set(draft.name);
        model.email = Set(draft.email);
        model.role = Set(draft.role);
        if let Some(hash) = draft.pass_hash {
            model.pass = Set(hash);
        }
        if let Some(image) = image {
            model.image = Set(image);
        }

        model.update(db).await.map(|_| ())
    }

    async fn delete_row(db: &DbPool, id: i32) -> Result<(), DbErr> {
        User::delete_by_id(id).exec(db).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    #[test]
    fn create_requires_a_password() {
        let form = FormFields::from_pairs(&[
            ("name", "Renee"),
            ("email", "renee@example.com"),
            ("role", "user"),
        ]);

        let draft = UserResource::draft(&form, &limits()).unwrap();
        assert!(UserResource::ensure_create(&draft).is_err());
    }

    #[test]
    fn weak_password_fails_the_gate() {
        let form = FormFields::from_pairs(&[
            ("name", "Renee"),
            ("email", "renee@example.com"),
            ("role", "user"),
            ("pass", "abcdef1!"),
        ]);
        assert!(UserResource::draft(&form, &limits()).is_err());
    }

    #[test]
    fn bad_email_fails_the_gate() {
        let form = FormFields::from_pairs(&[
            ("name", "Renee"),
            ("email", "notanemail"),
            ("role", "user"),
            ("pass", "Abcdef1!"),
        ]);
        assert!(UserResource::draft(&form, &limits()).is_err());
    }

    #[test]
    fn valid_signup_passes_and_keeps_the_plaintext_for_hashing() {
        let form = FormFields::from_pairs(&[
            ("name", "Renee"),
            ("email", "renee@example.com"),
            ("role", "user"),
            ("pass", "Abcdef1!"),
        ]);

        let draft = UserResource::draft(&form, &limits()).unwrap();
        assert!(UserResource::ensure_create(&draft).is_ok());
        assert_eq!(draft.pass.as_deref(), Some("Abcdef1!"));
        assert!(draft.pass_hash.is_none());
    }
}
