use chrono::Utc;
use document_store::{DocumentId, FieldUpdateSet, Filter};
use tracing::{info, instrument, warn};

use super::{apply_update, SocialGraph};
use crate::domain::models::{fields, Account, AccountChanges, NewAccount};
use crate::domain::validation::{require_non_blank, require_non_blank_if_present, validate_email};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::Repository;

impl SocialGraph {
    pub async fn accounts(&self) -> ServiceResult<Vec<Account>> {
        self.repository().await?.all().await
    }

    pub async fn account(&self, id: &DocumentId) -> ServiceResult<Option<Account>> {
        self.repository().await?.get(id).await
    }

    /// Validate, check the email is free, insert.
    ///
    /// No store session is held while the credential hashes. The email check
    /// is a point-in-time read: two concurrent creates with the same address
    /// can both pass it.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_account(&self, input: NewAccount) -> ServiceResult<Account> {
        require_non_blank("name", &input.name)?;
        require_non_blank("email", &input.email)?;
        require_non_blank("password", &input.password)?;
        validate_email(&input.email)?;

        let password_hash = self.hasher.hash(&input.password).await?;

        let mut repo = self.repository().await?;
        ensure_email_free(&mut repo, &input.email, None).await?;

        let now = Utc::now();

        let account = repo
            .insert(Account {
                id: DocumentId::default(),
                name: input.name,
                email: input.email,
                password_hash,
                liked_posts: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(account_id = %account.id, "Account created");
        Ok(account)
    }

    /// Partial update: only supplied fields are written. A non-empty change
    /// set also refreshes `updatedAt`.
    #[instrument(skip(self, changes), fields(account_id = %id))]
    pub async fn update_account(
        &self,
        id: &DocumentId,
        changes: AccountChanges,
    ) -> ServiceResult<Account> {
        require_non_blank_if_present("name", changes.name.as_deref())?;
        require_non_blank_if_present("password", changes.password.as_deref())?;
        if let Some(email) = changes.email.as_deref() {
            validate_email(email)?;
        }

        let password_hash = match changes.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password).await?),
            None => None,
        };

        let mut repo = self.repository().await?;
        let mut updates = FieldUpdateSet::new();

        if let Some(name) = changes.name {
            updates.set(fields::NAME, name);
        }
        if let Some(email) = changes.email {
            // a missing target is NotFound even when the address is taken
            repo.require::<Account>(id).await?;
            ensure_email_free(&mut repo, &email, Some(id)).await?;
            updates.set(fields::EMAIL, email);
        }
        if let Some(password_hash) = password_hash {
            updates.set(fields::PASSWORD, password_hash);
        }
        if !updates.is_empty() {
            updates.set(fields::UPDATED_AT, serde_json::to_value(Utc::now())?);
        }

        let account = apply_update::<Account>(&mut repo, id, &updates).await?;
        info!(fields = ?updates.field_names(), "Account updated");
        Ok(account)
    }

    /// Unconditional delete; posts, comments and likes that reference the
    /// account are left as they are.
    #[instrument(skip(self), fields(account_id = %id))]
    pub async fn delete_account(&self, id: &DocumentId) -> ServiceResult<bool> {
        let deleted = self.repository().await?.delete::<Account>(id).await?;
        info!(deleted, "Account delete processed");
        Ok(deleted)
    }
}

/// Fail with `Conflict` when another account already uses `email`
async fn ensure_email_free(
    repo: &mut Repository,
    email: &str,
    owner: Option<&DocumentId>,
) -> ServiceResult<()> {
    let holders: Vec<Account> = repo
        .find(&Filter::field_equals(fields::EMAIL, email))
        .await?;

    if holders.iter().any(|a| Some(&a.id) != owner) {
        warn!(email = %email, "Email already taken");
        return Err(ServiceError::Conflict(format!("email already taken: {email}")));
    }
    Ok(())
}
