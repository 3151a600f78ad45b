use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::{ApprovalStatus, Role};
use crate::entities::{accounts, profiles};

pub struct AccountRepository {
    conn: DatabaseConnection,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<accounts::Model>> {
        accounts::Entity::find()
            .filter(accounts::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await
            .context("Failed to query account by email")
    }

    /// Creates the account and its profile in one transaction.
    ///
    /// Both rows share the same id so the profile can be looked up directly from
    /// the session subject. Returns `None` when the email is already registered,
    /// including when a concurrent sign-up won the unique index.
    pub async fn create_with_profile(
        &self,
        email: &str,
        password_hash: String,
        role: Role,
        status: ApprovalStatus,
    ) -> Result<Option<profiles::Model>> {
        let email = normalize_email(email);
        let now = chrono::Utc::now().to_rfc3339();

        let txn = self.conn.begin().await?;

        let inserted = accounts::ActiveModel {
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            created_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await;

        let account = match inserted {
            Ok(account) => account,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Ok(None);
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to insert account")),
        };

        let profile = profiles::ActiveModel {
            id: Set(account.id),
            email: Set(email),
            role: Set(role),
            status: Set(status),
            facility_id: Set(None),
            nickname: Set(None),
            phone: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .context("Failed to insert profile")?;

        txn.commit().await?;

        Ok(Some(profile))
    }

    /// Returns the account when the password matches.
    /// Note: verification runs in `spawn_blocking` because Argon2 is CPU-bound.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<accounts::Model>> {
        let Some(account) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        let password_hash = account.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        Ok(is_valid.then_some(account))
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password using Argon2id with optional custom params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Params are read back from the PHC string, so hashes made with any cost
/// settings verify.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let cfg = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let hash = hash_password("hunter22", Some(&cfg)).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_reported_not_raised() {
        let store = crate::db::Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let repo = AccountRepository::new(store.conn.clone());

        let first = repo
            .create_with_profile("ops@example.com", "h".into(), Role::Guest, ApprovalStatus::Pending)
            .await
            .unwrap();
        assert!(first.is_some());

        let second = repo
            .create_with_profile(" OPS@example.com", "h".into(), Role::Guest, ApprovalStatus::Pending)
            .await
            .unwrap();
        assert!(second.is_none());
    }

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Ops@Example.COM "), "ops@example.com");
    }
}
