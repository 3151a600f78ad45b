//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::config::{Config, SecurityConfig};
use crate::db::Store;
use crate::db::repositories::account::hash_password;
use crate::domain::events::ChangeEvent;
use crate::domain::{ApprovalStatus, Role, SessionContext};
use crate::services::auth_service::{
    AuthError, AuthService, ProfileInfo, ProfileUpdate, SignupRequest,
};

const MAX_CONTACT_FIELD_LEN: usize = 64;

pub struct SeaOrmAuthService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<ChangeEvent>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<ChangeEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
        }
    }

    async fn security(&self) -> SecurityConfig {
        self.config.read().await.security.clone()
    }

    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let security = self.security().await;
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))??;
        Ok(hash)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, request: SignupRequest) -> Result<ProfileInfo, AuthError> {
        let min_len = self.security().await.min_password_length;
        validate_email(&request.email)?;
        validate_new_password(&request.password, &request.password_confirm, min_len)?;

        if self
            .store
            .find_account_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash(&request.password).await?;

        // The lookup above can race another sign-up; the unique index decides.
        let profile = self
            .store
            .create_account_with_profile(
                &request.email,
                password_hash,
                Role::Guest,
                ApprovalStatus::Pending,
            )
            .await?
            .ok_or(AuthError::EmailTaken)?;

        info!(profile_id = profile.id, email = %profile.email, "Sign-up received, awaiting approval");
        let _ = self.event_bus.send(ChangeEvent::ProfileCreated {
            profile_id: profile.id,
        });

        Ok(profile.into())
    }

    async fn login(&self, email: &str, password: &str) -> Result<ProfileInfo, AuthError> {
        let Some(account) = self.store.verify_credentials(email, password).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        // A profile that was never created counts as pending.
        let Some(profile) = self.store.get_profile(account.id).await? else {
            warn!(account_id = account.id, "Account has no profile");
            return Err(AuthError::NotApproved(ApprovalStatus::Pending));
        };

        if !profile.status.is_approved() {
            return Err(AuthError::NotApproved(profile.status));
        }

        Ok(profile.into())
    }

    async fn resolve_session(
        &self,
        account_id: i32,
    ) -> Result<Option<SessionContext>, AuthError> {
        let profile = self.store.get_profile(account_id).await?;

        Ok(profile
            .filter(|p| p.status.is_approved())
            .map(|p| SessionContext {
                profile_id: p.id,
                email: p.email,
                role: p.role,
                facility_id: p.facility_id,
            }))
    }

    async fn get_profile(&self, profile_id: i32) -> Result<ProfileInfo, AuthError> {
        self.store
            .get_profile(profile_id)
            .await?
            .map(ProfileInfo::from)
            .ok_or(AuthError::ProfileNotFound)
    }

    async fn update_profile(
        &self,
        profile_id: i32,
        update: ProfileUpdate,
    ) -> Result<ProfileInfo, AuthError> {
        let min_len = self.security().await.min_password_length;

        let nickname = update.nickname.map(|n| n.trim().to_string());
        let phone = update.phone.map(|p| p.trim().to_string());
        for (field, value) in [("Nickname", &nickname), ("Phone", &phone)] {
            if value
                .as_ref()
                .is_some_and(|v| v.chars().count() > MAX_CONTACT_FIELD_LEN)
            {
                return Err(AuthError::Validation(format!(
                    "{field} must be {MAX_CONTACT_FIELD_LEN} characters or less"
                )));
            }
        }

        let password_hash = match update.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                let confirm = update.password_confirm.unwrap_or_default();
                validate_new_password(&password, &confirm, min_len)?;
                Some(self.hash(&password).await?)
            }
            None => None,
        };
        let password_changed = password_hash.is_some();

        let profile = self
            .store
            .update_profile_settings(profile_id, nickname, phone, password_hash)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        if password_changed {
            info!(profile_id, "Password changed");
        }

        let _ = self.event_bus.send(ChangeEvent::ProfileUpdated { profile_id });

        Ok(profile.into())
    }

    async fn create_super_admin(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<ProfileInfo, AuthError> {
        validate_email(email)?;

        if let Some(account) = self.store.find_account_by_email(email).await? {
            if password.is_some() {
                warn!(
                    account_id = account.id,
                    "Promoting existing account; supplied password ignored"
                );
            }
            let profile = self
                .store
                .set_profile_access(account.id, Role::SuperAdmin, ApprovalStatus::Approved)
                .await?
                .ok_or(AuthError::ProfileNotFound)?;
            info!(profile_id = profile.id, "Existing account promoted to super admin");
            return Ok(profile.into());
        }

        let Some(password) = password else {
            return Err(AuthError::Validation(
                "A password is required to create a new administrator".to_string(),
            ));
        };
        let min_len = self.security().await.min_password_length;
        validate_new_password(password, password, min_len)?;
        let password_hash = self.hash(password).await?;

        let profile = self
            .store
            .create_account_with_profile(
                email,
                password_hash,
                Role::SuperAdmin,
                ApprovalStatus::Approved,
            )
            .await?
            .ok_or(AuthError::EmailTaken)?;

        info!(profile_id = profile.id, "Super admin created");
        Ok(profile.into())
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let email = email.trim();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.split('.').count() >= 2
            && domain.split('.').all(|part| !part.is_empty())
    }) && !email.chars().any(char::is_whitespace);

    if valid {
        Ok(())
    } else {
        Err(AuthError::Validation("Enter a valid email address".to_string()))
    }
}

fn validate_new_password(password: &str, confirm: &str, min_len: usize) -> Result<(), AuthError> {
    if password != confirm {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }

    if password.chars().count() < min_len {
        return Err(AuthError::Validation(format!(
            "Password must be at least {min_len} characters"
        )));
    }

    Ok(())
}
