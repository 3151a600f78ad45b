use anyhow::Context;

use crate::config::Config;
use crate::state::SharedState;

use super::read_line;

pub async fn cmd_create_admin(
    config: &Config,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let existing = state.store.find_account_by_email(email).await?.is_some();
    let password = match password {
        Some(password) => {
            if existing {
                println!("Note: {email} already exists and keeps its current password.");
            }
            Some(password)
        }
        None if existing => None,
        None => Some(read_line("Enter a password for the administrator:")?),
    };

    let profile = state
        .auth_service
        .create_super_admin(email, password.as_deref())
        .await
        .context("Failed to create administrator")?;

    println!("✓ {} is now a super administrator (ID: {})", profile.email, profile.id);
    Ok(())
}
