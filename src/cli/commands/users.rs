use crate::config::Config;
use crate::services::ApprovalError;
use crate::state::SharedState;

use super::confirm;

pub async fn cmd_users_pending(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let pending = state.approval_service.list_pending().await?;

    if pending.is_empty() {
        println!("No pending sign-ups.");
        return Ok(());
    }

    println!("Pending sign-ups ({} total)", pending.len());
    println!("{:-<70}", "");
    for profile in pending {
        println!("[{}] {}  (requested {})", profile.id, profile.email, profile.created_at);
    }

    let options = state.approval_service.facility_options().await?;
    if !options.is_empty() {
        println!();
        println!("Facilities:");
        for option in options {
            println!("  {}: {}", option.id, option.name);
        }
    }

    Ok(())
}

pub async fn cmd_users_approve(
    config: &Config,
    id: i32,
    facility: Option<i32>,
    yes: bool,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let Some(facility_id) = facility else {
        println!("Use 'aitmus users pending' to see facility IDs.");
        anyhow::bail!("Select a facility with --facility <id> before approving");
    };

    if !yes && !confirm(&format!("Approve profile {id} for facility {facility_id}?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    match state.approval_service.approve(id, Some(facility_id)).await {
        Ok(profile) => {
            println!("✓ Approved: {}", profile.email);
            Ok(())
        }
        Err(e) => Err(report(e)),
    }
}

pub async fn cmd_users_reject(config: &Config, id: i32, yes: bool) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    if !yes && !confirm(&format!("Reject profile {id}?"))? {
        println!("Cancelled.");
        return Ok(());
    }

    match state.approval_service.reject(id).await {
        Ok(profile) => {
            println!("✓ Rejected: {}", profile.email);
            Ok(())
        }
        Err(e) => Err(report(e)),
    }
}

/// Prints a hint for the failure and hands the error back for the exit status.
fn report(err: ApprovalError) -> anyhow::Error {
    if matches!(err, ApprovalError::ProfileNotFound(_)) {
        println!("Use 'aitmus users pending' to see profile IDs.");
    }
    anyhow::Error::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> Config {
        let db_path =
            std::env::temp_dir().join(format!("aitmus-cli-{}.db", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.general.database_path = format!("sqlite:{}", db_path.display());
        config
    }

    #[tokio::test]
    async fn test_reject_unknown_profile_fails() {
        let config = temp_config();
        assert!(cmd_users_reject(&config, 4242, true).await.is_err());
    }

    #[tokio::test]
    async fn test_approve_without_facility_fails() {
        let config = temp_config();
        assert!(cmd_users_approve(&config, 1, None, true).await.is_err());
    }

    #[tokio::test]
    async fn test_approve_unknown_profile_fails() {
        let config = temp_config();
        assert!(cmd_users_approve(&config, 4242, Some(1), true).await.is_err());
    }
}
