use anyhow::Context;

use crate::config::Config;
use crate::db::NewFacility;
use crate::domain::FacilityStatus;
use crate::state::SharedState;

pub async fn cmd_facility_add(
    config: &Config,
    name: &str,
    address: &str,
    lat: f64,
    lng: f64,
) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    let facility = NewFacility {
        name: name.trim().to_string(),
        address: address.trim().to_string(),
        lat,
        lng,
    };

    let created = state
        .facility_service
        .add(facility)
        .await
        .context("Failed to add facility")?;

    println!("✓ Added facility: {} (ID: {})", created.name, created.id);
    Ok(())
}

pub async fn cmd_facility_list(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let facilities = state.facility_service.list().await?;

    if facilities.is_empty() {
        println!("No facilities registered.");
        println!();
        println!("Add one with: aitmus facility add --name \"Plant A\" --lat 37.5 --lng 127.0");
        return Ok(());
    }

    println!("Facilities ({} total)", facilities.len());
    println!("{:-<70}", "");

    for facility in facilities {
        let indicator = match facility.status {
            FacilityStatus::Normal => "✓",
            FacilityStatus::Warning => "⚠",
            FacilityStatus::Danger => "✖",
        };

        println!("{} {} [{}]", indicator, facility.name, facility.status);
        println!(
            "  ID: {} | {} | ({:.4}, {:.4})",
            facility.id, facility.address, facility.lat, facility.lng
        );
    }

    Ok(())
}
