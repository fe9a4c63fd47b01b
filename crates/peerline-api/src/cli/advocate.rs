//! Advocate directory CLI commands: add, list, available, away.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use peerline_types::advocate::PeerAdvocate;

use crate::state::AppState;

/// Register an advocate or update their display name.
pub async fn add_advocate(
    state: &AppState,
    id: &str,
    name: Option<&str>,
    json: bool,
) -> Result<()> {
    let advocate = state
        .advocates()
        .upsert(id, name)
        .await
        .with_context(|| format!("Failed to register advocate '{id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&advocate)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Advocate {} registered",
        style("✓").green().bold(),
        style(&advocate.id).cyan()
    );
    println!();
    Ok(())
}

/// List advocates with availability and current load.
pub async fn list_advocates(state: &AppState, json: bool) -> Result<()> {
    let advocates = state.advocates().list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&advocates)?);
        return Ok(());
    }

    if advocates.is_empty() {
        println!();
        println!(
            "  {} No advocates registered. Add one with: {}",
            style("i").blue().bold(),
            style("peerline advocate add <id>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Open sessions").fg(Color::White),
    ]);

    for advocate in &advocates {
        let status_cell = if advocate.available {
            Cell::new("available").fg(Color::Green)
        } else {
            Cell::new("away").fg(Color::DarkGrey)
        };

        table.add_row(vec![
            Cell::new(&advocate.id).fg(Color::Cyan),
            Cell::new(advocate.display_name.as_deref().unwrap_or("-")).fg(Color::White),
            status_cell,
            Cell::new(advocate.current_open_session_count.to_string()).fg(Color::White),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} advocate{}",
        style(advocates.len()).bold(),
        if advocates.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Flip an advocate's availability.
pub async fn set_availability(
    state: &AppState,
    id: &str,
    available: bool,
    json: bool,
) -> Result<()> {
    let advocate = state
        .advocates()
        .set_available(id, available)
        .await
        .with_context(|| format!("Advocate '{id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&advocate)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} is now {}",
        style("✓").green().bold(),
        style(&advocate.id).cyan(),
        availability_label(&advocate)
    );
    println!();
    Ok(())
}

fn availability_label(advocate: &PeerAdvocate) -> console::StyledObject<&'static str> {
    if advocate.available {
        style("available").green()
    } else {
        style("away").dim()
    }
}
