//! Session CLI commands: show, close, messages.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use futures_util::TryStreamExt;
use uuid::Uuid;

use peerline_core::chat::log::since;
use peerline_types::chat::{ChatMessage, ChatSession, MessageRole, SessionStatus};

use crate::state::AppState;

fn parse_id(id: &str) -> Result<Uuid> {
    id.parse::<Uuid>()
        .with_context(|| format!("Invalid session id: {id}"))
}

/// Print a session record.
pub async fn show_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let sid = parse_id(id)?;
    let session = state
        .chat
        .get_session(&sid)
        .await
        .with_context(|| format!("Session '{id}' not found"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    print_session(&session);
    Ok(())
}

/// Close a session.
pub async fn close_session(state: &AppState, id: &str, json: bool) -> Result<()> {
    let sid = parse_id(id)?;
    let session = state
        .chat
        .close_session(&sid)
        .await
        .with_context(|| format!("Failed to close session '{id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Session {} closed",
        style("✓").green().bold(),
        style(session.session_id).cyan()
    );
    println!();
    Ok(())
}

/// Print the messages of a session after `after`.
pub async fn list_messages(state: &AppState, id: &str, after: u64, json: bool) -> Result<()> {
    let sid = parse_id(id)?;
    state
        .chat
        .get_session(&sid)
        .await
        .with_context(|| format!("Session '{id}' not found"))?;

    let messages: Vec<ChatMessage> = since(state.chat.log(), sid, after).try_collect().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {} No messages after #{after}.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Sent").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("Read").fg(Color::White),
    ]);

    for message in &messages {
        let role_color = match message.role {
            MessageRole::User => Color::Cyan,
            MessageRole::Peer => Color::Green,
            MessageRole::Agent => Color::Magenta,
        };
        let read = message
            .read_at
            .map(|at| at.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(message.id.to_string()).fg(Color::DarkGrey),
            Cell::new(message.created_at.format("%Y-%m-%d %H:%M:%S").to_string()).fg(Color::White),
            Cell::new(message.role.to_string()).fg(role_color),
            Cell::new(&message.content).fg(Color::White),
            Cell::new(read).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} message{}",
        style(messages.len()).bold(),
        if messages.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Run one reconciliation sweep over open sessions.
pub async fn reconcile(state: &AppState, json: bool) -> Result<()> {
    let repaired = state.chat.reconcile_open().await?;

    if json {
        println!("{}", serde_json::json!({ "repaired": repaired }));
        return Ok(());
    }

    println!();
    println!(
        "  {} Reconciled open sessions: {} repaired",
        style("✓").green().bold(),
        style(repaired).bold()
    );
    println!();
    Ok(())
}

fn print_session(session: &ChatSession) {
    let status = match session.status {
        SessionStatus::Open => style("open").green(),
        SessionStatus::Closed => style("closed").dim(),
    };
    let fmt_time = |t: chrono::DateTime<chrono::Utc>| t.format("%Y-%m-%d %H:%M:%S").to_string();

    println!();
    println!("  {}", style(session.session_id).cyan().bold());
    println!();
    println!("  Type:          {}", session.session_type);
    println!("  Status:        {status}");
    println!("  User:          {}", session.user_id.as_deref().unwrap_or("-"));
    println!(
        "  Advocate:      {}",
        session.peer_advocate_id.as_deref().unwrap_or("(unassigned)")
    );
    println!("  Created:       {}", fmt_time(session.created_at));
    println!("  Updated:       {}", fmt_time(session.updated_at));
    println!(
        "  Last message:  {}",
        session
            .last_message_at
            .map(fmt_time)
            .unwrap_or_else(|| "-".to_string())
    );
    println!();
}
