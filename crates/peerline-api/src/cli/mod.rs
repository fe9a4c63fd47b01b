//! CLI command definitions for the `peerline` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands follow a
//! noun-verb pattern (e.g., `peerline advocate add`, `peerline session show`).

pub mod advocate;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Peer-support chat service: sessions, messages and advocate assignment.
#[derive(Parser)]
#[command(name = "peerline", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides `server.port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,
    },

    /// Manage peer advocates (add, list, available, away).
    Advocate {
        #[command(subcommand)]
        action: AdvocateCommand,
    },

    /// Inspect and close chat sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommand,
    },

    /// Repair `lastMessageAt` on open sessions that lag behind their log.
    Reconcile,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AdvocateCommand {
    /// Register an advocate, or rename an existing one.
    Add {
        /// Advocate id.
        id: String,

        /// Display name.
        #[arg(long)]
        name: Option<String>,
    },

    /// List advocates with availability and open-session load.
    #[command(alias = "ls")]
    List,

    /// Mark an advocate available for new peer sessions.
    Available {
        /// Advocate id.
        id: String,
    },

    /// Mark an advocate away; they keep their current sessions.
    Away {
        /// Advocate id.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    /// Show a session record.
    Show {
        /// Session id.
        id: String,
    },

    /// Close a session. Closing twice is not an error.
    Close {
        /// Session id.
        id: String,
    },

    /// Print the messages of a session.
    Messages {
        /// Session id.
        id: String,

        /// Only messages with an id greater than this.
        #[arg(long, default_value = "0")]
        after: u64,
    },
}
