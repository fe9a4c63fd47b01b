//! Infrastructure layer for Peerline.
//!
//! Contains implementations of the storage traits defined in `peerline-core`:
//! the SQLite chat repository and advocate directory, plus data directory
//! resolution and `config.toml` loading.

pub mod config;
pub mod filesystem;
pub mod sqlite;
