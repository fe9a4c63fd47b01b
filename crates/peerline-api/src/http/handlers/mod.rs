//! HTTP request handlers.

pub mod chat;
