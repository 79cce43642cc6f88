//! Infrastructure adapters. Implement outbound ports.
//!
//! Model providers, SQLite, file import, terminal UI. Map errors to DomainError.

pub mod ai;
pub mod import;
pub mod persistence;
pub mod ui;
