//! I/O helpers: configuration, persistence and the reflection collaborator.

pub mod config;
pub mod journal_store;
pub mod prompt;
pub mod reflection;
