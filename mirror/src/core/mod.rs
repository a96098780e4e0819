//! Deterministic, pure logic for the journaling flow.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod session;
pub mod types;
