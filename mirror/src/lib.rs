//! Daily journaling flow with generated reflections.
//!
//! The crate keeps the same separation the rest of the workspace relies on:
//!
//! - **[`core`]**: Pure, deterministic logic (entry types, session flow).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, CSV journal store, prompt
//!   rendering, the chat-completions client).
//!
//! [`reflect`] ties the two together for the one operation that touches both:
//! turning the current session draft into a persisted journal entry.

pub mod core;
pub mod io;
pub mod logging;
pub mod reflect;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
