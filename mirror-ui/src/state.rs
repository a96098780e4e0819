//! Shared application state for the journaling server.

use std::sync::Arc;

use chrono::NaiveDate;
use mirror::core::session::SessionFlowState;
use mirror::io::journal_store::JournalStore;
use mirror::io::reflection::Reflector;
use mirror::reflect::ReflectionOutcome;
use tokio::sync::Mutex;

/// The single active journaling session.
#[derive(Debug, Default)]
pub struct Session {
    pub flow: SessionFlowState,
    /// Result of the most recent reflection, shown until the next action.
    pub last_outcome: Option<ReflectionOutcome>,
}

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: JournalStore,
    pub reflector: Arc<dyn Reflector>,
    pub session: Arc<Mutex<Session>>,
    /// Source of the entry date; swapped out in tests.
    pub today: fn() -> NaiveDate,
}

impl AppState {
    pub fn new(store: JournalStore, reflector: Arc<dyn Reflector>) -> Self {
        Self {
            store,
            reflector,
            session: Arc::new(Mutex::new(Session::default())),
            today: local_today,
        }
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
