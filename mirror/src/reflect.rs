//! Orchestration for a single reflection trigger.
//!
//! Collects the revealed draft values, renders the prompt, asks the
//! collaborator once, and appends exactly one journal entry whatever the
//! collaborator answered.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::core::session::SessionFlowState;
use crate::core::types::JournalEntry;
use crate::io::journal_store::JournalStore;
use crate::io::prompt::compose_submission_prompt;
use crate::io::reflection::{ReflectionError, Reflector};

/// Result of a reflection trigger. The entry is always persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionOutcome {
    /// The row that was appended to the journal.
    pub entry: JournalEntry,
    /// Why the collaborator failed, if it did. The entry then carries the
    /// error text as its `ai_response`.
    pub error: Option<ReflectionError>,
}

impl ReflectionOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Text persisted in place of a reflection when the collaborator fails.
pub fn failure_text(err: &ReflectionError) -> String {
    format!("Error: {err}")
}

/// Generate a reflection for the current session and persist it.
///
/// Fails only when the reflection step has not been revealed or when the
/// journal cannot be read or written. Collaborator failures are recorded in
/// the outcome instead.
#[instrument(skip_all, fields(%date))]
pub async fn trigger_reflection<R>(
    state: &SessionFlowState,
    reflector: &R,
    store: &JournalStore,
    date: NaiveDate,
) -> Result<ReflectionOutcome>
where
    R: Reflector + ?Sized,
{
    if !state.show_reflection {
        bail!("reflection step not revealed");
    }

    let submission = state.collect();
    let prompt = compose_submission_prompt(&submission);

    let (ai_response, error) = match reflector.reflect(&prompt).await {
        Ok(text) => (text, None),
        Err(err) => {
            warn!(error = %err, "reflection failed, saving error text");
            (failure_text(&err), Some(err))
        }
    };

    let entry = submission.into_entry(date, ai_response);
    store.append(&entry).context("save journal entry")?;
    info!(succeeded = error.is_none(), "reflection recorded");

    Ok(ReflectionOutcome { entry, error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::{Event, apply};
    use crate::core::types::Step;
    use crate::test_support::{ScriptedReflector, date, fully_revealed_session};

    #[tokio::test]
    async fn refuses_before_reflection_is_revealed() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = JournalStore::new(temp.path().join("journal.csv"));
        let reflector = ScriptedReflector::replying("unused");
        let state = apply(&SessionFlowState::default(), Event::Start);

        let err = trigger_reflection(&state, &reflector, &store, date("2024-01-01"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not revealed"));
        assert!(reflector.prompts().is_empty());
        assert!(!store.path().exists());
    }

    /// The collaborator sees the composed prompt for the revealed values.
    #[tokio::test]
    async fn sends_composed_prompt_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = JournalStore::new(temp.path().join("journal.csv"));
        let reflector = ScriptedReflector::replying("Great reflection!");
        let state = fully_revealed_session("I am calm", "coffee", 7, "sunshine");

        let outcome = trigger_reflection(&state, &reflector, &store, date("2024-01-01"))
            .await
            .expect("trigger");
        assert!(outcome.succeeded());
        assert_eq!(outcome.entry.ai_response, "Great reflection!");

        let prompts = reflector.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Mood: 7/10"));
        assert!(prompts[0].contains("Affirmation: I am calm"));
    }

    #[tokio::test]
    async fn empty_session_still_reflects() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = JournalStore::new(temp.path().join("journal.csv"));
        let reflector = ScriptedReflector::replying("ok");
        let state = apply(
            &apply(&SessionFlowState::default(), Event::Start),
            Event::Reveal(Step::Reflection),
        );

        let outcome = trigger_reflection(&state, &reflector, &store, date("2024-01-01"))
            .await
            .expect("trigger");
        assert_eq!(outcome.entry.mood, None);
        assert_eq!(outcome.entry.affirmation, "");
        assert_eq!(store.load_all().expect("load").len(), 1);
    }

    #[tokio::test]
    async fn collaborator_failure_is_persisted_as_text() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = JournalStore::new(temp.path().join("journal.csv"));
        let reflector = ScriptedReflector::failing(ReflectionError::RateLimited);
        let state = fully_revealed_session("", "", 5, "");

        let outcome = trigger_reflection(&state, &reflector, &store, date("2024-01-01"))
            .await
            .expect("trigger");
        assert_eq!(outcome.error, Some(ReflectionError::RateLimited));
        assert_eq!(outcome.entry.ai_response, "Error: rate limited or out of quota");

        let journal = store.load_all().expect("load");
        assert_eq!(journal.entries, vec![outcome.entry]);
    }
}
