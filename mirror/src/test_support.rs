//! Test-only helpers: scripted reflection backends and session builders.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::core::session::{Event, SessionFlowState, apply};
use crate::core::types::Step;
use crate::io::reflection::{ReflectionError, Reflector};

/// Reflector that replays queued responses and records every prompt.
///
/// When the queue runs dry the last response is repeated.
pub struct ScriptedReflector {
    responses: Mutex<VecDeque<Result<String, ReflectionError>>>,
    last: Mutex<Option<Result<String, ReflectionError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedReflector {
    pub fn new(responses: Vec<Result<String, ReflectionError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(err: ReflectionError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl Reflector for ScriptedReflector {
    async fn reflect(&self, prompt: &str) -> Result<String, ReflectionError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        let mut last = self.last.lock().expect("last lock");
        if let Some(next) = self.responses.lock().expect("responses lock").pop_front() {
            *last = Some(next);
        }
        last.clone()
            .unwrap_or_else(|| Err(ReflectionError::Network("no scripted response".to_string())))
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

/// A started session with every step revealed and the given values typed in.
pub fn fully_revealed_session(
    affirmation: &str,
    gratitude: &str,
    mood: u8,
    good_thing: &str,
) -> SessionFlowState {
    let mut state = apply(&SessionFlowState::default(), Event::Start);
    for step in Step::ALL {
        state = apply(&state, Event::Reveal(step));
    }
    for event in [
        Event::EditAffirmation(affirmation.to_string()),
        Event::SetMood(mood),
        Event::EditGratitude(gratitude.to_string()),
        Event::EditGoodThing(good_thing.to_string()),
    ] {
        state = apply(&state, event);
    }
    state
}
