//! Session flow state and its event-driven transitions.
//!
//! Each user action maps to one [`Event`]; [`apply`] is the only way state
//! changes. Reveal flags are monotonic: once a step is shown it stays shown
//! for the rest of the session.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::types::{Mood, Step, Submission};

/// In-progress values typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub affirmation: String,
    pub gratitude: String,
    pub mood: Option<Mood>,
    pub good_thing: String,
}

/// Transient per-session state. Discarded when the session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlowState {
    /// Whether the welcome gate has been passed.
    pub started: bool,
    pub show_affirmation: bool,
    pub show_mood: bool,
    pub show_gratitude: bool,
    pub show_reflection: bool,
    pub draft: Draft,
}

/// A single user action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Event {
    Start,
    Reveal(Step),
    EditAffirmation(String),
    SetMood(u8),
    EditGratitude(String),
    EditGoodThing(String),
}

impl SessionFlowState {
    /// Reveal `step`. Idempotent.
    pub fn advance(&mut self, step: Step) {
        let flag = match step {
            Step::Affirmation => &mut self.show_affirmation,
            Step::Mood => &mut self.show_mood,
            Step::Gratitude => &mut self.show_gratitude,
            Step::Reflection => &mut self.show_reflection,
        };
        if *flag {
            return;
        }
        *flag = true;
        debug!(%step, "step revealed");

        if step == Step::Mood && self.draft.mood.is_none() {
            self.draft.mood = Some(Mood::DEFAULT);
        }
    }

    pub fn is_revealed(&self, step: Step) -> bool {
        match step {
            Step::Affirmation => self.show_affirmation,
            Step::Mood => self.show_mood,
            Step::Gratitude => self.show_gratitude,
            Step::Reflection => self.show_reflection,
        }
    }

    /// Values that would be submitted right now.
    ///
    /// Hidden steps contribute nothing: empty text and an absent mood.
    pub fn collect(&self) -> Submission {
        let text_if = |shown: bool, value: &str| {
            if shown {
                value.to_string()
            } else {
                String::new()
            }
        };
        Submission {
            affirmation: text_if(self.show_affirmation, &self.draft.affirmation),
            gratitude: text_if(self.show_gratitude, &self.draft.gratitude),
            mood: self.show_mood.then_some(self.draft.mood).flatten(),
            good_thing: text_if(self.show_gratitude, &self.draft.good_thing),
        }
    }
}

/// Apply `event` to `state`, returning the next state.
///
/// Events other than [`Event::Start`] are ignored until the session has
/// started, and edits to a step that is not revealed are dropped.
pub fn apply(state: &SessionFlowState, event: Event) -> SessionFlowState {
    let mut next = state.clone();

    if !next.started {
        if event == Event::Start {
            next.started = true;
            debug!("session started");
        } else {
            debug!(?event, "ignoring event before start");
        }
        return next;
    }

    match event {
        Event::Start => {}
        Event::Reveal(step) => next.advance(step),
        Event::EditAffirmation(text) => {
            if next.show_affirmation {
                next.draft.affirmation = text;
            }
        }
        Event::SetMood(value) => {
            if next.show_mood {
                match Mood::new(value) {
                    Ok(mood) => next.draft.mood = Some(mood),
                    Err(err) => warn!(%err, "ignoring mood update"),
                }
            }
        }
        Event::EditGratitude(text) => {
            if next.show_gratitude {
                next.draft.gratitude = text;
            }
        }
        Event::EditGoodThing(text) => {
            if next.show_gratitude {
                next.draft.good_thing = text;
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> SessionFlowState {
        apply(&SessionFlowState::default(), Event::Start)
    }

    fn flags(state: &SessionFlowState) -> [bool; 4] {
        Step::ALL.map(|step| state.is_revealed(step))
    }

    /// Every reveal stays set no matter which steps are revealed afterwards.
    ///
    /// Walks all orderings of four reveals drawn from the steps (with repeats)
    /// and checks each flag never goes back to false.
    #[test]
    fn reveal_flags_are_monotonic() {
        for seq in 0..4u32.pow(4) {
            let mut state = started();
            let mut seen = [false; 4];
            let mut n = seq;
            for _ in 0..4 {
                let idx = (n % 4) as usize;
                n /= 4;
                state = apply(&state, Event::Reveal(Step::ALL[idx]));
                seen[idx] = true;
                let now = flags(&state);
                for (i, was_seen) in seen.iter().enumerate() {
                    assert_eq!(now[i], *was_seen, "sequence {seq}");
                }
            }
        }
    }

    #[test]
    fn advance_is_idempotent() {
        let mut state = started();
        state.advance(Step::Gratitude);
        let once = state.clone();
        state.advance(Step::Gratitude);
        assert_eq!(state, once);
    }

    #[test]
    fn events_before_start_are_ignored() {
        let state = SessionFlowState::default();
        let next = apply(&state, Event::Reveal(Step::Affirmation));
        assert_eq!(next, state);
        assert!(!next.started);
    }

    #[test]
    fn edits_to_hidden_steps_are_dropped() {
        let state = started();
        let next = apply(&state, Event::EditAffirmation("hello".to_string()));
        assert_eq!(next.draft.affirmation, "");

        let next = apply(&next, Event::Reveal(Step::Affirmation));
        let next = apply(&next, Event::EditAffirmation("hello".to_string()));
        assert_eq!(next.draft.affirmation, "hello");
    }

    /// Revealing mood seeds the slider default; hidden mood collects as absent.
    #[test]
    fn mood_is_absent_until_revealed() {
        let state = started();
        assert_eq!(state.collect().mood, None);

        let state = apply(&state, Event::Reveal(Step::Mood));
        assert_eq!(state.collect().mood, Some(Mood::DEFAULT));

        let state = apply(&state, Event::SetMood(8));
        assert_eq!(state.collect().mood.map(Mood::value), Some(8));

        let state = apply(&state, Event::SetMood(12));
        assert_eq!(state.collect().mood.map(Mood::value), Some(8));
    }

    #[test]
    fn gratitude_step_covers_good_thing() {
        let state = apply(&started(), Event::Reveal(Step::Gratitude));
        let state = apply(&state, Event::EditGratitude("coffee".to_string()));
        let state = apply(&state, Event::EditGoodThing("sunshine".to_string()));
        let submission = state.collect();
        assert_eq!(submission.gratitude, "coffee");
        assert_eq!(submission.good_thing, "sunshine");
        assert_eq!(submission.affirmation, "");
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let event: Event =
            serde_json::from_str(r#"{"type":"reveal","value":"mood"}"#).expect("reveal");
        assert_eq!(event, Event::Reveal(Step::Mood));
        let event: Event = serde_json::from_str(r#"{"type":"start"}"#).expect("start");
        assert_eq!(event, Event::Start);
        let event: Event =
            serde_json::from_str(r#"{"type":"set_mood","value":7}"#).expect("mood");
        assert_eq!(event, Event::SetMood(7));
    }
}
