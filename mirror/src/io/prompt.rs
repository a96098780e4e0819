//! Reflection prompt rendering.
//!
//! The instruction text lives in `prompts/reflection.md` and is rendered with
//! minijinja. Rendering is deterministic: the same inputs always produce the
//! same prompt.

use std::sync::LazyLock;

use minijinja::{Environment, context};
use tracing::debug;

use crate::core::types::{Mood, Submission};

const REFLECTION_TEMPLATE: &str = include_str!("prompts/reflection.md");

/// Shown in place of the mood when the mood step was never revealed.
pub const MOOD_PLACEHOLDER: &str = "not recorded";

static ENGINE: LazyLock<PromptEngine> = LazyLock::new(PromptEngine::new);

/// Template engine wrapper around minijinja.
struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("reflection", REFLECTION_TEMPLATE)
            .expect("reflection template should be valid");
        Self { env }
    }

    fn render_reflection(
        &self,
        affirmation: &str,
        gratitude: &str,
        mood: Option<Mood>,
        good_thing: &str,
    ) -> String {
        let template = self
            .env
            .get_template("reflection")
            .expect("reflection template should be registered");
        template
            .render(context! {
                affirmation => affirmation.trim(),
                gratitude => gratitude.trim(),
                mood => mood.map(Mood::value),
                good_thing => good_thing.trim(),
            })
            .expect("reflection template renders plain string and integer values")
    }
}

/// Render the reflection instruction for the four journal fields.
///
/// Empty text renders as an empty value and an absent mood renders as
/// [`MOOD_PLACEHOLDER`].
pub fn compose_prompt(
    affirmation: &str,
    gratitude: &str,
    mood: Option<Mood>,
    good_thing: &str,
) -> String {
    let rendered = ENGINE.render_reflection(affirmation, gratitude, mood, good_thing);
    debug!(bytes = rendered.len(), "reflection prompt rendered");
    rendered
}

/// Render the prompt for a collected submission.
pub fn compose_submission_prompt(submission: &Submission) -> String {
    compose_prompt(
        &submission.affirmation,
        &submission.gratitude,
        submission.mood,
        &submission.good_thing,
    )
}
