//! Server-rendered journaling page.
//!
//! `GET /` renders the current session. `POST /` is the form submit: it
//! applies the typed field values, then the action of the pressed button,
//! and redirects back to `GET /`.

use axum::Form;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use minijinja::{Environment, context};
use mirror::core::session::{Event, apply};
use mirror::core::types::Step;
use mirror::reflect::trigger_reflection;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::routes::{ApiError, internal};
use crate::state::{AppState, Session};

const PAGE_TEMPLATE: &str = include_str!("templates/page.html");

pub fn page_router() -> Router<AppState> {
    Router::new().route("/", get(show_page).post(submit_form))
}

/// What the pressed button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Reveal(Step),
    Reflect,
    End,
}

impl Action {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "start" => Some(Action::Start),
            "reflect" => Some(Action::Reflect),
            "end" => Some(Action::End),
            other => {
                let step = other.strip_prefix("reveal_")?;
                Step::ALL
                    .into_iter()
                    .find(|s| s.as_str() == step)
                    .map(Action::Reveal)
            }
        }
    }
}

/// Form fields. Inputs for hidden steps are not rendered, so they arrive as
/// `None`.
#[derive(Debug, Deserialize)]
pub struct PageForm {
    action: String,
    affirmation: Option<String>,
    mood: Option<u8>,
    gratitude: Option<String>,
    good_thing: Option<String>,
}

impl PageForm {
    fn edit_events(&self) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(text) = &self.affirmation {
            events.push(Event::EditAffirmation(text.clone()));
        }
        if let Some(mood) = self.mood {
            events.push(Event::SetMood(mood));
        }
        if let Some(text) = &self.gratitude {
            events.push(Event::EditGratitude(text.clone()));
        }
        if let Some(text) = &self.good_thing {
            events.push(Event::EditGoodThing(text.clone()));
        }
        events
    }
}

#[derive(Serialize)]
struct OutcomeView {
    text: String,
    succeeded: bool,
}

async fn show_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let session = state.session.lock().await;
    render(&session, &(state.today)().to_string()).map(Html)
}

async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<PageForm>,
) -> Result<Response, ApiError> {
    let action = Action::parse(&form.action).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            format!("unknown action {:?}", form.action),
        )
    })?;
    debug!(?action, "form submitted");

    let mut session = state.session.lock().await;
    if action == Action::End {
        *session = Session::default();
        return Ok(Redirect::to("/").into_response());
    }

    for event in form.edit_events() {
        session.flow = apply(&session.flow, event);
    }
    session.last_outcome = None;

    match action {
        Action::Start => session.flow = apply(&session.flow, Event::Start),
        Action::Reveal(step) => session.flow = apply(&session.flow, Event::Reveal(step)),
        Action::Reflect => {
            session.flow = apply(&session.flow, Event::Reveal(Step::Reflection));
            if session.flow.show_reflection {
                let outcome = trigger_reflection(
                    &session.flow,
                    state.reflector.as_ref(),
                    &state.store,
                    (state.today)(),
                )
                .await
                .map_err(internal)?;
                session.last_outcome = Some(outcome);
            }
        }
        Action::End => {}
    }

    Ok(Redirect::to("/").into_response())
}

fn render(session: &Session, today: &str) -> Result<String, ApiError> {
    let mut env = Environment::new();
    env.add_template("page.html", PAGE_TEMPLATE)
        .map_err(internal)?;
    let outcome = session.last_outcome.as_ref().map(|outcome| OutcomeView {
        text: outcome.entry.ai_response.clone(),
        succeeded: outcome.succeeded(),
    });
    env.get_template("page.html")
        .and_then(|template| {
            template.render(context! {
                session => &session.flow,
                today => today,
                outcome => outcome,
            })
        })
        .map_err(internal)
}
