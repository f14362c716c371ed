//! Coordinates session slots, validators and remote services for each step
//! of the signup wizard.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::model::{
    EducationLevel, Offer, RegistrationRecord, StateCode, Step2Draft, SummaryData, fields,
};
use super::sanitize::{PHONE_PREFIX, format_phone_display};
use super::state::{Step, Transition};
use super::validation::{
    FieldErrors, selected_offer_ids, to_payload, validate_offer_selection, validate_step2,
};
use crate::error::ServiceError;
use crate::services::SignupService;
use crate::store::{DraftState, SessionStore};

/// Shown when the offer list cannot be fetched.
pub const OFFERS_LOAD_ERROR: &str = "Failed to load offers.";
/// Shown when the summary cannot be fetched.
pub const SUMMARY_LOAD_ERROR: &str = "Failed to load summary.";
/// Shown when the summary service does not know the user.
pub const SUMMARY_NOT_FOUND: &str = "User not found.";
/// Shown when the submission service answers without a success flag.
pub const SUBMISSION_FAILED: &str = "Submission failed.";

/// Background answers used to pre-fill the first step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundForm {
    pub education_level: Option<EducationLevel>,
    pub has_internet_access: Option<bool>,
    pub has_certifications: Option<bool>,
}

/// What the presentation layer should render for a step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum View {
    Background {
        form: BackgroundForm,
    },
    Details {
        form: Step2Draft,
        states: Vec<StateCode>,
    },
    OfferSelection {
        offers: Vec<Offer>,
        #[serde(skip_serializing_if = "Option::is_none")]
        load_error: Option<String>,
    },
    Summary {
        #[serde(skip_serializing_if = "Option::is_none")]
        summary: Option<SummaryData>,
        #[serde(skip_serializing_if = "Option::is_none")]
        load_error: Option<String>,
    },
}

/// Result of a controller operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Stay on the step and render it.
    Render { view: View },
    /// Go to another step.
    Navigate { to: Step, path: &'static str },
    /// The submission was refused; nothing changed.
    Rejected {
        errors: FieldErrors,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Outcome {
    fn render(view: View) -> Self {
        Self::Render { view }
    }

    fn navigate(to: Step) -> Self {
        Self::Navigate { to, path: to.path() }
    }

    fn field_errors(errors: FieldErrors) -> Self {
        Self::Rejected {
            errors,
            message: None,
        }
    }

    fn banner(message: impl Into<String>) -> Self {
        Self::Rejected {
            errors: FieldErrors::new(),
            message: Some(message.into()),
        }
    }

    /// Whether the submission was refused.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Drives the signup wizard for any number of sessions.
///
/// Holds no per-session state itself: everything a step needs lives in the
/// session store, so every call is independent and re-entrant.
pub struct StepFlow {
    store: Arc<dyn SessionStore>,
    service: Arc<dyn SignupService>,
}

impl StepFlow {
    pub fn new(store: Arc<dyn SessionStore>, service: Arc<dyn SignupService>) -> Self {
        Self { store, service }
    }

    fn slots<'a>(&'a self, session: &'a str) -> DraftState<'a> {
        DraftState::new(self.store.as_ref(), session)
    }

    async fn follow(&self, session: &str, transition: Transition) -> Outcome {
        self.slots(session).apply(&transition.effects).await;
        info!(session, from = %transition.from, to = %transition.to, "Signup step transition");
        Outcome::navigate(transition.destination())
    }

    fn redirect(&self, session: &str, from: Step) -> Outcome {
        debug!(session, step = %from, "Missing session state, redirecting to first step");
        Outcome::navigate(Transition::precondition_failed(from).destination())
    }

    /// Enter whichever step a URL path names. Unknown paths go to Background.
    pub async fn enter_path(&self, session: &str, path: &str) -> Outcome {
        match Step::from_path(path) {
            Some(Step::Background) => self.enter_background(session).await,
            Some(Step::Details) => self.enter_details(session).await,
            Some(Step::OfferSelection) => self.enter_offer_selection(session).await,
            Some(Step::Summary) => self.enter_summary(session).await,
            Some(Step::Restarted) | None => Outcome::navigate(Step::Background),
        }
    }

    // ── Background ──────────────────────────────────────────────────

    /// Render the background step, pre-filled from earlier answers.
    pub async fn enter_background(&self, session: &str) -> Outcome {
        let form = match self.slots(session).step1().await {
            Some(answers) => BackgroundForm {
                education_level: Some(answers.education_level),
                has_internet_access: Some(answers.has_internet_access),
                has_certifications: Some(answers.has_certifications),
            },
            None => BackgroundForm::default(),
        };
        Outcome::render(View::Background { form })
    }

    /// Validate and store the background answers, then move to Details.
    pub async fn submit_background(&self, session: &str, form: &Value) -> Outcome {
        match Transition::submit_background(form) {
            Ok(transition) => self.follow(session, transition).await,
            Err(result) => {
                debug!(session, invalid = result.errors.len(), "Background step rejected");
                Outcome::field_errors(result.errors)
            }
        }
    }

    // ── Details ─────────────────────────────────────────────────────

    /// Render the details step, pre-filled from a saved draft.
    pub async fn enter_details(&self, session: &str) -> Outcome {
        let slots = self.slots(session);
        if slots.step1().await.is_none() {
            return self.redirect(session, Step::Details);
        }

        let mut form = slots.draft().await.unwrap_or_default();
        form.phone = if form.phone.trim().starts_with(PHONE_PREFIX.trim()) {
            format_phone_display(&form.phone)
        } else {
            PHONE_PREFIX.to_string()
        };
        Outcome::render(View::Details {
            form,
            states: StateCode::ALL.to_vec(),
        })
    }

    /// Keep the current (unvalidated) details as a draft and go back.
    pub async fn back_from_details(&self, session: &str, form: &Value) -> Outcome {
        self.follow(session, Transition::leave_details(form)).await
    }

    /// Validate the details, register the user and move to offer selection.
    ///
    /// On a registration failure the session is left untouched and the
    /// failure is reported as a banner message. A registration that resolves
    /// after the session was restarted or its background answers changed is
    /// dropped and the user is sent back to the first step.
    pub async fn submit_details(&self, session: &str, form: &Value) -> Outcome {
        let slots = self.slots(session);
        let Some(step1) = slots.step1().await else {
            return self.redirect(session, Step::Details);
        };

        let result = validate_step2(form);
        if !result.valid {
            debug!(session, invalid = result.errors.len(), "Details step rejected");
            return Outcome::field_errors(result.errors);
        }

        let step2 = to_payload(form);
        let state = step2.state;
        let record = RegistrationRecord { step1, step2 };

        let user_id = match self.service.register(&record).await {
            Ok(user_id) => user_id,
            Err(e) => {
                warn!(session, "Registration failed: {}", e);
                return Outcome::banner(e.user_message());
            }
        };

        if slots.step1().await.as_ref() != Some(&record.step1) {
            warn!(session, "Session changed during registration, discarding result");
            return self.redirect(session, Step::Details);
        }

        info!(session, state = %state, "Registration accepted");
        self.follow(session, Transition::registered(user_id, state)).await
    }

    // ── Offer selection ─────────────────────────────────────────────

    /// Fetch and render the offers for the registered state.
    pub async fn enter_offer_selection(&self, session: &str) -> Outcome {
        let slots = self.slots(session);
        let (Some(_), Some(state)) = (slots.user_id().await, slots.chosen_state().await) else {
            return self.redirect(session, Step::OfferSelection);
        };

        match self.service.get_offers(state).await {
            Ok(offers) => {
                debug!(session, state = %state, count = offers.len(), "Offers loaded");
                Outcome::render(View::OfferSelection {
                    offers,
                    load_error: None,
                })
            }
            Err(e) => {
                warn!(session, state = %state, "Failed to load offers: {}", e);
                Outcome::render(View::OfferSelection {
                    offers: Vec::new(),
                    load_error: Some(OFFERS_LOAD_ERROR.to_string()),
                })
            }
        }
    }

    /// Validate the chosen offers, submit them and move to the summary.
    ///
    /// `form` carries the ids under `offerIds`.
    pub async fn submit_offer_selection(&self, session: &str, form: &Value) -> Outcome {
        let slots = self.slots(session);
        let (Some(user_id), Some(_)) = (slots.user_id().await, slots.chosen_state().await) else {
            return self.redirect(session, Step::OfferSelection);
        };

        let selection = form.get(fields::OFFER_IDS).unwrap_or(&Value::Null);
        let result = validate_offer_selection(selection);
        if !result.valid {
            return Outcome::Rejected {
                errors: FieldErrors::new(),
                message: result.error,
            };
        }

        let offer_ids = selected_offer_ids(selection);
        match self.service.submit_offers(&user_id, &offer_ids).await {
            Ok(true) => {
                info!(session, count = offer_ids.len(), "Offers submitted");
                self.follow(session, Transition::offers_submitted()).await
            }
            Ok(false) => {
                warn!(session, "Offer submission reported failure");
                Outcome::banner(SUBMISSION_FAILED)
            }
            Err(e) => {
                warn!(session, "Offer submission failed: {}", e);
                Outcome::banner(e.user_message())
            }
        }
    }

    // ── Summary ─────────────────────────────────────────────────────

    /// Fetch and render the registration summary.
    pub async fn enter_summary(&self, session: &str) -> Outcome {
        let Some(user_id) = self.slots(session).user_id().await else {
            return self.redirect(session, Step::Summary);
        };

        match self.service.get_summary(&user_id).await {
            Ok(summary) => Outcome::render(View::Summary {
                summary: Some(summary),
                load_error: None,
            }),
            Err(e) => {
                warn!(session, "Failed to load summary: {}", e);
                let message = match e {
                    ServiceError::NotFound(_) => SUMMARY_NOT_FOUND,
                    _ => SUMMARY_LOAD_ERROR,
                };
                Outcome::render(View::Summary {
                    summary: None,
                    load_error: Some(message.to_string()),
                })
            }
        }
    }

    /// Start over: clear every session slot and go back to the first step.
    pub async fn restart(&self, session: &str) -> Outcome {
        let transition = Transition::restart();
        self.slots(session).apply(&transition.effects).await;
        info!(session, "Signup restarted");
        Outcome::navigate(transition.destination())
    }
}
