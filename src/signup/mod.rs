//! Multi-step signup: background → details → offer selection → summary.
//!
//! Validation and state transitions are pure; `StepFlow` wires them to the
//! session store and the remote services.

pub mod flow;
pub mod model;
pub mod routes;
pub mod sanitize;
pub mod state;
pub mod validation;

pub use flow::{BackgroundForm, Outcome, StepFlow, View};
pub use model::{
    EducationLevel, Offer, RegistrationRecord, StateCode, Step1Answers, Step2Draft, Step2Payload,
    SummaryData, UserId, UserSummary,
};
pub use routes::{SignupRouteState, signup_routes};
pub use state::{Effect, Step, Transition};
pub use validation::{
    OfferSelectionResult, ValidationResult, to_payload, validate_offer_selection, validate_step1,
    validate_step2,
};
