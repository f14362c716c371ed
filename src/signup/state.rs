//! Signup state machine: the wizard steps and their guarded transitions.
//!
//! Transitions are plain values: a target step plus the session effects to
//! apply. The builders here hold the guards that need no I/O; the flow
//! controller runs the remote calls and then asks for the transition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{StateCode, Step1Answers, Step2Draft, UserId};
use super::validation::{ValidationResult, step1_answers, validate_step1};

/// The steps of the registration wizard.
///
/// Progresses Background → Details → OfferSelection → Summary → Restarted.
/// Details may go back to Background, and any step falls back to Background
/// when its session preconditions are missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Background,
    Details,
    OfferSelection,
    Summary,
    Restarted,
}

impl Step {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Step) -> bool {
        use Step::*;
        matches!(
            (self, target),
            (Background, Details)
                | (Details, OfferSelection)
                | (OfferSelection, Summary)
                | (Summary, Restarted)
                | (_, Background)
        )
    }

    /// Whether this step ends a run through the wizard.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Restarted)
    }

    /// URL path the presentation layer shows this step at.
    ///
    /// `Restarted` has no page of its own; it lands on Background.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Background | Self::Restarted => "/",
            Self::Details => "/step2",
            Self::OfferSelection => "/results",
            Self::Summary => "/thank-you",
        }
    }

    /// Resolve a URL path to a step. A trailing slash is ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = match path.trim_end_matches('/') {
            "" => "/",
            other => other,
        };
        match trimmed {
            "/" => Some(Self::Background),
            "/step2" => Some(Self::Details),
            "/results" => Some(Self::OfferSelection),
            "/thank-you" => Some(Self::Summary),
            _ => None,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Background => "background",
            Self::Details => "details",
            Self::OfferSelection => "offer_selection",
            Self::Summary => "summary",
            Self::Restarted => "restarted",
        };
        write!(f, "{s}")
    }
}

/// A change to the session slots produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SaveStep1(Step1Answers),
    SaveDraft(Step2Draft),
    SaveRegistration { user_id: UserId, state: StateCode },
    ClearDraft,
    ClearAll,
}

/// A guarded move between steps together with its effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn new(from: Step, to: Step, effects: Vec<Effect>) -> Self {
        debug_assert!(from.can_transition_to(to), "{from} -> {to}");
        Self { from, to, effects }
    }

    /// Background → Details, guarded by the step-1 validator.
    pub fn submit_background(form: &Value) -> Result<Self, ValidationResult> {
        let result = validate_step1(form);
        if !result.valid {
            return Err(result);
        }
        match step1_answers(form) {
            Some(answers) => Ok(Self::new(
                Step::Background,
                Step::Details,
                vec![Effect::SaveStep1(answers)],
            )),
            None => Err(result),
        }
    }

    /// Details → Background without validation; the form is kept as a draft.
    pub fn leave_details(form: &Value) -> Self {
        Self::new(
            Step::Details,
            Step::Background,
            vec![Effect::SaveDraft(Step2Draft::from_form(form))],
        )
    }

    /// Details → OfferSelection after the registration service accepted.
    pub fn registered(user_id: UserId, state: StateCode) -> Self {
        Self::new(
            Step::Details,
            Step::OfferSelection,
            vec![
                Effect::SaveRegistration { user_id, state },
                Effect::ClearDraft,
            ],
        )
    }

    /// OfferSelection → Summary after the submission service accepted.
    pub fn offers_submitted() -> Self {
        Self::new(Step::OfferSelection, Step::Summary, Vec::new())
    }

    /// Summary → Restarted: drop every session slot.
    ///
    /// Also used for restarts from other steps, so `from` is nominal.
    pub fn restart() -> Self {
        Self::new(Step::Summary, Step::Restarted, vec![Effect::ClearAll])
    }

    /// Missing preconditions: send the user back to the first step.
    pub fn precondition_failed(from: Step) -> Self {
        Self::new(from, Step::Background, Vec::new())
    }

    /// Where the user should be sent after this transition.
    pub fn destination(&self) -> Step {
        if self.to.is_terminal() {
            Step::Background
        } else {
            self.to
        }
    }
}
