//! Step validators.
//!
//! Every validator is a pure function from an untyped form value (as posted
//! by the client) to a structured result. All rules are evaluated and every
//! applicable error is reported together; nothing here fails or panics.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::model::{EducationLevel, StateCode, Step1Answers, Step2Payload, fields};
use super::sanitize::{sanitize_field, strip_whitespace};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?923[0-9]{9}$").expect("valid phone regex"));

/// Per-field error messages.
pub type FieldErrors = BTreeMap<String, String>;

/// Result of validating one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: FieldErrors,
}

impl ValidationResult {
    fn from_errors(errors: FieldErrors) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Result of validating the offer selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OfferSelectionResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── Step 1 ──────────────────────────────────────────────────────────────

/// Validate the background step.
pub fn validate_step1(form: &Value) -> ValidationResult {
    let mut errors = FieldErrors::new();

    match form.get(fields::EDUCATION_LEVEL) {
        None | Some(Value::Null) => {
            errors.insert(
                fields::EDUCATION_LEVEL.into(),
                "Please select your level of education.".into(),
            );
        }
        Some(Value::String(s)) if s.is_empty() => {
            errors.insert(
                fields::EDUCATION_LEVEL.into(),
                "Please select your level of education.".into(),
            );
        }
        Some(value) => {
            if value.as_str().and_then(EducationLevel::parse).is_none() {
                errors.insert(
                    fields::EDUCATION_LEVEL.into(),
                    "Invalid education level.".into(),
                );
            }
        }
    }

    check_yes_no(
        form,
        fields::HAS_INTERNET_ACCESS,
        "Please select Yes or No for internet access.",
        &mut errors,
    );
    check_yes_no(
        form,
        fields::HAS_CERTIFICATIONS,
        "Please select Yes or No for certifications.",
        &mut errors,
    );

    ValidationResult::from_errors(errors)
}

fn check_yes_no(form: &Value, field: &str, required: &str, errors: &mut FieldErrors) {
    match form.get(field) {
        None | Some(Value::Null) => {
            errors.insert(field.into(), required.into());
        }
        Some(Value::Bool(_)) => {}
        Some(_) => {
            errors.insert(field.into(), "Invalid value.".into());
        }
    }
}

/// Assemble the answers from a form that passed [`validate_step1`].
///
/// Returns `None` if any field is missing or malformed.
pub fn step1_answers(form: &Value) -> Option<Step1Answers> {
    Some(Step1Answers {
        education_level: EducationLevel::parse(form.get(fields::EDUCATION_LEVEL)?.as_str()?)?,
        has_internet_access: form.get(fields::HAS_INTERNET_ACCESS)?.as_bool()?,
        has_certifications: form.get(fields::HAS_CERTIFICATIONS)?.as_bool()?,
    })
}

// ── Step 2 ──────────────────────────────────────────────────────────────

/// Validate the personal-details step.
pub fn validate_step2(form: &Value) -> ValidationResult {
    let mut errors = FieldErrors::new();

    require(form, fields::FIRST_NAME, "First name is required.", &mut errors);
    require(form, fields::LAST_NAME, "Last name is required.", &mut errors);

    let email = sanitize_field(form, fields::EMAIL);
    if email.is_empty() {
        errors.insert(fields::EMAIL.into(), "Email is required.".into());
    } else if !EMAIL_REGEX.is_match(&email) {
        errors.insert(
            fields::EMAIL.into(),
            "Please enter a valid email address.".into(),
        );
    }

    let phone = strip_whitespace(&sanitize_field(form, fields::PHONE));
    if phone.is_empty() {
        errors.insert(fields::PHONE.into(), "Phone number is required.".into());
    } else if !PHONE_REGEX.is_match(&phone) {
        errors.insert(
            fields::PHONE.into(),
            "Enter a valid mobile number, e.g. +92 330 4014980".into(),
        );
    }

    require(form, fields::ADDRESS, "Address is required.", &mut errors);
    require(form, fields::CITY, "City is required.", &mut errors);

    match form.get(fields::STATE) {
        Some(Value::String(s)) if !s.is_empty() => {
            if StateCode::parse(s).is_none() {
                errors.insert(fields::STATE.into(), "Please select a valid state.".into());
            }
        }
        _ => {
            errors.insert(fields::STATE.into(), "State is required.".into());
        }
    }

    if form.get(fields::AGREEMENT) != Some(&Value::Bool(true)) {
        errors.insert(
            fields::AGREEMENT.into(),
            "You must agree to the terms to continue.".into(),
        );
    }

    ValidationResult::from_errors(errors)
}

fn require(form: &Value, field: &str, message: &str, errors: &mut FieldErrors) {
    if sanitize_field(form, field).is_empty() {
        errors.insert(field.into(), message.into());
    }
}

/// Build the normalized payload from a details form.
///
/// Does not check validity: call [`validate_step2`] first. An absent or
/// unknown state falls back to the first allow-list code.
pub fn to_payload(form: &Value) -> Step2Payload {
    let state = form
        .get(fields::STATE)
        .and_then(Value::as_str)
        .and_then(StateCode::parse)
        .unwrap_or_default();

    Step2Payload {
        first_name: sanitize_field(form, fields::FIRST_NAME),
        last_name: sanitize_field(form, fields::LAST_NAME),
        email: sanitize_field(form, fields::EMAIL),
        phone: sanitize_field(form, fields::PHONE),
        address: sanitize_field(form, fields::ADDRESS),
        city: sanitize_field(form, fields::CITY),
        state,
        agreement: form.get(fields::AGREEMENT) == Some(&Value::Bool(true)),
    }
}

// ── Offer selection ─────────────────────────────────────────────────────

/// Non-empty string ids from a selection value; anything else is dropped.
pub fn selected_offer_ids(selection: &Value) -> Vec<String> {
    selection
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Validate that at least one offer was chosen.
pub fn validate_offer_selection(selection: &Value) -> OfferSelectionResult {
    if selected_offer_ids(selection).is_empty() {
        return OfferSelectionResult {
            valid: false,
            error: Some("Please select at least one offer.".to_string()),
        };
    }
    OfferSelectionResult {
        valid: true,
        error: None,
    }
}
