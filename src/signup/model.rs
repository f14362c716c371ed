//! Registration data models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::sanitize::coerce_text;

/// Form field names, as posted by the client.
pub mod fields {
    pub const EDUCATION_LEVEL: &str = "educationLevel";
    pub const HAS_INTERNET_ACCESS: &str = "hasInternetAccess";
    pub const HAS_CERTIFICATIONS: &str = "hasCertifications";

    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const ADDRESS: &str = "address";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const AGREEMENT: &str = "agreement";

    pub const OFFER_IDS: &str = "offerIds";
}

/// Highest completed level of education.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    Bachelor,
    Graduate,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 4] = [
        Self::HighSchool,
        Self::Associate,
        Self::Bachelor,
        Self::Graduate,
    ];

    /// Wire value, e.g. `"high_school"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighSchool => "high_school",
            Self::Associate => "associate",
            Self::Bachelor => "bachelor",
            Self::Graduate => "graduate",
        }
    }

    /// Human-readable label used on the summary page.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighSchool => "High School",
            Self::Associate => "Associate",
            Self::Bachelor => "Bachelor",
            Self::Graduate => "Graduate",
        }
    }

    /// Exact match against the wire values.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed allow-list of states offers are available in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateCode {
    #[default]
    Al,
    Ky,
    Ma,
    Mn,
    Nj,
    Nv,
    Or,
    Sc,
    Tx,
    Wa,
}

impl StateCode {
    /// Allow-list in display order. The first entry is the fallback code.
    pub const ALL: [StateCode; 10] = [
        Self::Al,
        Self::Ky,
        Self::Ma,
        Self::Mn,
        Self::Nj,
        Self::Nv,
        Self::Or,
        Self::Sc,
        Self::Tx,
        Self::Wa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Al => "AL",
            Self::Ky => "KY",
            Self::Ma => "MA",
            Self::Mn => "MN",
            Self::Nj => "NJ",
            Self::Nv => "NV",
            Self::Or => "OR",
            Self::Sc => "SC",
            Self::Tx => "TX",
            Self::Wa => "WA",
        }
    }

    /// Case-sensitive lookup; well-formed codes outside the list are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == value)
    }
}

impl std::fmt::Display for StateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated answers from the background step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step1Answers {
    pub education_level: EducationLevel,
    pub has_internet_access: bool,
    pub has_certifications: bool,
}

/// Unvalidated personal-details fields, kept only to survive back navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Step2Draft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    /// A state code or empty.
    pub state: String,
}

impl Step2Draft {
    /// Capture the details form exactly as typed. No validation is done.
    pub fn from_form(form: &Value) -> Self {
        let field = |name: &str| form.get(name).map(coerce_text).unwrap_or_default();
        Self {
            first_name: field(fields::FIRST_NAME),
            last_name: field(fields::LAST_NAME),
            email: field(fields::EMAIL),
            phone: field(fields::PHONE),
            address: field(fields::ADDRESS),
            city: field(fields::CITY),
            state: field(fields::STATE),
        }
    }
}

/// Normalized personal details, built only after validation passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step2Payload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: StateCode,
    pub agreement: bool,
}

/// The unit sent to the registration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub step1: Step1Answers,
    pub step2: Step2Payload,
}

/// Opaque identifier assigned by the registration service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An offer a registered user can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// `None` for offers available in every state.
    #[serde(default)]
    pub state_code: Option<String>,
}

/// Registered user as reported back by the summary service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state_code: String,
    pub education_level: String,
    pub has_internet_access: bool,
    pub has_certifications: bool,
}

impl UserSummary {
    /// Education label for display; unknown values are shown as-is.
    pub fn education_label(&self) -> &str {
        EducationLevel::parse(&self.education_level)
            .map(|level| level.label())
            .unwrap_or(&self.education_level)
    }
}

/// Everything shown on the final summary step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryData {
    pub user: UserSummary,
    #[serde(default)]
    pub offers: Vec<Offer>,
}

/// Session slot keys.
pub mod session_keys {
    /// Validated background answers (JSON `Step1Answers`).
    pub const STEP1: &str = "step1";
    /// Details draft saved on back navigation (JSON `Step2Draft`).
    pub const STEP2_DRAFT: &str = "step2_draft";
    /// Identifier returned by the registration service.
    pub const USER_ID: &str = "user_id";
    /// State code submitted with the registration.
    pub const STATE: &str = "state";

    pub const ALL: [&str; 4] = [STEP1, STEP2_DRAFT, USER_ID, STATE];
}
