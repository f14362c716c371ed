//! Remote collaborators: registration, offer lookup/submission and summary.

pub mod http;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::signup::model::{Offer, RegistrationRecord, StateCode, SummaryData, UserId};

pub use http::HttpSignupService;

/// The remote services the signup flow talks to.
///
/// One call per user action; implementations do not retry.
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Create the user record. Fails with `Validation`, `Conflict` or `Server`.
    async fn register(&self, record: &RegistrationRecord) -> Result<UserId, ServiceError>;

    /// Offers available in a state (including state-independent ones).
    async fn get_offers(&self, state: StateCode) -> Result<Vec<Offer>, ServiceError>;

    /// Attach the chosen offers to a user. Returns the service's success flag.
    async fn submit_offers(
        &self,
        user_id: &UserId,
        offer_ids: &[String],
    ) -> Result<bool, ServiceError>;

    /// Registered user and chosen offers. Fails with `NotFound` for unknown users.
    async fn get_summary(&self, user_id: &UserId) -> Result<SummaryData, ServiceError>;
}
