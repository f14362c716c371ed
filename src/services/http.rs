//! HTTP client for the remote signup functions.
//!
//! Every operation is a JSON `POST` to `{base_url}/functions/v1/{name}` with
//! a bearer credential. Error bodies look like `{"error": "..."}`.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SignupService;
use crate::config::ServiceConfig;
use crate::error::{GENERIC_REQUEST_ERROR, ServiceError};
use crate::signup::model::{Offer, RegistrationRecord, StateCode, SummaryData, UserId};

const REGISTER_USER: &str = "register-user";
const GET_OFFERS: &str = "get-offers";
const SUBMIT_OFFERS: &str = "submit-offers";
const THANK_YOU_DATA: &str = "thank-you-data";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    user_id: String,
}

#[derive(Deserialize)]
struct OffersResponse {
    #[serde(default)]
    offers: Vec<Offer>,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    ok: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OffersRequest<'a> {
    state_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    user_id: &'a str,
    offer_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRequest<'a> {
    user_id: &'a str,
}

/// `SignupService` over HTTP.
pub struct HttpSignupService {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl HttpSignupService {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{name}", self.base_url)
    }

    async fn invoke<B, T>(&self, name: &str, body: &B) -> Result<T, ServiceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .client
            .post(self.function_url(name))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(function = name, "Request failed: {}", e);
                ServiceError::Network(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let err = error_for_status(status, &text);
            warn!(function = name, status = %status, "Service returned an error: {}", err);
            return Err(err);
        }

        debug!(function = name, status = %status, "Service call succeeded");
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

/// Map a failed response to the error taxonomy, keeping the service's own
/// message when it sent one.
fn error_for_status(status: StatusCode, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string());

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::Validation(message)
        }
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        StatusCode::CONFLICT => ServiceError::Conflict(message),
        _ => ServiceError::Server(message),
    }
}

#[async_trait]
impl SignupService for HttpSignupService {
    async fn register(&self, record: &RegistrationRecord) -> Result<UserId, ServiceError> {
        let resp: RegisterResponse = self.invoke(REGISTER_USER, record).await?;
        if resp.user_id.trim().is_empty() {
            return Err(ServiceError::InvalidResponse("empty userId".to_string()));
        }
        Ok(UserId::new(resp.user_id))
    }

    async fn get_offers(&self, state: StateCode) -> Result<Vec<Offer>, ServiceError> {
        let resp: OffersResponse = self
            .invoke(GET_OFFERS, &OffersRequest { state_code: state.as_str() })
            .await?;
        Ok(resp.offers)
    }

    async fn submit_offers(
        &self,
        user_id: &UserId,
        offer_ids: &[String],
    ) -> Result<bool, ServiceError> {
        let resp: SubmitResponse = self
            .invoke(
                SUBMIT_OFFERS,
                &SubmitRequest {
                    user_id: user_id.as_str(),
                    offer_ids,
                },
            )
            .await?;
        Ok(resp.ok)
    }

    async fn get_summary(&self, user_id: &UserId) -> Result<SummaryData, ServiceError> {
        self.invoke(THANK_YOU_DATA, &UserRequest { user_id: user_id.as_str() })
            .await
    }
}
