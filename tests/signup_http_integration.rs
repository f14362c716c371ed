//! Integration tests for the signup REST surface.
//!
//! Each test spins up an Axum server on a random port with a stub signup
//! service and walks the wizard over real HTTP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use offer_signup::error::ServiceError;
use offer_signup::services::SignupService;
use offer_signup::signup::routes::SESSION_HEADER;
use offer_signup::signup::{
    Offer, RegistrationRecord, SignupRouteState, StateCode, StepFlow, SummaryData, UserId,
    UserSummary, signup_routes,
};
use offer_signup::store::MemorySessionStore;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub signup service that remembers what it was sent.
#[derive(Default)]
struct StubService {
    registrations: Mutex<Vec<RegistrationRecord>>,
    submissions: Mutex<Vec<(String, Vec<String>)>>,
}

#[async_trait]
impl SignupService for StubService {
    async fn register(&self, record: &RegistrationRecord) -> Result<UserId, ServiceError> {
        if record.step2.email == "taken@example.com" {
            return Err(ServiceError::Conflict("Email already registered".into()));
        }
        self.registrations.lock().unwrap().push(record.clone());
        Ok(UserId::new("user-42"))
    }

    async fn get_offers(&self, state: StateCode) -> Result<Vec<Offer>, ServiceError> {
        Ok(vec![
            Offer {
                id: "o-1".into(),
                name: "Fiber internet".into(),
                description: "Six months free".into(),
                image_url: None,
                state_code: Some(state.as_str().into()),
            },
            Offer {
                id: "o-2".into(),
                name: "Course voucher".into(),
                description: "Any online course".into(),
                image_url: Some("https://img.example.com/voucher.png".into()),
                state_code: None,
            },
        ])
    }

    async fn submit_offers(
        &self,
        user_id: &UserId,
        offer_ids: &[String],
    ) -> Result<bool, ServiceError> {
        self.submissions
            .lock()
            .unwrap()
            .push((user_id.to_string(), offer_ids.to_vec()));
        Ok(true)
    }

    async fn get_summary(&self, user_id: &UserId) -> Result<SummaryData, ServiceError> {
        let registrations = self.registrations.lock().unwrap();
        let Some(record) = registrations.last() else {
            return Err(ServiceError::NotFound("User not found".into()));
        };
        Ok(SummaryData {
            user: UserSummary {
                id: user_id.to_string(),
                first_name: record.step2.first_name.clone(),
                last_name: record.step2.last_name.clone(),
                email: record.step2.email.clone(),
                phone: record.step2.phone.clone(),
                address: record.step2.address.clone(),
                city: record.step2.city.clone(),
                state_code: record.step2.state.as_str().into(),
                education_level: record.step1.education_level.as_str().into(),
                has_internet_access: record.step1.has_internet_access,
                has_certifications: record.step1.has_certifications,
            },
            offers: Vec::new(),
        })
    }
}

/// Start an Axum server on a random port, return (base url, service).
async fn start_server() -> (String, Arc<StubService>) {
    let store = MemorySessionStore::new(Duration::from_secs(600));
    let service = Arc::new(StubService::default());
    let flow = Arc::new(StepFlow::new(store, service.clone()));
    let app = signup_routes(SignupRouteState { flow });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), service)
}

/// One browser session talking to the server.
struct Visitor {
    client: reqwest::Client,
    base: String,
    session: String,
}

impl Visitor {
    fn new(base: &str, session: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.to_string(),
            session: session.to_string(),
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> (u16, Value) {
        let resp = req.header(SESSION_HEADER, &self.session).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        self.send(self.client.get(format!("{}{path}", self.base))).await
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.send(self.client.post(format!("{}{path}", self.base)).json(&body))
            .await
    }
}

fn background() -> Value {
    json!({
        "educationLevel": "associate",
        "hasInternetAccess": true,
        "hasCertifications": true
    })
}

fn details(email: &str) -> Value {
    json!({
        "firstName": " Ayesha ",
        "lastName": "Khan",
        "email": email,
        "phone": "+92 330 4014980",
        "address": "12 Mall Road",
        "city": "Lahore",
        "state": "NV",
        "agreement": true
    })
}

#[tokio::test]
async fn test_health() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_full_wizard() {
    timeout(TEST_TIMEOUT, async {
        let (base, service) = start_server().await;
        let v = Visitor::new(&base, "session-full");

        let (status, body) = v.post("/api/signup/background", background()).await;
        assert_eq!(status, 200);
        assert_eq!(body["outcome"], "navigate");
        assert_eq!(body["path"], "/step2");

        let (status, body) = v.get("/api/signup/details").await;
        assert_eq!(status, 200);
        assert_eq!(body["view"]["step"], "details");
        assert_eq!(body["view"]["form"]["phone"], "+92 ");

        let (status, body) = v.post("/api/signup/details", details("ayesha@example.com")).await;
        assert_eq!(status, 200);
        assert_eq!(body["to"], "offer_selection");

        let (_, body) = v.get("/api/signup/offers").await;
        assert_eq!(body["view"]["step"], "offer_selection");
        assert_eq!(body["view"]["offers"].as_array().unwrap().len(), 2);
        assert_eq!(body["view"]["offers"][0]["stateCode"], "NV");

        let (status, body) = v.post("/api/signup/offers", json!({"offerIds": ["o-2", ""]})).await;
        assert_eq!(status, 200);
        assert_eq!(body["path"], "/thank-you");

        let (_, body) = v.get("/api/signup/summary").await;
        assert_eq!(body["view"]["summary"]["user"]["firstName"], "Ayesha");
        assert_eq!(body["view"]["summary"]["user"]["educationLevel"], "associate");

        let (_, body) = v.post("/api/signup/restart", json!({})).await;
        assert_eq!(body["to"], "background");

        // After restart every guarded step redirects
        let (_, body) = v.get("/api/signup/summary").await;
        assert_eq!(body["outcome"], "navigate");
        assert_eq!(body["to"], "background");

        let registrations = service.registrations.lock().unwrap();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].step2.first_name, "Ayesha");
        assert_eq!(registrations[0].step2.state, StateCode::Nv);
        assert_eq!(
            service.submissions.lock().unwrap().as_slice(),
            &[("user-42".to_string(), vec!["o-2".to_string()])]
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_rejections_use_422() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let v = Visitor::new(&base, "session-reject");

        let partial = json!({"educationLevel": "bachelor"});
        let (status, body) = v.post("/api/signup/background", partial).await;
        assert_eq!(status, 422);
        assert_eq!(body["outcome"], "rejected");
        assert!(body["errors"]["hasInternetAccess"].is_string());
        assert!(body["errors"].get("educationLevel").is_none());

        v.post("/api/signup/background", background()).await;
        let (status, body) = v.post("/api/signup/details", details("taken@example.com")).await;
        assert_eq!(status, 422);
        assert_eq!(body["message"], "Email already registered");

        // Registration failed, so offers are still out of reach
        let (_, body) = v.get("/api/signup/offers").await;
        assert_eq!(body["to"], "background");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_back_keeps_draft() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let v = Visitor::new(&base, "session-back");

        v.post("/api/signup/background", background()).await;
        let draft = json!({"firstName": "Bilal", "email": "half@"});
        let (status, body) = v.post("/api/signup/details/back", draft).await;
        assert_eq!(status, 200);
        assert_eq!(body["to"], "background");

        let (_, body) = v.get("/api/signup/background").await;
        assert_eq!(body["view"]["form"]["educationLevel"], "associate");

        let (_, body) = v.get("/api/signup/page?path=/step2").await;
        assert_eq!(body["view"]["form"]["firstName"], "Bilal");
        assert_eq!(body["view"]["form"]["email"], "half@");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_sessions_are_isolated_and_issued() {
    timeout(TEST_TIMEOUT, async {
        let (base, _) = start_server().await;
        let (a, b) = (Visitor::new(&base, "a"), Visitor::new(&base, "b"));

        a.post("/api/signup/background", background()).await;
        let (_, body) = b.get("/api/signup/details").await;
        assert_eq!(body["to"], "background");

        // No header: a fresh session id is issued
        let resp = reqwest::Client::new()
            .get(format!("{base}/api/signup/page?path=/unknown"))
            .send()
            .await
            .unwrap();
        let issued = resp.headers()[SESSION_HEADER].to_str().unwrap().to_string();
        assert!(!issued.is_empty());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["to"], "background");
    })
    .await
    .expect("test timed out");
}
