use reqwest::Client;
use uuid::Uuid;

use crate::types::{AuthResponse, EventRecord, SchedulePayload};

/// The auth and schedule operations the controller needs. `ApiClient` is the
/// real implementation; tests drive the controller with a scripted double.
pub trait CalendarApi {
    fn signup(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthResponse, String>> + Send;

    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthResponse, String>> + Send;

    fn list_schedules(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Vec<EventRecord>, String>> + Send;

    fn create_schedule(
        &self,
        token: &str,
        payload: &SchedulePayload,
    ) -> impl std::future::Future<Output = Result<EventRecord, String>> + Send;

    fn update_schedule(
        &self,
        token: &str,
        id: Uuid,
        payload: &SchedulePayload,
    ) -> impl std::future::Future<Output = Result<EventRecord, String>> + Send;

    fn delete_schedule(
        &self,
        token: &str,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<(), String>> + Send;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_schedule(&self, token: &str, id: Uuid) -> Result<EventRecord, String> {
        let resp = self
            .client
            .get(format!("{}/schedule/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        resp.json::<EventRecord>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }
}

impl CalendarApi for ApiClient {
    // ── Auth ────────────────────────────────────────────────────────────

    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, String> {
        let resp = self
            .client
            .post(format!("{}/api/auth/signup", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        resp.json::<AuthResponse>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, String> {
        let resp = self
            .client
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        resp.json::<AuthResponse>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }

    // ── Schedules ───────────────────────────────────────────────────────

    async fn list_schedules(&self, token: &str) -> Result<Vec<EventRecord>, String> {
        let resp = self
            .client
            .get(format!("{}/schedule", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        resp.json::<Vec<EventRecord>>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }

    async fn create_schedule(
        &self,
        token: &str,
        payload: &SchedulePayload,
    ) -> Result<EventRecord, String> {
        let resp = self
            .client
            .post(format!("{}/schedule", self.base_url))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        resp.json::<EventRecord>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }

    async fn update_schedule(
        &self,
        token: &str,
        id: Uuid,
        payload: &SchedulePayload,
    ) -> Result<EventRecord, String> {
        let resp = self
            .client
            .put(format!("{}/schedule/{}", self.base_url, id))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        resp.json::<EventRecord>()
            .await
            .map_err(|e| format!("Parse error: {}", e))
    }

    async fn delete_schedule(&self, token: &str, id: Uuid) -> Result<(), String> {
        let resp = self
            .client
            .delete(format!("{}/schedule/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| format!("Network error: {}", e))?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(extract_error(&body));
        }

        Ok(())
    }
}

fn extract_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| body.to_string())
}
