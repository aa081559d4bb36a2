use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled Event";

// ── Auth types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
}

/// Identity the controller acts under. `login`/`signup` fill everything;
/// a session restored from a stored token only carries the token.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub token: String,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
}

// ── Schedule types (mirror the server's API types) ──────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePayload {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
}

// ── Editor state ────────────────────────────────────────────────────────────

/// Contents of the editor modal. `id: None` means the draft came from a
/// range selection and saving creates a new event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub id: Option<Uuid>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

impl EventDraft {
    pub fn payload(&self) -> SchedulePayload {
        SchedulePayload {
            start: self.start,
            end: self.end,
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
        }
    }
}

impl From<&EventRecord> for EventDraft {
    fn from(event: &EventRecord) -> Self {
        let title = if event.title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            event.title.clone()
        };
        Self {
            id: Some(event.id),
            start: event.start,
            end: event.end,
            title,
            description: event.description.clone(),
        }
    }
}
