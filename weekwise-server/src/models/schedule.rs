use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const DEFAULT_TITLE: &str = "Untitled Event";

// ── Database rows ────────────────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct Schedule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

// ── API types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SchedulePayload {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Defaults to "Untitled Event" on create when missing or empty
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<Schedule> for ScheduleResponse {
    fn from(row: Schedule) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            start: row.start_at,
            end: row.end_at,
            title: row.title,
            description: row.description,
            updated_at: row.updated_at,
        }
    }
}

impl SchedulePayload {
    /// Title as stored on create: missing or blank falls back to the default.
    pub fn title_or_default(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_TITLE.to_string(),
        }
    }

    /// Title as required on update: missing or blank is a validation error.
    pub fn required_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: Option<&str>) -> SchedulePayload {
        SchedulePayload {
            start: Utc::now(),
            end: Utc::now(),
            title: title.map(str::to_string),
            description: None,
        }
    }

    #[test]
    fn create_title_falls_back_to_default() {
        assert_eq!(payload(None).title_or_default(), DEFAULT_TITLE);
        assert_eq!(payload(Some("")).title_or_default(), DEFAULT_TITLE);
        assert_eq!(payload(Some("  ")).title_or_default(), DEFAULT_TITLE);
        assert_eq!(payload(Some("Standup")).title_or_default(), "Standup");
    }

    #[test]
    fn update_title_is_required() {
        assert_eq!(payload(None).required_title(), None);
        assert_eq!(payload(Some("")).required_title(), None);
        assert_eq!(payload(Some("Standup")).required_title(), Some("Standup"));
    }
}
