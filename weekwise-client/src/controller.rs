use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::CalendarApi;
use crate::types::{EventDraft, EventRecord, UserSession};
use crate::view::ViewMode;

/// Holds the in-memory event list and the editor draft, and mediates every
/// mutation against the API. Local state is only touched from successful
/// responses; a failed drag/resize update is logged and the stale entry is
/// left in place (no rollback).
pub struct CalendarController<A: CalendarApi> {
    api: A,
    session: Option<UserSession>,
    events: Vec<EventRecord>,
    draft: Option<EventDraft>,
    view: ViewMode,
}

impl<A: CalendarApi> CalendarController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: None,
            events: Vec::new(),
            draft: None,
            view: ViewMode::Week,
        }
    }

    // ── Identity ────────────────────────────────────────────────────────

    pub async fn signup(&mut self, email: &str, password: &str) -> Result<(), String> {
        let auth = self.api.signup(email, password).await?;
        self.session = Some(UserSession {
            token: auth.token,
            user_id: Some(auth.user_id),
            email: Some(auth.email),
        });
        self.refresh().await;
        Ok(())
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), String> {
        let auth = self.api.login(email, password).await?;
        self.session = Some(UserSession {
            token: auth.token,
            user_id: Some(auth.user_id),
            email: Some(auth.email),
        });
        self.refresh().await;
        Ok(())
    }

    /// Reuse a previously issued token (e.g. from the environment).
    pub fn restore_session(&mut self, token: &str) {
        self.session = Some(UserSession {
            token: token.to_string(),
            user_id: None,
            email: None,
        });
    }

    pub fn logout(&mut self) {
        self.session = None;
        self.events.clear();
        self.draft = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    // ── Event list ──────────────────────────────────────────────────────

    /// Fetch the full list and replace local state wholesale. On failure the
    /// current list is kept and the error is logged.
    pub async fn refresh(&mut self) {
        let Some(token) = self.token() else { return };
        match self.api.list_schedules(&token).await {
            Ok(list) => self.events = list,
            Err(e) => log::error!("Failed to fetch events: {}", e),
        }
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    // ── Editor draft ────────────────────────────────────────────────────

    /// Range selection on the grid opens an empty draft for that span.
    pub fn select_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.draft = Some(EventDraft {
            id: None,
            start,
            end,
            title: String::new(),
            description: String::new(),
        });
    }

    /// Clicking an existing event opens a draft pre-filled from it.
    /// Returns false when the id is not in local state.
    pub fn select_event(&mut self, id: Uuid) -> bool {
        match self.events.iter().find(|e| e.id == id) {
            Some(event) => {
                self.draft = Some(EventDraft::from(event));
                true
            }
            None => {
                log::warn!("Clicked event {} not found", id);
                false
            }
        }
    }

    pub fn set_draft_title(&mut self, title: &str) {
        if let Some(draft) = self.draft.as_mut() {
            draft.title = title.to_string();
        }
    }

    pub fn set_draft_description(&mut self, description: &str) {
        if let Some(draft) = self.draft.as_mut() {
            draft.description = description.to_string();
        }
    }

    pub fn draft(&self) -> Option<&EventDraft> {
        self.draft.as_ref()
    }

    pub fn is_editor_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn close_editor(&mut self) {
        self.draft = None;
    }

    /// Save the open draft: update when it has an id, create otherwise.
    /// The editor closes either way; a failed request is only logged.
    pub async fn save_draft(&mut self) {
        let Some(token) = self.token() else { return };
        let Some(draft) = self.draft.take() else { return };

        let result = match draft.id {
            Some(id) => self.api.update_schedule(&token, id, &draft.payload()).await,
            None => self.api.create_schedule(&token, &draft.payload()).await,
        };

        match result {
            Ok(saved) => self.apply_saved(saved),
            Err(e) => log::error!("Error saving event: {}", e),
        }
    }

    /// Delete the event the open draft refers to. A draft without an id was
    /// never persisted, so the editor just closes.
    pub async fn delete_selected(&mut self) {
        let Some(token) = self.token() else { return };
        let Some(draft) = self.draft.take() else { return };
        let Some(id) = draft.id else { return };

        match self.api.delete_schedule(&token, id).await {
            Ok(()) => self.apply_removed(id),
            Err(e) => log::error!("Error deleting event: {}", e),
        }
    }

    // ── Drag & resize ───────────────────────────────────────────────────

    /// Drag-move: push the new span immediately, keeping title/description.
    pub async fn move_event(&mut self, id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.push_span(id, start, end).await;
    }

    /// Resize: same wire call as a move, only the span differs.
    pub async fn resize_event(&mut self, id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.push_span(id, start, end).await;
    }

    async fn push_span(&mut self, id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) {
        let Some(request) = self.begin_span(id, start, end) else {
            return;
        };
        let result = request.await;
        self.commit_span(result);
    }

    /// Start the update for a drag or resize without folding the response in
    /// yet. Nothing serializes these requests: several can be in flight for
    /// the same event at once, and [`commit_span`](Self::commit_span) applies
    /// their responses in whatever order they land.
    pub fn begin_span(
        &self,
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<impl std::future::Future<Output = Result<EventRecord, String>> + '_> {
        let token = self.token()?;
        let Some(event) = self.events.iter().find(|e| e.id == id) else {
            log::warn!("Dragged event {} not found", id);
            return None;
        };

        let mut payload = EventDraft::from(event).payload();
        payload.start = start;
        payload.end = end;

        Some(async move { self.api.update_schedule(&token, id, &payload).await })
    }

    /// Fold a landed drag/resize response into local state.
    pub fn commit_span(&mut self, result: Result<EventRecord, String>) {
        match result {
            Ok(saved) => self.apply_saved(saved),
            // Stale local entry is kept on purpose; the next refresh
            // reconverges with the server.
            Err(e) => log::error!("Error updating event: {}", e),
        }
    }

    // ── View mode ───────────────────────────────────────────────────────

    /// View switching is local only; no network call.
    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    // ── Reconciliation ──────────────────────────────────────────────────

    /// Fold a successful save response into local state: replace the entry
    /// with the matching id, or append when there is none. Responses are
    /// applied in landing order, so overlapping in-flight updates resolve
    /// last-write-wins.
    fn apply_saved(&mut self, saved: EventRecord) {
        match self.events.iter_mut().find(|e| e.id == saved.id) {
            Some(entry) => *entry = saved,
            None => self.events.push(saved),
        }
    }

    fn apply_removed(&mut self, id: Uuid) {
        self.events.retain(|e| e.id != id);
    }

    fn token(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthResponse, SchedulePayload};
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    enum Reply {
        Auth(Result<AuthResponse, String>),
        List(Result<Vec<EventRecord>, String>),
        Saved(Result<EventRecord, String>),
        Deleted(Result<(), String>),
    }

    /// Scripted stand-in for the HTTP client: each call consumes the next
    /// queued reply, and an unqueued call panics the test.
    #[derive(Clone, Default)]
    struct ScriptedApi {
        replies: Arc<Mutex<VecDeque<Reply>>>,
    }

    impl ScriptedApi {
        fn push(&self, reply: Reply) {
            self.replies.lock().unwrap().push_back(reply);
        }

        fn pop(&self) -> Reply {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected API call")
        }

        fn is_drained(&self) -> bool {
            self.replies.lock().unwrap().is_empty()
        }
    }

    impl CalendarApi for ScriptedApi {
        async fn signup(&self, _email: &str, _password: &str) -> Result<AuthResponse, String> {
            match self.pop() {
                Reply::Auth(r) => r,
                _ => panic!("expected auth reply"),
            }
        }

        async fn login(&self, _email: &str, _password: &str) -> Result<AuthResponse, String> {
            match self.pop() {
                Reply::Auth(r) => r,
                _ => panic!("expected auth reply"),
            }
        }

        async fn list_schedules(&self, _token: &str) -> Result<Vec<EventRecord>, String> {
            match self.pop() {
                Reply::List(r) => r,
                _ => panic!("expected list reply"),
            }
        }

        async fn create_schedule(
            &self,
            _token: &str,
            _payload: &SchedulePayload,
        ) -> Result<EventRecord, String> {
            match self.pop() {
                Reply::Saved(r) => r,
                _ => panic!("expected saved reply"),
            }
        }

        async fn update_schedule(
            &self,
            _token: &str,
            _id: Uuid,
            _payload: &SchedulePayload,
        ) -> Result<EventRecord, String> {
            match self.pop() {
                Reply::Saved(r) => r,
                _ => panic!("expected saved reply"),
            }
        }

        async fn delete_schedule(&self, _token: &str, _id: Uuid) -> Result<(), String> {
            match self.pop() {
                Reply::Deleted(r) => r,
                _ => panic!("expected delete reply"),
            }
        }
    }

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    fn record(id: Uuid, title: &str, start_hour: u32) -> EventRecord {
        EventRecord {
            id,
            user_id: Uuid::nil(),
            start: ts(start_hour),
            end: ts(start_hour + 1),
            title: title.to_string(),
            description: String::new(),
            updated_at: ts(start_hour),
        }
    }

    fn auth_ok() -> Reply {
        Reply::Auth(Ok(AuthResponse {
            token: "jwt".to_string(),
            user_id: Uuid::nil(),
            email: "ada@example.com".to_string(),
        }))
    }

    fn logged_in(api: &ScriptedApi) -> CalendarController<ScriptedApi> {
        let mut controller = CalendarController::new(api.clone());
        controller.restore_session("jwt");
        controller
    }

    #[tokio::test]
    async fn login_fetches_event_list() {
        let api = ScriptedApi::default();
        let existing = record(Uuid::new_v4(), "Standup", 10);
        api.push(auth_ok());
        api.push(Reply::List(Ok(vec![existing.clone()])));

        let mut controller = CalendarController::new(api.clone());
        controller.login("ada@example.com", "hunter2hunter2").await.unwrap();

        assert!(controller.is_logged_in());
        assert_eq!(controller.events(), &[existing]);
        assert!(api.is_drained());
    }

    #[tokio::test]
    async fn failed_login_leaves_no_session() {
        let api = ScriptedApi::default();
        api.push(Reply::Auth(Err("Incorrect email or password".to_string())));

        let mut controller = CalendarController::new(api.clone());
        let err = controller.login("ada@example.com", "wrong-password").await;

        assert_eq!(err, Err("Incorrect email or password".to_string()));
        assert!(!controller.is_logged_in());
    }

    #[tokio::test]
    async fn saving_a_range_selection_creates_and_appends() {
        let api = ScriptedApi::default();
        let mut controller = logged_in(&api);

        controller.select_range(ts(10), ts(11));
        controller.set_draft_title("Standup");
        assert!(controller.is_editor_open());

        let created = record(Uuid::new_v4(), "Standup", 10);
        api.push(Reply::Saved(Ok(created.clone())));
        controller.save_draft().await;

        assert_eq!(controller.events(), &[created]);
        assert!(!controller.is_editor_open());
    }

    #[tokio::test]
    async fn saving_a_clicked_event_replaces_by_id() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![
            record(id, "Standup", 10),
            record(Uuid::new_v4(), "Lunch", 12),
        ])));
        controller.refresh().await;

        assert!(controller.select_event(id));
        controller.set_draft_title("Retro");

        let updated = record(id, "Retro", 10);
        api.push(Reply::Saved(Ok(updated.clone())));
        controller.save_draft().await;

        assert_eq!(controller.events().len(), 2);
        assert_eq!(controller.events()[0], updated);
    }

    #[tokio::test]
    async fn rejected_save_keeps_state_and_closes_editor() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let original = record(id, "Standup", 10);
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![original.clone()])));
        controller.refresh().await;

        controller.select_event(id);
        controller.set_draft_title("");
        api.push(Reply::Saved(Err("Title is required".to_string())));
        controller.save_draft().await;

        assert_eq!(controller.events(), &[original]);
        assert!(!controller.is_editor_open());
    }

    #[tokio::test]
    async fn clicked_draft_falls_back_to_default_title() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![record(id, "", 10)])));
        controller.refresh().await;

        controller.select_event(id);
        assert_eq!(controller.draft().unwrap().title, "Untitled Event");
    }

    #[tokio::test]
    async fn delete_removes_matching_entry() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let other = record(Uuid::new_v4(), "Lunch", 12);
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![record(id, "Standup", 10), other.clone()])));
        controller.refresh().await;

        controller.select_event(id);
        api.push(Reply::Deleted(Ok(())));
        controller.delete_selected().await;

        assert_eq!(controller.events(), &[other]);
        assert!(!controller.is_editor_open());
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![record(id, "Standup", 10)])));
        controller.refresh().await;

        controller.select_event(id);
        api.push(Reply::Deleted(Err("Schedule not found".to_string())));
        controller.delete_selected().await;

        assert_eq!(controller.events().len(), 1);
    }

    #[tokio::test]
    async fn drag_replaces_entry_on_success() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![record(id, "Standup", 10)])));
        controller.refresh().await;

        let mut moved = record(id, "Standup", 14);
        moved.updated_at = ts(15);
        api.push(Reply::Saved(Ok(moved.clone())));
        controller.move_event(id, ts(14), ts(15)).await;

        assert_eq!(controller.events(), &[moved]);
    }

    #[tokio::test]
    async fn failed_drag_leaves_local_state_stale() {
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let original = record(id, "Standup", 10);
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![original.clone()])));
        controller.refresh().await;

        api.push(Reply::Saved(Err("Network error: connection reset".to_string())));
        controller.resize_event(id, ts(10), ts(12)).await;

        // No rollback: the stale entry stays until the next refresh.
        assert_eq!(controller.events(), &[original]);
    }

    #[tokio::test]
    async fn refresh_replaces_state_wholesale() {
        let api = ScriptedApi::default();
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![record(Uuid::new_v4(), "Old", 8)])));
        controller.refresh().await;

        let fresh = record(Uuid::new_v4(), "New", 9);
        api.push(Reply::List(Ok(vec![fresh.clone()])));
        controller.refresh().await;

        assert_eq!(controller.events(), &[fresh]);
    }

    #[tokio::test]
    async fn overlapping_updates_resolve_to_last_landed_response() {
        // Two drags of the same event can be in flight at once; responses
        // are folded in landing order, so the one that lands last wins even
        // if it was issued first.
        let api = ScriptedApi::default();
        let id = Uuid::new_v4();
        let mut controller = logged_in(&api);
        api.push(Reply::List(Ok(vec![record(id, "Standup", 10)])));
        controller.refresh().await;

        let first_drag = record(id, "Standup", 14);
        let second_drag = record(id, "Standup", 16);
        // The double hands replies out in landing order: the second-issued
        // drag's response is queued first, so it lands first.
        api.push(Reply::Saved(Ok(second_drag.clone())));
        api.push(Reply::Saved(Ok(first_drag.clone())));

        let issued_first = controller.begin_span(id, ts(14), ts(15)).unwrap();
        let issued_second = controller.begin_span(id, ts(16), ts(17)).unwrap();

        let landed_first = issued_second.await;
        let landed_last = issued_first.await;

        controller.commit_span(landed_first);
        controller.commit_span(landed_last);

        assert_eq!(controller.events(), &[first_drag]);
        assert!(api.is_drained());
    }

    #[tokio::test]
    async fn view_switching_makes_no_network_call() {
        let api = ScriptedApi::default();
        let mut controller = logged_in(&api);

        controller.set_view(ViewMode::Month);
        controller.set_view(ViewMode::Day);

        assert_eq!(controller.view(), ViewMode::Day);
        assert!(api.is_drained());
    }

    #[tokio::test]
    async fn logged_out_controller_never_calls_the_api() {
        let api = ScriptedApi::default();
        let mut controller = CalendarController::new(api.clone());

        controller.select_range(ts(10), ts(11));
        controller.save_draft().await;
        controller.refresh().await;

        assert!(controller.events().is_empty());
        assert!(api.is_drained());
    }
}
