use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::models::schedule::{Schedule, SchedulePayload, ScheduleResponse};
use crate::AppState;

#[derive(serde::Serialize, utoipa::ToSchema)]
pub(crate) struct ApiError {
    error: String,
}

fn err(status: StatusCode, msg: &str) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: msg.to_string(),
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route(
            "/{id}",
            get(get_schedule)
                .put(update_schedule)
                .delete(delete_schedule),
        )
}

#[utoipa::path(
    get,
    path = "/schedule",
    responses(
        (status = 200, description = "All schedules owned by the requester", body = Vec<ScheduleResponse>),
    ),
    security(("bearer" = [])),
    tag = "Schedule"
)]
pub(crate) async fn list_schedules(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ScheduleResponse>>, (StatusCode, Json<ApiError>)> {
    let rows = sqlx::query_as::<_, Schedule>(
        "SELECT id, user_id, start_at, end_at, title, description, updated_at
         FROM schedules WHERE user_id = $1 ORDER BY start_at",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    Ok(Json(rows.into_iter().map(ScheduleResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/schedule/{id}",
    params(("id" = Uuid, Path, description = "Schedule UUID")),
    responses(
        (status = 200, description = "Single schedule", body = ScheduleResponse),
        (status = 404, description = "Schedule not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Schedule"
)]
pub(crate) async fn get_schedule(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduleResponse>, (StatusCode, Json<ApiError>)> {
    // TODO: scope this lookup to the authenticated user like the other routes
    let row = sqlx::query_as::<_, Schedule>(
        "SELECT id, user_id, start_at, end_at, title, description, updated_at
         FROM schedules WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
    .ok_or_else(|| err(StatusCode::NOT_FOUND, "Schedule not found"))?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    post,
    path = "/schedule",
    request_body = SchedulePayload,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleResponse),
    ),
    security(("bearer" = [])),
    tag = "Schedule"
)]
pub(crate) async fn create_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SchedulePayload>,
) -> Result<(StatusCode, Json<ScheduleResponse>), (StatusCode, Json<ApiError>)> {
    let row = sqlx::query_as::<_, Schedule>(
        "INSERT INTO schedules (user_id, start_at, end_at, title, description)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, user_id, start_at, end_at, title, description, updated_at",
    )
    .bind(auth.user_id)
    .bind(req.start)
    .bind(req.end)
    .bind(req.title_or_default())
    .bind(req.description_or_empty())
    .fetch_one(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create schedule"))?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

#[utoipa::path(
    put,
    path = "/schedule/{id}",
    params(("id" = Uuid, Path, description = "Schedule UUID")),
    request_body = SchedulePayload,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleResponse),
        (status = 400, description = "Missing title", body = ApiError),
        (status = 404, description = "Schedule not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Schedule"
)]
pub(crate) async fn update_schedule(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SchedulePayload>,
) -> Result<Json<ScheduleResponse>, (StatusCode, Json<ApiError>)> {
    // Title check comes before the lookup: an empty title is 400 even for an
    // unknown id.
    let title = req
        .required_title()
        .ok_or_else(|| err(StatusCode::BAD_REQUEST, "Title is required"))?;

    let row = sqlx::query_as::<_, Schedule>(
        "UPDATE schedules
         SET start_at = $2, end_at = $3, title = $4, description = $5, updated_at = NOW()
         WHERE id = $1
         RETURNING id, user_id, start_at, end_at, title, description, updated_at",
    )
    .bind(id)
    .bind(req.start)
    .bind(req.end)
    .bind(title)
    .bind(req.description_or_empty())
    .fetch_optional(&state.db)
    .await
    .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update schedule"))?
    .ok_or_else(|| err(StatusCode::NOT_FOUND, "Schedule not found"))?;

    Ok(Json(row.into()))
}

#[utoipa::path(
    delete,
    path = "/schedule/{id}",
    params(("id" = Uuid, Path, description = "Schedule UUID")),
    responses(
        (status = 204, description = "Schedule deleted"),
        (status = 404, description = "Schedule not found", body = ApiError),
    ),
    security(("bearer" = [])),
    tag = "Schedule"
)]
pub(crate) async fn delete_schedule(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?;

    if result.rows_affected() == 0 {
        return Err(err(StatusCode::NOT_FOUND, "Schedule not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
