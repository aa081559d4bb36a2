use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use uuid::Uuid;

use crate::middleware::auth::create_token;
use crate::models::user::{
    is_valid_email, normalize_email, AuthResponse, LoginRequest, SignupRequest, MIN_PASSWORD_LEN,
};
use crate::AppState;

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Unknown email and wrong password must be indistinguishable to the caller.
const BAD_CREDENTIALS: &str = "Incorrect email or password";

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
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
    ),
    tag = "Auth"
)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ApiError>)> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(err(StatusCode::BAD_REQUEST, "Invalid email"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(err(
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password"))?
        .to_string();

    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(&email)
    .bind(&hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique") || e.to_string().contains("duplicate") {
            err(StatusCode::CONFLICT, "Email already exists")
        } else {
            err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user")
        }
    })?;

    let token = create_token(user_id, &state.jwt_secret)
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create token"))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user_id,
            email,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
    ),
    tag = "Auth"
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ApiError>)> {
    let email = normalize_email(&req.email);

    let row =
        sqlx::query_as::<_, (Uuid, String)>("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.db)
            .await
            .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Database error"))?
            .ok_or_else(|| err(StatusCode::UNAUTHORIZED, BAD_CREDENTIALS))?;

    let (user_id, password_hash) = row;

    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Invalid stored hash"))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| err(StatusCode::UNAUTHORIZED, BAD_CREDENTIALS))?;

    let token = create_token(user_id, &state.jwt_secret)
        .map_err(|_| err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create token"))?;

    Ok(Json(AuthResponse {
        token,
        user_id,
        email,
    }))
}
