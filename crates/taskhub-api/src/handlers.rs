use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use taskhub_auth::{hash_password, verify_password, Claims, JwtValidator};
use taskhub_db::entities::{todo, user};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

// Argon2id hash of a throwaway password; verified against when the email
// is unknown so both login failure paths do comparable work.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(ApiError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // Case-sensitive lookup, no normalization; the unique index backs
    // this up against concurrent registrations.
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&req.password).map_err(|e| ApiError::Internal(e.into()))?;

    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(req.email.clone()),
        password_hash: Set(password_hash),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    info!("Registered user {}", req.email);

    Ok(Json(RegisterResponse {
        message: "User registered successfully".to_string(),
    }))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;

    let Some(db_user) = found else {
        let _ = verify_password(&req.password, DUMMY_HASH);
        return Err(ApiError::invalid_credentials());
    };

    if !verify_password(&req.password, &db_user.password_hash) {
        return Err(ApiError::invalid_credentials());
    }

    let claims = Claims::new(db_user.id, db_user.email.clone(), &state.auth);
    let token =
        JwtValidator::encode(&state.auth, &claims).map_err(|e| ApiError::Internal(e.into()))?;

    debug!("Issued session token for user {}", db_user.id);

    Ok(Json(LoginResponse {
        token,
        user_id: db_user.id,
        email: db_user.email,
        expires_at: claims.expires_at(),
    }))
}

/// Get the currently authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let db_user = user::Entity::find_by_id(auth.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(db_user.into()))
}

/// List the authenticated user's to-do items
#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "To-do items owned by the caller", body = TodoList),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn list_todos(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TodoList>, ApiError> {
    debug!("Listing todos for user {}", auth.user_id);

    let rows = todo::Entity::find()
        .filter(todo::Column::UserId.eq(auth.user_id))
        .order_by_desc(todo::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let total = rows.len();
    let todos = rows.into_iter().map(TodoItem::from).collect();

    Ok(Json(TodoList { todos, total }))
}

/// Create a to-do item
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 200, description = "Created item", body = TodoItem),
        (status = 400, description = "Missing title", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<Json<TodoItem>, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let now = Utc::now();
    // The owner is always the authenticated identity; nothing in the
    // request body can override it.
    let inserted = todo::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(auth.user_id),
        title: Set(req.title),
        description: Set(req.description),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    debug!("Created todo {} for user {}", inserted.id, auth.user_id);

    Ok(Json(inserted.into()))
}

/// Update a to-do item
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "To-do item id")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Updated item", body = TodoItem),
        (status = 400, description = "Missing title", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Item owned by another user", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<TodoItem>, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let existing = todo::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("To-do item '{}' not found", id)))?;

    if existing.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this to-do item".to_string(),
        ));
    }

    let mut active: todo::ActiveModel = existing.into();
    active.title = Set(req.title);
    active.description = Set(req.description);
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}

/// Delete a to-do item
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "To-do item id")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Item owned by another user", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = todo::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("To-do item '{}' not found", id)))?;

    if existing.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this to-do item".to_string(),
        ));
    }

    existing.delete(&state.db).await?;

    info!("Deleted todo {} for user {}", id, auth.user_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
