//! API request and response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// User email address (must be unique)
    pub email: String,
    /// User password (minimum 8 characters); hashed before storage
    pub password: String,
}

/// User registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    /// Success acknowledgement
    pub message: String,
}

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User email address
    pub email: String,
    /// User password
    pub password: String,
}

/// User login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,
    /// Authenticated user id
    pub user_id: Uuid,
    /// Authenticated user email
    pub email: String,
    /// Token expiration timestamp
    pub expires_at: DateTime<Utc>,
}

/// Public user information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// User id
    pub id: Uuid,
    /// User email
    pub email: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<taskhub_db::entities::user::Model> for User {
    fn from(model: taskhub_db::entities::user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            created_at: model.created_at,
        }
    }
}

/// A to-do item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoItem {
    /// Item id
    pub id: Uuid,
    /// Owning user id
    pub user_id: Uuid,
    /// Item title
    pub title: String,
    /// Item description
    pub description: Option<String>,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<taskhub_db::entities::todo::Model> for TodoItem {
    fn from(model: taskhub_db::entities::todo::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Create to-do request
///
/// There is no owner field: the owner is always the authenticated user,
/// and unknown fields in the body are discarded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    /// Item title
    pub title: String,
    /// Item description (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Update to-do request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    /// New item title
    pub title: String,
    /// New item description (cleared when omitted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// To-do list response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoList {
    /// Items owned by the authenticated user
    pub todos: Vec<TodoItem>,
    /// Total number of items
    pub total: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Server version
    pub version: String,
}
