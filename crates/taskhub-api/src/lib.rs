pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sea_orm::DatabaseConnection;
use taskhub_auth::AuthConfig;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: AuthConfig,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskhub API",
        version = "0.1.0",
        description = "REST API for the taskhub to-do backend",
        contact(
            name = "Taskhub Team",
            email = "team@taskhub.dev"
        )
    ),
    paths(
        handlers::health_check,
        handlers::register,
        handlers::login,
        handlers::get_current_user,
        handlers::list_todos,
        handlers::create_todo,
        handlers::update_todo,
        handlers::delete_todo,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::RegisterRequest,
            models::RegisterResponse,
            models::LoginRequest,
            models::LoginResponse,
            models::User,
            models::TodoItem,
            models::TodoList,
            models::CreateTodoRequest,
            models::UpdateTodoRequest,
            models::HealthResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "todos", description = "Per-user to-do item endpoints"),
        (name = "system", description = "System health endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: ApiServerConfig, db: DatabaseConnection, auth: AuthConfig) -> Self {
        let state = Arc::new(AppState { db, auth });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        // JWT state for the authentication middleware, built from the
        // same immutable config that signs tokens at login
        let jwt_state = Arc::new(middleware::JwtState::new(&self.state.auth));

        // PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/auth/register", post(handlers::register))
            .route("/api/auth/login", post(handlers::login))
            .with_state(self.state.clone());

        // PROTECTED routes (require a valid bearer token)
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::get_current_user))
            .route(
                "/api/todos",
                get(handlers::list_todos).post(handlers::create_todo),
            )
            .route(
                "/api/todos/{id}",
                put(handlers::update_todo).delete(handlers::delete_todo),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state,
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(Any);

            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let bind_addr = self.config.bind_addr;
        let router = self.build_router();

        info!("Starting API server on {}", bind_addr);
        info!("OpenAPI spec: http://{}/api/openapi.json", bind_addr);
        info!("Swagger UI: http://{}/swagger-ui", bind_addr);

        let listener = tokio::net::TcpListener::bind(bind_addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
