/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation and JWT token generation
/// - Request/response helpers

use axum::body::Body;
use axum::http::Request;
use pinboard_api::app::{build_router, AppState};
use pinboard_api::config::Config;
use pinboard_api::realtime::BoardChannels;
use pinboard_shared::auth::jwt::{create_token, Claims};
use pinboard_shared::auth::password;
use pinboard_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub channels: BoardChannels,
    pub user: User,
    pub jwt_token: String,
    extra_users: std::sync::Mutex<Vec<Uuid>>,
}

impl TestContext {
    /// Creates a new test context with a fresh user against DATABASE_URL
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let config = Config::from_env()?;

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../pinboard-shared/migrations").run(&db).await?;

        // Create test user
        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password("pw1")?,
            },
        )
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Build app, keeping a handle on the fan-out registry
        let state = AppState::new(db.clone(), config.clone());
        let channels = state.channels.clone();
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            channels,
            user,
            jwt_token,
            extra_users: std::sync::Mutex::new(Vec::new()),
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates another user with a token, for membership tests
    pub async fn second_user(&self) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("other-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password("pw2")?,
            },
        )
        .await?;

        self.extra_users
            .lock()
            .expect("extra_users lock")
            .push(user.id);

        let claims = Claims::new(user.id);
        let token = create_token(&claims, &self.config.jwt.secret)?;

        Ok((user, token))
    }

    /// Cleans up test data
    ///
    /// Deleting the boards cascades to lists, cards, comments, and
    /// memberships; the users go last.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let mut user_ids = vec![self.user.id];
        user_ids.extend(self.extra_users.lock().expect("extra_users lock").iter());

        for user_id in &user_ids {
            sqlx::query("DELETE FROM boards WHERE created_by = $1")
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        for user_id in &user_ids {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(user_id)
                .execute(&self.db)
                .await?;
        }

        Ok(())
    }
}

/// Builds a JSON request with an optional bearer token
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
