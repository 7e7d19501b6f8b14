//! HTTP surface of the remote store.
//!
//! `GET /api/data` runs fetch-all-and-heal, `POST /api/data` applies one command.
//! Both resolve the user from the bearer token; a request without a valid token
//! never reaches the database.

pub mod auth;

use crate::{
    config::catalog::Catalog,
    errors::{Error, Result},
    model::Snapshot,
    remote,
    store::Incoming,
};
use auth::TokenVerifier;
use axum::{
    Json, Router,
    extract::{FromRequestParts, State, rejection::JsonRejection},
    http::{header::AUTHORIZATION, request::Parts},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, warn};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppContext {
    /// Persistent store
    pub db: DatabaseConnection,
    /// Session token check
    pub verifier: Arc<dyn TokenVerifier>,
    /// Defaults the seeder heals towards
    pub catalog: Arc<Catalog>,
}

impl AppContext {
    /// Bundles the handler dependencies.
    pub fn new(db: DatabaseConnection, verifier: Arc<dyn TokenVerifier>, catalog: Catalog) -> Self {
        Self {
            db,
            verifier,
            catalog: Arc::new(catalog),
        }
    }
}

/// The authenticated user id of a request.
#[derive(Debug, Clone)]
pub struct SessionUser(pub String);

#[axum::async_trait]
impl FromRequestParts<AppContext> for SessionUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Auth {
                reason: "Missing session token".to_string(),
            })?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Auth {
                reason: "Expected a bearer token".to_string(),
            })?;
        ctx.verifier.verify(token).map(Self)
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn fetch_all(
    State(ctx): State<AppContext>,
    SessionUser(user_id): SessionUser,
) -> Result<Json<Snapshot>> {
    let snapshot = remote::fetch_all_and_heal(&ctx.db, &user_id, &ctx.catalog).await?;
    Ok(Json(snapshot))
}

async fn apply(
    State(ctx): State<AppContext>,
    SessionUser(user_id): SessionUser,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = payload.map_err(|rejection| Error::InvalidPayload {
        message: rejection.body_text(),
    })?;
    match Incoming::decode(body)? {
        Incoming::Unrecognized(command_type) => {
            warn!(user_id, command_type, "Ignoring unrecognized command type");
        }
        Incoming::Known {
            command,
            command_id,
        } => {
            let outcome =
                remote::apply_command(&ctx.db, &user_id, command, command_id.as_deref()).await?;
            debug!(user_id, ?outcome, "Command handled");
        }
    }
    Ok(Json(json!({ "success": true })))
}

/// Builds the application router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/data", get(fetch_all).post(apply))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        config::catalog::builtin_catalog,
        entities::{Action, Goal},
        test_utils::{sample_action, setup_test_db},
    };
    use auth::SessionVerifier;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use sea_orm::{EntityTrait, PaginatorTrait};
    use std::time::Duration;
    use tower::ServiceExt;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    async fn test_app() -> Result<(Router, DatabaseConnection, String)> {
        let db = setup_test_db().await?;
        let verifier = SessionVerifier::new(SECRET);
        let token = verifier.issue("u1", Duration::from_secs(600))?;
        let ctx = AppContext::new(db.clone(), Arc::new(verifier), builtin_catalog()?);
        Ok((router(ctx), db, token))
    }

    fn post(token: &str, body: &Value) -> Request<Body> {
        Request::post("/api/data")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() -> Result<()> {
        let (app, db, _) = test_app().await?;

        let response = app
            .oneshot(Request::get("/api/data").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(crate::entities::User::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_heals_and_returns_snapshot() -> Result<()> {
        let (app, _, token) = test_app().await?;

        let response = app
            .oneshot(
                Request::get("/api/data")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["user"]["id"], "u1");
        assert!(!body["categories"].as_array().unwrap().is_empty());
        assert!(body["categories"][0]["emoji"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_post_applies_command() -> Result<()> {
        let (app, db, token) = test_app().await?;
        crate::test_utils::create_test_user(&db, "u1").await?;
        let command = crate::store::Command::AddAction(sample_action("a1"));

        let response = app
            .oneshot(post(&token, &command.to_wire("cmd-1")?))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "success": true }));
        assert_eq!(Action::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_command_type_succeeds_without_effect() -> Result<()> {
        let (app, db, token) = test_app().await?;

        let body = json!({ "commandType": "SHARE_GOAL", "payload": { "id": "g1" } });
        let response = app.oneshot(post(&token, &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(Goal::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_payload_is_bad_request() -> Result<()> {
        let (app, _, token) = test_app().await?;

        let body = json!({ "commandType": "ADD_GOAL", "payload": { "title": 5 } });
        let response = app.oneshot(post(&token, &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn test_unparseable_body_gets_error_envelope() -> Result<()> {
        let (app, _, token) = test_app().await?;

        let request = Request::post("/api/data")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = test_app().await.unwrap();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
