// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{
        AttachSignedMessageRequest, AuthorizationRequestResponse, AuthorizationRequestsResponse,
        AuthorizationStatus, CreateAuthorizationRequest, ScreenConfig, WalletAddress,
    },
    state::AppState,
};

pub mod authorization;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/wallet-authorization",
            post(authorization::create_authorization_request),
        )
        .route(
            "/wallet-authorization/{id}",
            get(authorization::get_authorization_request).put(authorization::attach_signed_message),
        )
        .route(
            "/wallet-authorization/by-project/{project_id}",
            get(authorization::list_authorization_requests),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        authorization::create_authorization_request,
        authorization::get_authorization_request,
        authorization::list_authorization_requests,
        authorization::attach_signed_message,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CreateAuthorizationRequest,
            AttachSignedMessageRequest,
            AuthorizationRequestResponse,
            AuthorizationRequestsResponse,
            AuthorizationStatus,
            ScreenConfig,
            WalletAddress,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Wallet Authorization", description = "Wallet signature authorization requests"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::verifier::tests::{address_of, sign, signer, KEY_A};
    use crate::models::ProjectId;
    use crate::storage::Project;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use tower::ServiceExt;
    use uuid::Uuid;

    const API_KEY: &str = "router-test-key";

    fn seeded_state() -> (AppState, Project) {
        let state = AppState::default();
        let project = Project::new(ProjectId(Uuid::new_v4()), "https://example.com", Utc::now()).unwrap();
        state.projects.store_project(&project, API_KEY).unwrap();
        (state, project)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, api_key: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header("X-API-KEY", key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn full_flow_over_http() {
        let (state, project) = seeded_state();
        let app = router(state);
        let signer = signer(KEY_A);
        let wallet = address_of(&signer);

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/v1/wallet-authorization",
                Some(API_KEY),
                serde_json::json!({ "wallet_address": wallet.to_string() }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "PENDING");
        let id = created["id"].as_str().unwrap().to_string();
        let message = created["message_to_sign"].as_str().unwrap().to_string();

        let signature = sign(&signer, &message);
        let (status, attached) = send(
            &app,
            json_request(
                "PUT",
                &format!("/v1/wallet-authorization/{id}"),
                None,
                serde_json::json!({
                    "wallet_address": wallet.to_string(),
                    "signed_message": signature.as_str(),
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(attached["status"], "SUCCESS");

        let (status, again) = send(
            &app,
            json_request(
                "PUT",
                &format!("/v1/wallet-authorization/{id}"),
                None,
                serde_json::json!({
                    "wallet_address": wallet.to_string(),
                    "signed_message": "0xabc",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(again["error_code"], "SIGNED_MESSAGE_ALREADY_SET");

        let get = Request::builder()
            .uri(format!("/v1/wallet-authorization/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, fetched) = send(&app, get).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["status"], "SUCCESS");
        assert_eq!(fetched["wallet_address"], wallet.to_string());

        let list = Request::builder()
            .uri(format!("/v1/wallet-authorization/by-project/{}", project.id))
            .header("X-API-KEY", API_KEY)
            .body(Body::empty())
            .unwrap();
        let (status, listed) = send(&app, list).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["requests"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_requires_api_key() {
        let (state, _) = seeded_state();
        let app = router(state);

        let (status, body) = send(
            &app,
            json_request("POST", "/v1/wallet-authorization", None, serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "MISSING_API_KEY");

        let (status, body) = send(
            &app,
            json_request("POST", "/v1/wallet-authorization", Some("nope"), serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "INVALID_API_KEY");
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(AppState::default());
        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn openapi_lists_authorization_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/wallet-authorization"));
        assert!(doc.paths.paths.contains_key("/v1/wallet-authorization/{id}"));
        assert!(doc
            .paths
            .paths
            .contains_key("/v1/wallet-authorization/by-project/{project_id}"));
    }
}
