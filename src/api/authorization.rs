// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::ApiKey,
    authorization::CreateAuthorizationParams,
    error::{ApiError, ErrorBody},
    models::{
        AttachSignedMessageRequest, AuthorizationRequestId, AuthorizationRequestResponse,
        AuthorizationRequestsResponse, CreateAuthorizationRequest, ProjectId, SignedMessage,
        WalletAddress, MAX_ARBITRARY_DATA_CHARS, MAX_SIGNED_MESSAGE_LENGTH, MAX_STRING_LENGTH,
    },
    state::AppState,
};

// =============================================================================
// Validation
// =============================================================================

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn parse_wallet_address(field: &str, value: &str) -> Result<WalletAddress, ApiError> {
    value
        .parse()
        .map_err(|e| ApiError::validation(format!("{field}: {e}")))
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::validation(format!("{field} must be a valid UUID")))
}

/// Validate a create body and turn it into builder parameters.
fn create_params(request: CreateAuthorizationRequest) -> Result<CreateAuthorizationParams, ApiError> {
    let requested_wallet_address = request
        .wallet_address
        .as_deref()
        .map(|value| parse_wallet_address("wallet_address", value))
        .transpose()?;

    if let Some(url) = &request.redirect_url {
        check_length("redirect_url", url, MAX_STRING_LENGTH)?;
    }
    if let Some(message) = &request.message_to_sign {
        check_length("message_to_sign", message, MAX_STRING_LENGTH)?;
    }

    let screen_config = request.screen_config.unwrap_or_default();
    if let Some(text) = &screen_config.before_action_message {
        check_length("screen_config.before_action_message", text, MAX_STRING_LENGTH)?;
    }
    if let Some(text) = &screen_config.after_action_message {
        check_length("screen_config.after_action_message", text, MAX_STRING_LENGTH)?;
    }

    if let Some(data) = &request.arbitrary_data {
        let serialized = serde_json::to_string(data)
            .map_err(|e| ApiError::validation(format!("arbitrary_data: {e}")))?;
        check_length("arbitrary_data", &serialized, MAX_ARBITRARY_DATA_CHARS)?;
    }

    Ok(CreateAuthorizationParams {
        redirect_url: request.redirect_url,
        message_to_sign: request.message_to_sign,
        store_indefinitely: request.store_indefinitely.unwrap_or(true),
        requested_wallet_address,
        arbitrary_data: request.arbitrary_data,
        screen_config,
    })
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    post,
    path = "/v1/wallet-authorization",
    request_body = CreateAuthorizationRequest,
    params(
        ("X-API-KEY" = String, Header, description = "Project API key")
    ),
    tag = "Wallet Authorization",
    responses(
        (status = 201, body = AuthorizationRequestResponse),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn create_authorization_request(
    ApiKey(project): ApiKey,
    State(state): State<AppState>,
    Json(request): Json<CreateAuthorizationRequest>,
) -> Result<(StatusCode, Json<AuthorizationRequestResponse>), ApiError> {
    let params = create_params(request)?;
    let created = state.service.create(project.id, params)?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    get,
    path = "/v1/wallet-authorization/{id}",
    params(
        ("id" = String, Path, description = "Authorization request id")
    ),
    tag = "Wallet Authorization",
    responses(
        (status = 200, body = AuthorizationRequestResponse),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_authorization_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AuthorizationRequestResponse>, ApiError> {
    let id = AuthorizationRequestId(parse_uuid("id", &id)?);
    let request = state.service.get(id)?;
    Ok(Json(request.into()))
}

#[utoipa::path(
    get,
    path = "/v1/wallet-authorization/by-project/{project_id}",
    params(
        ("project_id" = String, Path, description = "Project id"),
        ("X-API-KEY" = String, Header, description = "API key of the same project")
    ),
    tag = "Wallet Authorization",
    responses(
        (status = 200, body = AuthorizationRequestsResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn list_authorization_requests(
    api_key: ApiKey,
    Path(project_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AuthorizationRequestsResponse>, ApiError> {
    let project_id = ProjectId(parse_uuid("project_id", &project_id)?);
    api_key.require_project(project_id)?;

    let requests = state
        .service
        .list_by_project(project_id)?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(AuthorizationRequestsResponse { requests }))
}

#[utoipa::path(
    put,
    path = "/v1/wallet-authorization/{id}",
    request_body = AttachSignedMessageRequest,
    params(
        ("id" = String, Path, description = "Authorization request id")
    ),
    tag = "Wallet Authorization",
    responses(
        (status = 200, body = AuthorizationRequestResponse),
        (status = 400, description = "Invalid body or signed message already set", body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn attach_signed_message(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<AttachSignedMessageRequest>,
) -> Result<Json<AuthorizationRequestResponse>, ApiError> {
    let id = AuthorizationRequestId(parse_uuid("id", &id)?);
    let wallet_address = parse_wallet_address("wallet_address", &request.wallet_address)?;
    check_length("signed_message", &request.signed_message, MAX_SIGNED_MESSAGE_LENGTH)?;

    let attached = state
        .service
        .attach(id, wallet_address, SignedMessage(request.signed_message))?;
    Ok(Json(attached.into()))
}
