use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::middleware::{CurrentUser, Identity};
use super::AppState;
use crate::blueprint::blueprint_file_name;
use crate::db::StoreError;
use crate::models::*;
use crate::pipeline::save_result;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side; clients only see a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Map store failures onto statuses. Validation messages are safe to expose.
fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Validation(msg) => {
            tracing::warn!("Validation error: {}", msg);
            (StatusCode::BAD_REQUEST, msg)
        }
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Idea not found".to_string()),
        StoreError::Forbidden => (
            StatusCode::FORBIDDEN,
            "You do not have access to this idea".to_string(),
        ),
        StoreError::Unavailable(e) => internal_error(e),
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Generation
// ============================================================

/// Body of a generation request. Required fields are optional here so that
/// missing values surface as a readable 400 rather than a decode error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(alias = "idea")]
    pub idea_description: Option<String>,
    pub platform: Option<String>,
    #[serde(alias = "target")]
    pub target_audience: Option<String>,
    pub features: Option<String>,
    /// Save the result to the caller's ideas.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub content: String,
    pub source_kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea: Option<Idea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

pub async fn generate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let request = GenerationRequest::parse(
        body.idea_description,
        body.platform.as_deref(),
        body.target_audience,
        body.features,
    )
    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let result = state.blueprints.generate(&request).await;

    let (idea, save_error) = if body.save {
        match save_result(&state.db, identity.user(), &request, &result) {
            Ok(idea) => (Some(idea), None),
            Err(e) => {
                tracing::warn!("Blueprint generated but not saved: {}", e);
                (None, Some(e.to_string()))
            }
        }
    } else {
        (None, None)
    };

    Ok(Json(GenerateResponse {
        content: result.content,
        source_kind: result.source_kind,
        idea,
        save_error,
    }))
}

// ============================================================
// Ideas
// ============================================================

pub async fn create_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateIdeaInput>,
) -> Result<(StatusCode, Json<Idea>), (StatusCode, String)> {
    state
        .db
        .create_idea(user.id, input)
        .map(|idea| (StatusCode::CREATED, Json(idea)))
        .map_err(store_error)
}

pub async fn list_ideas(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListIdeasQuery>,
) -> Result<Json<IdeaPage>, (StatusCode, String)> {
    state
        .db
        .list_ideas_by_owner(user.id, &query)
        .map(Json)
        .map_err(store_error)
}

pub async fn get_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Idea>, (StatusCode, String)> {
    state
        .db
        .get_idea_for(id, user.id)
        .map(Json)
        .map_err(store_error)
}

/// Serve the blueprint as a markdown attachment.
pub async fn download_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, (StatusCode, String)> {
    let idea = state.db.get_idea_for(id, user.id).map_err(store_error)?;
    let file_name = blueprint_file_name(&idea.idea_description);

    Ok((
        [
            (CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        idea.blueprint,
    )
        .into_response())
}

pub async fn delete_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_idea(id, user.id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(store_error)
}
