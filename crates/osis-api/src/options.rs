use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use osis_types::api::{CreateOptionRequest, MessageResponse, UpdateOptionRequest};

use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::Manager;
use crate::state::{AppState, run_db};

/// POST /topics/{id}/options
pub async fn create_option(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    _manager: Manager,
    ApiJson(req): ApiJson<CreateOptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_db(&state, move |db| {
        db.create_option(&topic_id.to_string(), &req.label, req.image.as_deref())
    })
    .await?;
    Ok((StatusCode::CREATED, Json(convert::option(row))))
}

/// GET /topics/{id}/options
pub async fn get_options(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, move |db| db.get_options_by_topic(&topic_id.to_string())).await?;
    Ok(Json(rows.into_iter().map(convert::option).collect::<Vec<_>>()))
}

/// PUT /topics/{id}/options/{option_id} — partial update. A replaced image
/// is removed from storage once the new reference is committed.
pub async fn update_option(
    State(state): State<AppState>,
    ApiPath((topic_id, option_id)): ApiPath<(Uuid, Uuid)>,
    _manager: Manager,
    ApiJson(req): ApiJson<UpdateOptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = run_db(&state, move |db| {
        db.update_option(
            &topic_id.to_string(),
            &option_id.to_string(),
            req.label.as_deref(),
            req.image.as_deref(),
        )
    })
    .await?;

    if let Some(old) = &update.replaced_image {
        state.images.delete_best_effort(old).await;
    }

    Ok(Json(convert::option(update.option)))
}

/// DELETE /topics/{id}/options/{option_id}
pub async fn delete_option(
    State(state): State<AppState>,
    ApiPath((topic_id, option_id)): ApiPath<(Uuid, Uuid)>,
    _manager: Manager,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = run_db(&state, move |db| {
        db.delete_option(&topic_id.to_string(), &option_id.to_string())
    })
    .await?;

    if let Some(image) = &deleted.image {
        state.images.delete_best_effort(image).await;
    }

    Ok(Json(MessageResponse {
        message: "Voting option deleted successfully".to_string(),
    }))
}
