use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use osis_types::api::{CreateTopicRequest, MessageResponse, UpdateTopicRequest};

use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::Manager;
use crate::state::{AppState, run_db};

/// POST /topics
pub async fn create_topic(
    State(state): State<AppState>,
    Manager(claims): Manager,
    ApiJson(req): ApiJson<CreateTopicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_db(&state, move |db| {
        db.create_topic(&req.title, req.description.as_deref())
    })
    .await?;

    tracing::info!("Topic {} created by {}", row.id, claims.username);
    Ok((StatusCode::CREATED, Json(convert::topic(row))))
}

/// GET /topics
pub async fn get_topics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, |db| db.get_topics()).await?;
    Ok(Json(rows.into_iter().map(convert::topic).collect::<Vec<_>>()))
}

/// GET /topics/{id} — topic with its options embedded.
pub async fn get_topic(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_db(&state, move |db| db.get_topic_by_id(&topic_id.to_string())).await?;
    Ok(Json(convert::topic_with_options(row)))
}

/// PUT /topics/{id}
pub async fn update_topic(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    _manager: Manager,
    ApiJson(req): ApiJson<UpdateTopicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_db(&state, move |db| {
        db.update_topic(&topic_id.to_string(), &req.title, req.description.as_deref())
    })
    .await?;
    Ok(Json(convert::topic(row)))
}

/// DELETE /topics/{id} — cascades to options, votes and results in one
/// transaction; option images are removed after the commit.
pub async fn delete_topic(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    _manager: Manager,
) -> Result<impl IntoResponse, ApiError> {
    let images = run_db(&state, move |db| db.delete_topic(&topic_id.to_string())).await?;

    for image in &images {
        state.images.delete_best_effort(image).await;
    }

    Ok(Json(MessageResponse {
        message: "Voting topic deleted successfully".to_string(),
    }))
}
