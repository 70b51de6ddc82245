use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use osis_types::api::ClearedResultsResponse;

use crate::convert;
use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::middleware::Manager;
use crate::state::{AppState, run_db};

/// GET /topics/{id}/results — cached tally with option label and image.
pub async fn get_results(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, move |db| db.get_results_by_topic(&topic_id.to_string())).await?;
    Ok(Json(rows.into_iter().map(convert::result).collect::<Vec<_>>()))
}

/// GET /topics/{id}/results/{option_id} — live count and voter list.
pub async fn get_result_detail(
    State(state): State<AppState>,
    ApiPath((topic_id, option_id)): ApiPath<(Uuid, Uuid)>,
    _manager: Manager,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_db(&state, move |db| {
        db.get_result_detail_for_option(&topic_id.to_string(), &option_id.to_string())
    })
    .await?;
    Ok(Json(convert::detail(row)))
}

/// DELETE /topics/{id}/results
pub async fn clear_results(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    Manager(claims): Manager,
) -> Result<impl IntoResponse, ApiError> {
    let removed = run_db(&state, move |db| db.delete_results_for_topic(&topic_id.to_string())).await?;
    info!("Results for topic {} cleared by {}", topic_id, claims.username);
    Ok(Json(ClearedResultsResponse { topic_id, removed }))
}

/// POST /topics/{id}/results/recount — clear and rebuild in one transaction.
pub async fn recount_results(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    _manager: Manager,
) -> Result<impl IntoResponse, ApiError> {
    let rows = run_db(&state, move |db| {
        let topic_id = topic_id.to_string();
        db.recount_results(&topic_id)?;
        db.get_results_by_topic(&topic_id)
    })
    .await?;
    Ok(Json(rows.into_iter().map(convert::result).collect::<Vec<_>>()))
}
