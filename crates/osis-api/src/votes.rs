use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use osis_types::api::{Claims, SubmitVoteRequest};

use crate::convert;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, run_db};

/// POST /topics/{id}/vote — the voter is always the token subject.
///
/// The ledger insert and the result recompute are separate commits; if the
/// recompute fails the vote stands and the error is still reported so the
/// caller knows the cached results may be stale.
pub async fn submit_vote(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<SubmitVoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.user_id.is_some_and(|id| id != claims.sub) {
        return Err(ApiError::Forbidden(
            "cannot vote on behalf of another user".to_string(),
        ));
    }

    let user_id = claims.sub.to_string();
    let row = run_db(&state, move |db| {
        let topic_id = topic_id.to_string();
        let vote = db.submit_vote(&user_id, &topic_id, &req.option_id.to_string())?;
        db.recompute_results(&topic_id)?;
        Ok(vote)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(convert::vote(row))))
}

/// GET /topics/{id}/vote — the caller's own vote on a topic.
pub async fn get_my_vote(
    State(state): State<AppState>,
    ApiPath(topic_id): ApiPath<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = run_db(&state, move |db| {
        db.get_user_vote(&claims.sub.to_string(), &topic_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("no vote on topic {topic_id}")))?;

    Ok(Json(convert::vote(row)))
}
