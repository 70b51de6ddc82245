use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{options, results, topics, votes};

/// Voting API. Every route except `/health` needs a bearer token; mutating
/// routes additionally check the caller's role in the handler.
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/topics", get(topics::get_topics).post(topics::create_topic))
        .route(
            "/topics/{topic_id}",
            get(topics::get_topic)
                .put(topics::update_topic)
                .delete(topics::delete_topic),
        )
        .route(
            "/topics/{topic_id}/options",
            get(options::get_options).post(options::create_option),
        )
        .route(
            "/topics/{topic_id}/options/{option_id}",
            put(options::update_option).delete(options::delete_option),
        )
        .route(
            "/topics/{topic_id}/vote",
            post(votes::submit_vote).get(votes::get_my_vote),
        )
        .route(
            "/topics/{topic_id}/results",
            get(results::get_results).delete(results::clear_results),
        )
        .route("/topics/{topic_id}/results/recount", post(results::recount_results))
        .route(
            "/topics/{topic_id}/results/{option_id}",
            get(results::get_result_detail),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .merge(protected_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
