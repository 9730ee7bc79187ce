//! Route table. Everything under `/api/v1` plus the operational endpoints
//! at the root.

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::metrics;
use crate::state::AppState;

pub mod bots;
pub mod comments;
pub mod engagement;
pub mod misc;
pub mod posts;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/posts", post(posts::create).get(posts::list))
        .route(
            "/posts/{id}",
            get(posts::detail).patch(posts::update).delete(posts::archive),
        )
        .route("/posts/{id}/submit", post(posts::submit))
        .route("/posts/{id}/publish", post(posts::publish))
        .route("/posts/{id}/approve", post(posts::approve))
        .route("/posts/{id}/reject", post(posts::reject))
        .route("/posts/{id}/view", post(posts::record_view).get(posts::view_count))
        .route("/posts/{id}/pin", post(posts::pin).delete(posts::unpin))
        .route(
            "/posts/{id}/comments",
            get(comments::list).post(comments::create),
        )
        .route(
            "/posts/{id}/reactions",
            get(engagement::reactions)
                .post(engagement::react)
                .delete(engagement::unreact),
        )
        .route(
            "/posts/{id}/bookmark",
            get(engagement::is_bookmarked)
                .put(engagement::bookmark)
                .delete(engagement::unbookmark),
        )
        .route("/bookmarks", get(engagement::bookmarks))
        .route("/bots", post(bots::create).get(bots::list))
        .route(
            "/bots/{id}",
            get(bots::detail).patch(bots::update).delete(bots::revoke),
        )
        .route("/bots/{id}/regenerate-key", post(bots::regenerate_key))
        .route("/me", get(misc::me))
        .route("/reviews", get(misc::reviews));

    Router::new()
        .route("/healthz", get(misc::healthz))
        .route("/metrics", get(metrics::serve))
        .nest("/api/v1", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            metrics::track,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
