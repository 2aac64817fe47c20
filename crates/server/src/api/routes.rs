use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{
    downloads, handlers, media, middleware as mw, progress, sports, torrents, vision, watchlist,
};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Watchlist, progress and vision mutate or expose per-user data
    let authed_routes = Router::new()
        .route("/watchlist", get(watchlist::list))
        .route("/watchlist/{kind}/{id}", get(watchlist::get_status))
        .route("/watchlist/{kind}/{id}", post(watchlist::upsert))
        .route("/watchlist/{kind}/{id}", delete(watchlist::delete))
        .route("/progress", get(progress::list))
        .route("/progress", put(progress::upload))
        .route("/progress/{kind}/{id}", post(progress::save))
        .route("/progress/{kind}/{id}", delete(progress::delete))
        .route("/vision/analyze", post(vision::analyze))
        .route("/vision/ask", post(vision::ask))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw::auth_middleware,
        ));

    let api_routes = Router::new()
        // Health, config, metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Media metadata
        .route("/media/trending", get(media::trending))
        .route("/media/popular", get(media::popular))
        .route("/media/top-rated", get(media::top_rated))
        .route("/media/discover", get(media::discover))
        .route("/media/search", get(media::search))
        .route("/media/genres", get(media::genres))
        .route("/media/movie/{id}", get(media::movie))
        .route("/media/movie/{id}/credits", get(media::movie_credits))
        .route("/media/movie/{id}/videos", get(media::movie_videos))
        .route("/media/tv/{id}", get(media::tv))
        .route("/media/tv/{id}/season/{n}", get(media::tv_season))
        .route("/media/person/{id}", get(media::person))
        // Sports streams
        .route("/sports", get(sports::list_sports))
        .route("/sports/matches", get(sports::list_matches))
        .route("/sports/streams/{source}/{id}", get(sports::match_streams))
        // Download links
        .route("/downloads/movie/{id}", get(downloads::movie_links))
        .route(
            "/downloads/tv/{id}/{season}/{episode}",
            get(downloads::episode_links),
        )
        // Torrent index
        .route("/torrents/movie/{imdb_id}", get(torrents::search_movie))
        .merge(authed_routes)
        .layer(middleware::from_fn(mw::metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
