use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{admin, handlers, request_context, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        // Detail and comment routes address by slug, vote routes by
        // id; the router needs one parameter name per position.
        .route("/api/videos", get(handlers::list_videos))
        .route("/api/videos/:key", get(handlers::get_video))
        .route("/api/videos/:key/comments", post(handlers::create_video_comment))
        .route("/api/videos/:key/vote", post(handlers::vote_video))
        .route("/api/blogs", get(handlers::list_blogs))
        .route("/api/blogs/:key", get(handlers::get_blog))
        .route("/api/blogs/:key/comments", post(handlers::create_blog_comment))
        .route("/api/blogs/:key/vote", post(handlers::vote_blog))
        .route("/api/comments/:id/vote", post(handlers::vote_video_comment))
        .route("/api/blog-comments/:id/vote", post(handlers::vote_blog_comment))
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/menu", get(handlers::get_menu));

    let admin = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/videos", post(admin::create_video))
        .route(
            "/api/admin/videos/:id",
            put(admin::update_video).delete(admin::delete_video),
        )
        .route("/api/admin/blogs", post(admin::create_blog))
        .route(
            "/api/admin/blogs/:id",
            put(admin::update_blog).delete(admin::delete_blog),
        )
        .route("/api/admin/categories", post(admin::create_category))
        .route(
            "/api/admin/categories/:id",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route(
            "/api/admin/menu",
            get(handlers::get_menu).put(admin::update_menu),
        )
        .route("/api/admin/comments/:family", get(admin::list_comments))
        .route("/api/admin/comments/:family/:id/approve", post(admin::approve_comment))
        .route("/api/admin/comments/:family/:id/block", post(admin::block_comment))
        .route("/api/admin/comments/:family/:id", delete(admin::delete_comment));

    public
        .merge(admin)
        .with_state(state)
        .layer(middleware::from_fn(request_context::request_context_middleware))
        .layer(cors)
}
