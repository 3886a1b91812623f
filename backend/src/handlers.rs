//! Public API handlers: listings, detail pages with comment forests,
//! comment submission and voting.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use vidblog_shared::{
    apply_vote, build_comment_tree, sanitize_text, Blog, Category, Comment, CommentFamily,
    CommentNode, MenuSettings, NewComment, Video, VoteCategory, VoteChoice, VoteCounts,
    VoteError, VoteOutcome,
};

use crate::client_ip;
use crate::state::AppState;

/// Error body every non-2xx response carries.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<Video>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct BlogListResponse {
    pub blogs: Vec<Blog>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct VideoDetailResponse {
    pub video: Video,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct BlogDetailResponse {
    pub blog: Blog,
    pub comments: Vec<CommentNode>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub author_name: String,
    pub message: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "type")]
    pub vote_type: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub likes: i64,
    pub dislikes: i64,
    pub outcome: &'static str,
}

pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let q = normalize_query(query.q.as_deref());
    let videos = state
        .content
        .list_videos(q.as_deref(), query.category.as_deref())
        .map_err(|e| internal_error("Failed to list videos", e))?;
    let total = videos.len();
    Ok(Json(VideoListResponse { videos, total }))
}

pub async fn get_video(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<VideoDetailResponse>, ApiError> {
    let video = state
        .content
        .get_video_by_slug(&slug)
        .map_err(|e| internal_error("Failed to fetch video", e))?
        .ok_or_else(|| not_found("Video not found"))?;
    let comments = state
        .comments
        .list_approved(CommentFamily::Video, &video.id)
        .map_err(|e| internal_error("Failed to fetch comments", e))?;
    Ok(Json(VideoDetailResponse {
        comments: build_comment_tree(&comments),
        video,
    }))
}

pub async fn create_video_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let video = state
        .content
        .get_video_by_slug(&slug)
        .map_err(|e| internal_error("Failed to fetch video", e))?
        .ok_or_else(|| not_found("Video not found"))?;
    if !video.discussion_enabled {
        return Err(forbidden("Comments are disabled for this video"));
    }
    let input = validate_comment(&request, &video.id)?;
    let comment = state
        .comments
        .create(CommentFamily::Video, input)
        .map_err(|e| internal_error("Failed to store comment", e))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<BlogListResponse>, ApiError> {
    let q = normalize_query(query.q.as_deref());
    let blogs = state
        .content
        .list_blogs(q.as_deref(), query.category.as_deref())
        .map_err(|e| internal_error("Failed to list blogs", e))?;
    let total = blogs.len();
    Ok(Json(BlogListResponse { blogs, total }))
}

pub async fn get_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogDetailResponse>, ApiError> {
    let blog = state
        .content
        .get_blog_by_slug(&slug)
        .map_err(|e| internal_error("Failed to fetch blog", e))?
        .ok_or_else(|| not_found("Blog not found"))?;
    let comments = state
        .comments
        .list_approved(CommentFamily::Blog, &blog.id)
        .map_err(|e| internal_error("Failed to fetch comments", e))?;
    Ok(Json(BlogDetailResponse {
        comments: build_comment_tree(&comments),
        blog,
    }))
}

pub async fn create_blog_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let blog = state
        .content
        .get_blog_by_slug(&slug)
        .map_err(|e| internal_error("Failed to fetch blog", e))?
        .ok_or_else(|| not_found("Blog not found"))?;
    if !blog.discussion_enabled {
        return Err(forbidden("Comments are disabled for this blog"));
    }
    let input = validate_comment(&request, &blog.id)?;
    let comment = state
        .comments
        .create(CommentFamily::Blog, input)
        .map_err(|e| internal_error("Failed to store comment", e))?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = state
        .content
        .list_categories()
        .map_err(|e| internal_error("Failed to list categories", e))?;
    Ok(Json(CategoriesResponse { categories }))
}

pub async fn get_menu(State(state): State<AppState>) -> Result<Json<MenuSettings>, ApiError> {
    let settings = state
        .content
        .menu_settings()
        .map_err(|e| internal_error("Failed to read menu settings", e))?;
    Ok(Json(settings))
}

pub async fn vote_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    let choice = parse_choice(&request.vote_type)?;
    let video = state
        .content
        .get_video(&id)
        .map_err(|e| internal_error("Failed to fetch video", e))?
        .ok_or_else(|| not_found("Video not found"))?;
    let voter = client_ip::voter_identity(&headers, peer);
    let current = VoteCounts { likes: video.likes, dislikes: video.dislikes };

    let mut ledger = state.votes.lock();
    let outcome = apply_vote(
        &mut ledger,
        VoteCategory::Video,
        &video.id,
        &voter,
        choice,
        current,
        |updated| state.content.update_video_votes(&video.id, updated),
    )
    .map_err(|e| internal_error("Failed to record vote", e))?;
    Ok(vote_response(outcome))
}

pub async fn vote_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    let choice = parse_choice(&request.vote_type)?;
    let blog = state
        .content
        .get_blog(&id)
        .map_err(|e| internal_error("Failed to fetch blog", e))?
        .ok_or_else(|| not_found("Blog not found"))?;
    let voter = client_ip::voter_identity(&headers, peer);
    let current = VoteCounts { likes: blog.likes, dislikes: blog.dislikes };

    let mut ledger = state.votes.lock();
    let outcome = apply_vote(
        &mut ledger,
        VoteCategory::Blog,
        &blog.id,
        &voter,
        choice,
        current,
        |updated| state.content.update_blog_votes(&blog.id, updated),
    )
    .map_err(|e| internal_error("Failed to record vote", e))?;
    Ok(vote_response(outcome))
}

pub async fn vote_video_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    vote_comment(&state, CommentFamily::Video, &id, peer, &headers, &request.vote_type)
}

pub async fn vote_blog_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    vote_comment(&state, CommentFamily::Blog, &id, peer, &headers, &request.vote_type)
}

fn vote_comment(
    state: &AppState,
    family: CommentFamily,
    id: &str,
    peer: SocketAddr,
    headers: &HeaderMap,
    raw_choice: &str,
) -> Result<(StatusCode, Json<VoteResponse>), ApiError> {
    let choice = parse_choice(raw_choice)?;
    let comment = state
        .comments
        .get(family, id)
        .map_err(|e| internal_error("Failed to fetch comment", e))?
        .ok_or_else(|| not_found("Comment not found"))?;
    let voter = client_ip::voter_identity(headers, peer);
    let current = VoteCounts { likes: comment.likes, dislikes: comment.dislikes };
    let category = match family {
        CommentFamily::Video => VoteCategory::VideoComment,
        CommentFamily::Blog => VoteCategory::BlogComment,
    };

    let mut ledger = state.votes.lock();
    let outcome = apply_vote(
        &mut ledger,
        category,
        &comment.id,
        &voter,
        choice,
        current,
        |updated| state.comments.update_votes(family, &comment.id, updated),
    )
    .map_err(|e| internal_error("Failed to record vote", e))?;
    Ok(vote_response(outcome))
}

fn parse_choice(raw: &str) -> Result<VoteChoice, ApiError> {
    VoteChoice::parse(raw).map_err(|err| match err {
        VoteError::InvalidChoice(_) => bad_request(&err.to_string()),
        VoteError::NotFound(_) => not_found(&err.to_string()),
    })
}

fn vote_response(outcome: VoteOutcome) -> (StatusCode, Json<VoteResponse>) {
    let counts = outcome.counts();
    let (status, label) = match outcome {
        VoteOutcome::Applied(_) => (StatusCode::OK, "ok"),
        VoteOutcome::AlreadyVoted(_) => (StatusCode::CONFLICT, "conflict"),
    };
    (status, Json(VoteResponse { likes: counts.likes, dislikes: counts.dislikes, outcome: label }))
}

fn validate_comment(request: &CommentRequest, entity_id: &str) -> Result<NewComment, ApiError> {
    let author_name = sanitize_text(&request.author_name);
    let message = sanitize_text(&request.message);
    check_length("Author name", &author_name, 2, 80)?;
    check_length("Message", &message, 2, 1000)?;

    // A blank reply target means a top-level comment; a dangling one
    // is stored as-is and promoted by the tree builder.
    let parent_comment_id = request
        .parent_comment_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Ok(NewComment {
        parent_entity_id: entity_id.to_string(),
        parent_comment_id,
        author_name,
        message,
    })
}

pub(crate) fn check_length(
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ApiError> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(bad_request(&format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_query(q: Option<&str>) -> Option<String> {
    q.map(sanitize_text).filter(|q| !q.is_empty())
}

pub(crate) fn internal_error(message: &str, err: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}: {}", message, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message.to_string(), code: 500 }),
    )
}

pub(crate) fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: message.to_string(), code: 404 }),
    )
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message.to_string(), code: 400 }),
    )
}

pub(crate) fn forbidden(message: &str) -> ApiError {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse { error: message.to_string(), code: 403 }),
    )
}

pub(crate) fn conflict(message: &str) -> ApiError {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse { error: message.to_string(), code: 409 }),
    )
}
