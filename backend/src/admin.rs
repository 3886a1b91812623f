//! Back-office handlers: content CRUD, category management, menu
//! settings and comment moderation.
//!
//! The routes are mounted under `/api/admin`. Authentication happens
//! upstream at the reverse proxy; these handlers trust the caller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use vidblog_shared::{
    sanitize_text, slugify, Blog, BlogInput, Category, Comment, CommentFamily, CommentStatus,
    MenuSettings, Video, VideoInput,
};

use crate::handlers::{
    bad_request, check_length, conflict, internal_error, not_found, ApiError,
};
use crate::state::AppState;
use crate::youtube::extract_youtube_id;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub videos: i64,
    pub blogs: i64,
    pub categories: usize,
    pub video_comments: i64,
    pub blog_comments: i64,
    pub pending_video_comments: i64,
    pub pending_blog_comments: i64,
    pub blocked_video_comments: i64,
    pub blocked_blog_comments: i64,
    pub recent_videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
pub struct VideoRequest {
    pub title: String,
    pub description: String,
    pub youtube_url: String,
    pub category_id: String,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default = "default_true")]
    pub discussion_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct BlogRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default = "default_true")]
    pub discussion_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentListQuery {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

fn default_true() -> bool {
    true
}

const MODERATION_DEFAULT_LIMIT: usize = 100;

pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let fail = |e| internal_error("Failed to build dashboard", e);
    Ok(Json(DashboardResponse {
        videos: state.content.count_videos().map_err(fail)?,
        blogs: state.content.count_blogs().map_err(fail)?,
        categories: state.content.list_categories().map_err(fail)?.len(),
        video_comments: state.comments.count(CommentFamily::Video).map_err(fail)?,
        blog_comments: state.comments.count(CommentFamily::Blog).map_err(fail)?,
        pending_video_comments: state
            .comments
            .count_by_status(CommentFamily::Video, CommentStatus::Pending)
            .map_err(fail)?,
        pending_blog_comments: state
            .comments
            .count_by_status(CommentFamily::Blog, CommentStatus::Pending)
            .map_err(fail)?,
        blocked_video_comments: state
            .comments
            .count_by_status(CommentFamily::Video, CommentStatus::Blocked)
            .map_err(fail)?,
        blocked_blog_comments: state
            .comments
            .count_by_status(CommentFamily::Blog, CommentStatus::Blocked)
            .map_err(fail)?,
        recent_videos: state.content.recent_videos(5).map_err(fail)?,
    }))
}

// ---- videos ----

pub async fn create_video(
    State(state): State<AppState>,
    Json(request): Json<VideoRequest>,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let input = validate_video(&state, &request)?;
    if state
        .content
        .video_slug_taken(&slugify(&input.title), None)
        .map_err(|e| internal_error("Failed to check slug", e))?
    {
        return Err(conflict("A video with this title already exists"));
    }
    let video = state
        .content
        .create_video(input)
        .map_err(|e| internal_error("Failed to create video", e))?;
    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn update_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<VideoRequest>,
) -> Result<Json<Video>, ApiError> {
    let input = validate_video(&state, &request)?;
    if state
        .content
        .video_slug_taken(&slugify(&input.title), Some(&id))
        .map_err(|e| internal_error("Failed to check slug", e))?
    {
        return Err(conflict("A video with this title already exists"));
    }
    let video = state
        .content
        .update_video(&id, input)
        .map_err(|e| internal_error("Failed to update video", e))?
        .ok_or_else(|| not_found("Video not found"))?;
    Ok(Json(video))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = state
        .content
        .delete_video(&id)
        .map_err(|e| internal_error("Failed to delete video", e))?;
    if !deleted {
        return Err(not_found("Video not found"));
    }
    let cascaded = state
        .comments
        .delete_for_entity(CommentFamily::Video, &id)
        .map_err(|e| internal_error("Failed to delete video comments", e))?;
    tracing::info!("Deleted video {} and {} comments", id, cascaded);
    Ok(Json(DeletedResponse { deleted: true }))
}

// ---- blogs ----

pub async fn create_blog(
    State(state): State<AppState>,
    Json(request): Json<BlogRequest>,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let input = validate_blog(&state, &request)?;
    if state
        .content
        .blog_slug_taken(&slugify(&input.title), None)
        .map_err(|e| internal_error("Failed to check slug", e))?
    {
        return Err(conflict("A blog with this title already exists"));
    }
    let blog = state
        .content
        .create_blog(input)
        .map_err(|e| internal_error("Failed to create blog", e))?;
    Ok((StatusCode::CREATED, Json(blog)))
}

pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<BlogRequest>,
) -> Result<Json<Blog>, ApiError> {
    let input = validate_blog(&state, &request)?;
    if state
        .content
        .blog_slug_taken(&slugify(&input.title), Some(&id))
        .map_err(|e| internal_error("Failed to check slug", e))?
    {
        return Err(conflict("A blog with this title already exists"));
    }
    let blog = state
        .content
        .update_blog(&id, input)
        .map_err(|e| internal_error("Failed to update blog", e))?
        .ok_or_else(|| not_found("Blog not found"))?;
    Ok(Json(blog))
}

pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = state
        .content
        .delete_blog(&id)
        .map_err(|e| internal_error("Failed to delete blog", e))?;
    if !deleted {
        return Err(not_found("Blog not found"));
    }
    let cascaded = state
        .comments
        .delete_for_entity(CommentFamily::Blog, &id)
        .map_err(|e| internal_error("Failed to delete blog comments", e))?;
    tracing::info!("Deleted blog {} and {} comments", id, cascaded);
    Ok(Json(DeletedResponse { deleted: true }))
}

// ---- categories ----

pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let name = validate_category_name(&request.name)?;
    if state
        .content
        .category_name_taken(&name, None)
        .map_err(|e| internal_error("Failed to check category name", e))?
    {
        return Err(conflict("A category with this name already exists"));
    }
    let category = state
        .content
        .create_category(&name)
        .map_err(|e| internal_error("Failed to create category", e))?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let name = validate_category_name(&request.name)?;
    if state
        .content
        .category_name_taken(&name, Some(&id))
        .map_err(|e| internal_error("Failed to check category name", e))?
    {
        return Err(conflict("A category with this name already exists"));
    }
    let category = state
        .content
        .update_category(&id, &name)
        .map_err(|e| internal_error("Failed to update category", e))?
        .ok_or_else(|| not_found("Category not found"))?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    if state
        .content
        .get_category(&id)
        .map_err(|e| internal_error("Failed to fetch category", e))?
        .is_none()
    {
        return Err(not_found("Category not found"));
    }
    let linked = state
        .content
        .count_videos_in_category(&id)
        .map_err(|e| internal_error("Failed to count linked videos", e))?;
    if linked > 0 {
        return Err(conflict(
            "Category cannot be deleted while videos are assigned to it",
        ));
    }
    state
        .content
        .delete_category(&id)
        .map_err(|e| internal_error("Failed to delete category", e))?;
    Ok(Json(DeletedResponse { deleted: true }))
}

// ---- menu settings ----

pub async fn update_menu(
    State(state): State<AppState>,
    Json(settings): Json<MenuSettings>,
) -> Result<Json<MenuSettings>, ApiError> {
    let saved = state
        .content
        .update_menu_settings(settings)
        .map_err(|e| internal_error("Failed to update menu settings", e))?;
    Ok(Json(saved))
}

// ---- comment moderation ----

pub async fn list_comments(
    State(state): State<AppState>,
    Path(family): Path<String>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let family = parse_family(&family)?;
    let limit = query.limit.unwrap_or(MODERATION_DEFAULT_LIMIT);
    let comments = match query.entity_id.as_deref() {
        Some(entity_id) => state
            .comments
            .list_for_entity(family, entity_id, limit)
            .map_err(|e| internal_error("Failed to list comments", e))?,
        None => state
            .comments
            .list_recent(family, limit)
            .map_err(|e| internal_error("Failed to list comments", e))?,
    };
    let total = comments.len();
    Ok(Json(CommentListResponse { comments, total }))
}

pub async fn approve_comment(
    State(state): State<AppState>,
    Path((family, id)): Path<(String, String)>,
) -> Result<Json<Comment>, ApiError> {
    moderate_comment(&state, &family, &id, CommentStatus::Approved)
}

pub async fn block_comment(
    State(state): State<AppState>,
    Path((family, id)): Path<(String, String)>,
) -> Result<Json<Comment>, ApiError> {
    moderate_comment(&state, &family, &id, CommentStatus::Blocked)
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path((family, id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let family = parse_family(&family)?;
    let deleted = state
        .comments
        .delete(family, &id)
        .map_err(|e| internal_error("Failed to delete comment", e))?;
    if !deleted {
        return Err(not_found("Comment not found"));
    }
    Ok(Json(DeletedResponse { deleted: true }))
}

fn moderate_comment(
    state: &AppState,
    family: &str,
    id: &str,
    next: CommentStatus,
) -> Result<Json<Comment>, ApiError> {
    let family = parse_family(family)?;
    let comment = state
        .comments
        .set_status(family, id, next)
        .map_err(|e| internal_error("Failed to update comment status", e))?
        .ok_or_else(|| not_found("Comment not found"))?;
    Ok(Json(comment))
}

fn parse_family(raw: &str) -> Result<CommentFamily, ApiError> {
    CommentFamily::parse(raw)
        .ok_or_else(|| bad_request("Comment family must be 'video' or 'blog'"))
}

fn validate_video(state: &AppState, request: &VideoRequest) -> Result<VideoInput, ApiError> {
    let title = sanitize_text(&request.title);
    let description = sanitize_text(&request.description);
    check_length("Title", &title, 3, 160)?;
    check_length("Description", &description, 10, 3000)?;

    let youtube_id = extract_youtube_id(&request.youtube_url)
        .ok_or_else(|| bad_request("Could not extract a YouTube video id"))?;

    let category_id = request.category_id.trim().to_string();
    if category_id.is_empty() {
        return Err(bad_request("Category is required"));
    }
    if state
        .content
        .get_category(&category_id)
        .map_err(|e| internal_error("Failed to fetch category", e))?
        .is_none()
    {
        return Err(bad_request("Category does not exist"));
    }

    Ok(VideoInput {
        title,
        description,
        youtube_id,
        category_id,
        thumbnail_path: request.thumbnail_path.clone(),
        discussion_enabled: request.discussion_enabled,
    })
}

fn validate_blog(state: &AppState, request: &BlogRequest) -> Result<BlogInput, ApiError> {
    let title = sanitize_text(&request.title);
    let content = sanitize_text(&request.content);
    check_length("Title", &title, 3, 160)?;
    check_length("Content", &content, 10, 10000)?;

    let category_id = request
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    if let Some(ref id) = category_id {
        if state
            .content
            .get_category(id)
            .map_err(|e| internal_error("Failed to fetch category", e))?
            .is_none()
        {
            return Err(bad_request("Category does not exist"));
        }
    }

    Ok(BlogInput {
        title,
        content,
        category_id,
        thumbnail_path: request.thumbnail_path.clone(),
        discussion_enabled: request.discussion_enabled,
    })
}

fn validate_category_name(raw: &str) -> Result<String, ApiError> {
    let name = sanitize_text(raw);
    check_length("Category name", &name, 2, 80)?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_request(title: &str, category_id: &str) -> VideoRequest {
        VideoRequest {
            title: title.to_string(),
            description: "a long enough description".to_string(),
            youtube_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            category_id: category_id.to_string(),
            thumbnail_path: None,
            discussion_enabled: true,
        }
    }

    async fn seeded_category(state: &AppState, name: &str) -> Category {
        let (_, Json(category)) = create_category(
            State(state.clone()),
            Json(CategoryRequest { name: name.to_string() }),
        )
        .await
        .expect("create category");
        category
    }

    #[tokio::test]
    async fn duplicate_video_title_is_a_conflict() {
        let state = AppState::in_memory().expect("state");
        let category = seeded_category(&state, "Tutorials").await;

        create_video(
            State(state.clone()),
            Json(video_request("Same Title", &category.id)),
        )
        .await
        .expect("first create");
        let err = create_video(
            State(state),
            Json(video_request("Same   Title!", &category.id)),
        )
        .await
        .expect_err("second create must fail");
        // Both titles collapse to the slug `same-title`.
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn video_with_unknown_category_is_rejected() {
        let state = AppState::in_memory().expect("state");
        let err = create_video(State(state), Json(video_request("A Title", "missing")))
            .await
            .expect_err("must fail");
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_youtube_url_is_rejected() {
        let state = AppState::in_memory().expect("state");
        let category = seeded_category(&state, "Tutorials").await;
        let mut request = video_request("A Title", &category.id);
        request.youtube_url = "https://vimeo.com/12345678".to_string();
        let err = create_video(State(state), Json(request))
            .await
            .expect_err("must fail");
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn category_with_linked_videos_cannot_be_deleted() {
        let state = AppState::in_memory().expect("state");
        let category = seeded_category(&state, "Tutorials").await;
        create_video(
            State(state.clone()),
            Json(video_request("Linked", &category.id)),
        )
        .await
        .expect("create video");

        let err = delete_category(State(state.clone()), Path(category.id.clone()))
            .await
            .expect_err("guard must hold");
        assert_eq!(err.0, StatusCode::CONFLICT);

        // After the video goes away the category can be deleted.
        let video = state
            .content
            .list_videos(None, None)
            .expect("list")
            .remove(0);
        delete_video(State(state.clone()), Path(video.id))
            .await
            .expect("delete video");
        delete_category(State(state), Path(category.id))
            .await
            .expect("delete category");
    }

    #[tokio::test]
    async fn duplicate_category_name_is_a_conflict() {
        let state = AppState::in_memory().expect("state");
        seeded_category(&state, "News").await;
        let err = create_category(
            State(state),
            Json(CategoryRequest { name: "News".to_string() }),
        )
        .await
        .expect_err("must fail");
        assert_eq!(err.0, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn deleting_a_video_cascades_its_comments() {
        let state = AppState::in_memory().expect("state");
        let category = seeded_category(&state, "Tutorials").await;
        let (_, Json(video)) = create_video(
            State(state.clone()),
            Json(video_request("With Comments", &category.id)),
        )
        .await
        .expect("create video");
        state
            .comments
            .create(
                CommentFamily::Video,
                vidblog_shared::NewComment {
                    parent_entity_id: video.id.clone(),
                    parent_comment_id: None,
                    author_name: "Ada".to_string(),
                    message: "soon gone".to_string(),
                },
            )
            .expect("create comment");

        delete_video(State(state.clone()), Path(video.id))
            .await
            .expect("delete video");
        assert_eq!(state.comments.count(CommentFamily::Video).expect("count"), 0);
    }

    #[tokio::test]
    async fn moderation_blocks_and_reapproves() {
        let state = AppState::in_memory().expect("state");
        let comment = state
            .comments
            .create(
                CommentFamily::Blog,
                vidblog_shared::NewComment {
                    parent_entity_id: "blog-1".to_string(),
                    parent_comment_id: None,
                    author_name: "Ada".to_string(),
                    message: "moderate me".to_string(),
                },
            )
            .expect("create comment");

        let Json(blocked) = block_comment(
            State(state.clone()),
            Path(("blog".to_string(), comment.id.clone())),
        )
        .await
        .expect("block");
        assert_eq!(blocked.status, CommentStatus::Blocked);

        let Json(approved) = approve_comment(
            State(state),
            Path(("blog".to_string(), comment.id)),
        )
        .await
        .expect("approve");
        assert_eq!(approved.status, CommentStatus::Approved);
    }

    #[tokio::test]
    async fn unknown_comment_family_is_rejected() {
        let state = AppState::in_memory().expect("state");
        let err = list_comments(
            State(state),
            Path("podcast".to_string()),
            Query(CommentListQuery { entity_id: None, limit: None }),
        )
        .await
        .expect_err("must fail");
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dashboard_counts_both_families() {
        let state = AppState::in_memory().expect("state");
        let category = seeded_category(&state, "Tutorials").await;
        create_video(
            State(state.clone()),
            Json(video_request("Counted", &category.id)),
        )
        .await
        .expect("create video");

        let Json(dashboard) = dashboard(State(state)).await.expect("dashboard");
        assert_eq!(dashboard.videos, 1);
        assert_eq!(dashboard.categories, 1);
        assert_eq!(dashboard.recent_videos.len(), 1);
        assert_eq!(dashboard.video_comments, 0);
    }
}
