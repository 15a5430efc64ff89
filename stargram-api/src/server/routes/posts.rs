use crate::server::{
    Result, ServerError, ServerRouter,
    auth::AuthenticatedUser,
    form::PostForm,
    json::Json,
    query::Query,
    routes::ListParams,
};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use stargram_backend::{posts::PostRepository, publish::PublishOrchestrator};
use stargram_common::model::{
    Id,
    post::{Post, PostMarker},
};
use std::sync::Arc;

pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_recent_posts)
        .typed_post(create_post)
        .typed_post(edit_post)
        .typed_get(get_post)
        .typed_delete(delete_post)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/recent", rejection(ServerError))]
struct RecentPostsPath();

async fn get_recent_posts(
    RecentPostsPath(): RecentPostsPath,
    State(posts): State<Arc<PostRepository>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Post>>> {
    let posts = posts.list_recent(params.limit()).await?;

    Ok(Json(posts))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/create", rejection(ServerError))]
struct CreatePostPath();

async fn create_post(
    CreatePostPath(): CreatePostPath,
    State(publisher): State<Arc<PublishOrchestrator>>,
    user: AuthenticatedUser,
    PostForm(draft): PostForm,
) -> Result<Json<Post>> {
    let post = publisher.publish(user.caller(), draft).await?;

    Ok(Json(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/edit", rejection(ServerError))]
struct EditPostPath {
    id: Id<PostMarker>,
}

async fn edit_post(
    EditPostPath { id }: EditPostPath,
    State(publisher): State<Arc<PublishOrchestrator>>,
    user: AuthenticatedUser,
    PostForm(draft): PostForm,
) -> Result<Json<Post>> {
    let post = publisher.edit(user.caller(), &id, draft).await?;

    Ok(Json(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    PostPath { id }: PostPath,
    State(posts): State<Arc<PostRepository>>,
) -> Result<Json<Post>> {
    let post = posts
        .get_by_id(&id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}

async fn delete_post(
    PostPath { id }: PostPath,
    State(publisher): State<Arc<PublishOrchestrator>>,
    user: AuthenticatedUser,
) -> Result<StatusCode> {
    publisher.remove(user.caller(), &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
