use crate::server::{
    Result, ServerError, ServerRouter, json::Json, query::Query, routes::ListParams,
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use stargram_backend::{posts::PostRepository, users::UserRepository};
use stargram_common::model::{
    Id,
    post::Post,
    user::{User, UserMarker},
};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(get_user)
        .typed_get(get_user_posts)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}", rejection(ServerError))]
struct GetUserPath {
    id: Id<UserMarker>,
}

async fn get_user(
    GetUserPath { id }: GetUserPath,
    State(users): State<Arc<UserRepository>>,
) -> Result<Json<User>> {
    let user = users
        .get_by_id(&id)
        .await?
        .ok_or(ServerError::UserByIdNotFound(id))?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/users/{id}/posts", rejection(ServerError))]
struct GetUserPostsPath {
    id: Id<UserMarker>,
}

async fn get_user_posts(
    GetUserPostsPath { id }: GetUserPostsPath,
    State(users): State<Arc<UserRepository>>,
    State(posts): State<Arc<PostRepository>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Post>>> {
    if users.get_by_id(&id).await?.is_none() {
        return Err(ServerError::UserByIdNotFound(id));
    }

    let posts = posts.list_by_creator(&id, params.limit()).await?;

    Ok(Json(posts))
}
