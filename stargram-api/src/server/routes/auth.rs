use crate::server::{
    Result, ServerError, ServerRouter,
    auth::{AuthenticatedUser, PreviousSession},
    json::Json,
};
use axum::{extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::Deserialize;
use stargram_backend::accounts::AccountService;
use stargram_common::model::{
    auth::{Session, SignIn, SignUp},
    user::User,
};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(sign_up)
        .typed_post(sign_in)
        .typed_post(sign_out)
        .typed_get(get_account)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/sign-up", rejection(ServerError))]
struct SignUpPath();

async fn sign_up(
    SignUpPath(): SignUpPath,
    State(accounts): State<Arc<AccountService>>,
    Json(sign_up): Json<SignUp>,
) -> Result<Json<User>> {
    let user = accounts.sign_up(sign_up).await?;

    Ok(Json(user))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/sign-in", rejection(ServerError))]
struct SignInPath();

async fn sign_in(
    SignInPath(): SignInPath,
    State(accounts): State<Arc<AccountService>>,
    PreviousSession(previous): PreviousSession,
    Json(sign_in): Json<SignIn>,
) -> Result<Json<Session>> {
    let session = accounts.sign_in(&sign_in, previous.as_ref()).await?;

    Ok(Json(session))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/auth/sign-out", rejection(ServerError))]
struct SignOutPath();

async fn sign_out(
    SignOutPath(): SignOutPath,
    State(accounts): State<Arc<AccountService>>,
    user: AuthenticatedUser,
) -> Result<StatusCode> {
    accounts.sign_out(user.caller()).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/account", rejection(ServerError))]
struct AccountPath();

async fn get_account(AccountPath(): AccountPath, user: AuthenticatedUser) -> Json<User> {
    Json(user.into_user())
}
