use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use stargram_backend::accounts::{AccountService, CurrentUser};
use stargram_common::model::{
    auth::{Caller, SessionSecret},
    user::User,
};
use std::sync::Arc;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// Caller holding a live session that is linked to a user document.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct AuthenticatedUser(CurrentUser);

impl AuthenticatedUser {
    #[must_use]
    pub fn caller(&self) -> &Caller {
        &self.0.caller
    }

    #[must_use]
    pub fn into_user(self) -> User {
        self.0.user
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AccountService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: SessionSecret = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?
            .token()
            .parse()?;

        let current = Arc::<AccountService>::from_ref(state)
            .current_user(&session)
            .await?
            .ok_or(ServerError::InvalidToken)?;

        Ok(Self(current))
    }
}

/// Session the client may still hold from an earlier sign in. Not validated.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PreviousSession(pub Option<SessionSecret>);

impl<S> FromRequestParts<S> for PreviousSession
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = Option::<AuthorizationHeader>::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?;

        let session = header
            .map(|TypedHeader(authorization)| authorization.token().parse())
            .transpose()?;

        Ok(Self(session))
    }
}
