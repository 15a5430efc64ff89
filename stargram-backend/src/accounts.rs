use crate::{
    capability::{Avatars, Identity},
    error::{BackendError, Error, Result},
    ids::IdSource,
    users::UserRepository,
};
use stargram_common::model::{
    Id,
    auth::{AccountMarker, Caller, Session, SessionSecret, SignIn, SignUp},
    user::{NewUser, User},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// The signed in user behind a session.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CurrentUser {
    pub caller: Caller,
    pub user: User,
}

pub struct AccountService {
    identity: Arc<dyn Identity>,
    avatars: Arc<dyn Avatars>,
    users: Arc<UserRepository>,
    ids: Arc<IdSource>,
}

fn identity_error(err: BackendError) -> Error {
    if err.is_unauthorized() {
        Error::Unauthenticated
    } else {
        Error::Identity(err)
    }
}

impl AccountService {
    #[must_use]
    pub fn new(
        identity: Arc<dyn Identity>,
        avatars: Arc<dyn Avatars>,
        users: Arc<UserRepository>,
        ids: Arc<IdSource>,
    ) -> Self {
        Self {
            identity,
            avatars,
            users,
            ids,
        }
    }

    /// Creates the account and its profile document.
    ///
    /// If saving the profile fails the account stays behind without one.
    pub async fn sign_up(&self, sign_up: SignUp) -> Result<User> {
        let account_id: Id<AccountMarker> = self.ids.next();
        let account = self
            .identity
            .create_account(
                &account_id,
                &sign_up.email,
                &sign_up.password,
                sign_up.name.get(),
            )
            .await
            .map_err(Error::Identity)?;
        debug!(account = %account.id, "Created account");

        let new_user = NewUser {
            account_id: account.id,
            image_url: self.avatars.initials_url(sign_up.name.get()),
            name: sign_up.name,
            username: sign_up.username,
            email: sign_up.email,
        };

        self.users.create(&new_user).await
    }

    /// Replaces `previous` with a fresh session.
    pub async fn sign_in(
        &self,
        sign_in: &SignIn,
        previous: Option<&SessionSecret>,
    ) -> Result<Session> {
        if let Some(previous) = previous
            && let Err(err) = self.identity.delete_session(previous).await
        {
            warn!(error = %err, "Could not delete the previous session");
        }

        self.identity
            .create_session(&sign_in.email, &sign_in.password)
            .await
            .map_err(identity_error)
    }

    pub async fn sign_out(&self, caller: &Caller) -> Result<()> {
        self.identity
            .delete_session(&caller.session)
            .await
            .map_err(identity_error)
    }

    /// `None` if the session is invalid or has no profile linked to it.
    pub async fn current_user(&self, session: &SessionSecret) -> Result<Option<CurrentUser>> {
        let Some(account) = self
            .identity
            .current_account(session)
            .await
            .map_err(identity_error)?
        else {
            return Ok(None);
        };

        let Some(user) = self.users.get_by_account(&account.id).await? else {
            warn!(account = %account.id, "Account has no user document");
            return Ok(None);
        };

        Ok(Some(CurrentUser {
            caller: Caller {
                user_id: user.id.clone(),
                session: session.clone(),
            },
            user,
        }))
    }
}
