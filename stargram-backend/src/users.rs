use crate::{
    capability::DocumentStore,
    error::{BackendError, Result},
    ids::IdSource,
    query::Query,
    record::{UserFields, UserRecord},
};
use serde_json::Value;
use stargram_common::model::{
    Id,
    auth::AccountMarker,
    user::{NewUser, User, UserMarker},
};
use std::sync::Arc;

pub struct UserRepository {
    documents: Arc<dyn DocumentStore>,
    collection: String,
    ids: Arc<IdSource>,
}

fn decode(document: Value) -> Result<User, BackendError> {
    let record: UserRecord = serde_json::from_value(document)?;
    Ok(User::try_from(record)?)
}

impl UserRepository {
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        ids: Arc<IdSource>,
    ) -> Self {
        Self {
            documents,
            collection: collection.into(),
            ids,
        }
    }

    pub async fn create(&self, user: &NewUser) -> Result<User> {
        let id: Id<UserMarker> = self.ids.next();
        let fields = serde_json::to_value(UserFields::from(user)).map_err(BackendError::from)?;

        let document = self
            .documents
            .create_document(&self.collection, id.get(), fields)
            .await?;

        Ok(decode(document)?)
    }

    pub async fn get_by_id(&self, user_id: &Id<UserMarker>) -> Result<Option<User>> {
        let document = self
            .documents
            .get_document(&self.collection, user_id.get())
            .await?;

        Ok(document.map(decode).transpose()?)
    }

    /// The profile document of an identity-provider account.
    pub async fn get_by_account(&self, account_id: &Id<AccountMarker>) -> Result<Option<User>> {
        let mut documents = self
            .documents
            .list_documents(
                &self.collection,
                &[Query::equal("accountId", account_id.get()), Query::Limit(1)],
            )
            .await?;

        Ok(documents.pop().map(decode).transpose()?)
    }
}
