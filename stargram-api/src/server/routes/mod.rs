use crate::server::ServerRouter;
use serde::Deserialize;

mod auth;
mod posts;
mod users;

pub const DEFAULT_LIST_LIMIT: u32 = 20;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .merge(auth::routes())
        .merge(posts::routes())
        .merge(users::routes())
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
struct ListParams {
    limit: Option<u32>,
}

impl ListParams {
    fn limit(self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT)
    }
}
