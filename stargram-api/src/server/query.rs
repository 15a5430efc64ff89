use crate::server::ServerError;
use axum::extract::{FromRequestParts, Query as AxumQuery};

#[derive(FromRequestParts, Debug, Clone, Copy, Default)]
#[from_request(via(AxumQuery), rejection(ServerError))]
pub struct Query<T>(pub T);
