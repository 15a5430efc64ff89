pub mod accounts;
pub mod capability;
pub mod client;
pub mod error;
pub mod files;
pub mod ids;
pub mod posts;
pub mod publish;
pub mod query;
mod record;
pub mod users;

#[cfg(test)]
mod testing;
