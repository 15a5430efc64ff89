use serde::Deserialize;
use server::ServerState;
use stargram_backend::{
    accounts::AccountService,
    client::{BackendClient, BackendConfig},
    error::BackendError,
    files::FileStore,
    ids::IdSource,
    posts::PostRepository,
    publish::PublishOrchestrator,
    users::UserRepository,
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error setting up the backend client: {0}")]
    Backend(#[from] BackendError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stargram_api=debug,\
                stargram_backend=debug,\
                stargram_common=debug,\
                tower_http=debug,axum::rejection=trace"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Server settings and the `BACKEND_`-prefixed provider settings.
fn get_env() -> Result<(Env, BackendConfig), InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    let env = envy::from_env()?;
    let backend = envy::prefixed("BACKEND_").from_env()?;

    Ok((env, backend))
}

fn build_state(config: &BackendConfig) -> Result<ServerState, BackendError> {
    let client = Arc::new(BackendClient::new(config)?);
    let ids = Arc::new(IdSource::default());

    let users = Arc::new(UserRepository::new(
        client.clone(),
        &config.user_collection_id,
        ids.clone(),
    ));
    let posts = Arc::new(PostRepository::new(
        client.clone(),
        &config.post_collection_id,
        ids.clone(),
    ));
    let files = FileStore::new(client.clone(), &config.storage_bucket_id, ids.clone());
    let accounts = AccountService::new(client.clone(), client, users.clone(), ids);

    Ok(ServerState {
        accounts: Arc::new(accounts),
        users,
        posts: posts.clone(),
        publisher: Arc::new(PublishOrchestrator::new(files, posts)),
    })
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received ctrl-c, shutting down");
            shutdown.cancel();
        }
        Err(err) => error!(error = %err, "Could not listen for ctrl-c"),
    }
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let (env, backend) = get_env()?;
    debug!(?backend, "Loaded backend configuration");

    let state = build_state(&backend)?;

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes().layer(tracing_layer).with_state(state);

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
