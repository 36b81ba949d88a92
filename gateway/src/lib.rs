pub mod api;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod metrics_defs;
pub mod state;

use tokio::net::TcpListener;

pub use config::Config;
pub use errors::ApiError;
pub use state::AppState;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ValidationError),
}

pub async fn serve(config: Config) -> Result<(), GatewayError> {
    config.validate()?;
    let state = AppState::from_config(&config);
    let app = api::router(state);
    let listener = TcpListener::bind((config.listener.host.as_str(), config.listener.port)).await?;
    tracing::info!(address = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}
