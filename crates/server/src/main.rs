//! WalkSafe analysis service

use anyhow::Result;
use walksafe_server::startup::{init_tracing, serve};
use walksafe_server::{ServerConfig, ServiceKind};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env(ServiceKind::Analysis).inspect_err(|e| {
        tracing::error!("{}", e);
    })?;

    serve(config).await
}
