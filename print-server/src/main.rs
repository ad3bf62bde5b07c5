use anyhow::Context;
use print_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env, configuration and logging
    let config = setup_environment();
    tracing::info!("Uniform print server starting...");
    tracing::info!(
        environment = %config.environment,
        timezone = %config.timezone,
        sweep_interval_secs = config.sweep_interval_secs,
        "Configuration loaded"
    );

    // 2. Database and services
    let state = ServerState::initialize(&config)
        .await
        .context("failed to initialise server state")?;

    // 3. HTTP server (also starts the sweep runner)
    Server::with_state(config, state)
        .run()
        .await
        .context("server error")?;

    Ok(())
}
