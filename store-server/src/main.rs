use store_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 1. .env, then configuration
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;

    // 2. Logging (guard flushes the file writer on exit)
    let _log_guard = setup_environment(&config);

    tracing::info!(env = %config.environment, "Store server starting...");

    // 3. State: database, migrations, bootstrap account
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
