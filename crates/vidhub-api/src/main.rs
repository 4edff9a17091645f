use vidhub_api::setup;
use vidhub_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (database, media store, services, routes)
    let app = setup::initialize_app(config).await?;

    // Serve until a shutdown signal, then drain background work
    setup::server::start_server(app.state, app.router, app.cleanup_worker).await?;

    Ok(())
}
