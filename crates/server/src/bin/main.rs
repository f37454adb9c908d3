use dotenv::dotenv;
use quarry_common::config::Settings;
use quarry_core::Engine;
use quarry_server::api::create_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    quarry_common::telemetry::init_tracing("info");

    let settings = Settings::from_env();
    let app = create_router(Engine::new());

    let addr = format!("{}:{}", settings.api_host, settings.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "quarry server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
