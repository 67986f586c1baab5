use anyhow::Context;
use tracing::info;

use galek_prompt::{create_app, providers, AppState, Config, ServiceSettings, VisionProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("invalid configuration")?;
    let provider = providers::build_provider(&config).context("failed to build HTTP client")?;

    info!(
        provider = provider.name(),
        environment = config.environment_label(),
        fallback_on_error = config.fallback_on_error,
        "vision provider ready"
    );

    let state = AppState::new(provider, ServiceSettings::from(&config));
    let app = create_app(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!("🚀 Server running on http://{}", address);
    info!("📸 Open it in your browser to turn images into Gemini prompts!");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
