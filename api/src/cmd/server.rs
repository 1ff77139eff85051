use pr_reviewers_api::tracing_config::{self, HoneycombConfig};

pub async fn run(
    mut config: pr_reviewers_api::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let honeycomb_config = HoneycombConfig::from_config(&mut config);
    tracing_config::configure("pr-reviewers", std::io::stdout, honeycomb_config)?;

    let result = serve(config).await;

    tracing_config::teardown();

    result?;
    Ok(())
}

async fn serve(config: pr_reviewers_api::config::Config) -> Result<(), anyhow::Error> {
    let server = pr_reviewers_api::run_server(config).await?;
    server
        .server
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
