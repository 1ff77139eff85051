use tracing::{event, Level};

pub async fn run(config: pr_reviewers_api::config::Config) -> Result<(), anyhow::Error> {
    pr_reviewers_api::tracing_config::configure("pr-reviewers-migrate", std::io::stdout, None)?;

    let pool = pr_reviewers_db::connect(config.database_url.as_str(), 1)?;
    let applied = pr_reviewers_db::run_migrations(&pool).await?;
    event!(Level::INFO, applied, "Migrations applied");
    Ok(())
}
