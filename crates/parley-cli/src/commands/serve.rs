use anyhow::Result;
use parley_config::ParleyConfig;

/// Run the relay proxy until the process is stopped.
pub async fn execute(config: ParleyConfig) -> Result<()> {
    parley_web::start_server(&config.server).await?;
    Ok(())
}
