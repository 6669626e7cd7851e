use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::platform::Platform;

#[derive(Args)]
pub struct Redeploy {
    #[command(flatten)]
    pub platform: Platform,
}

impl Redeploy {
    pub async fn execute(&self) -> Result<()> {
        self.platform.deploy_production().await?;
        info!("production redeployed");
        Ok(())
    }
}
