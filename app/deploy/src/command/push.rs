use std::io::Write;
use std::io::stdout;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Args;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::io::stdin;
use tracing::info;
use tracing::warn;

use crate::platform::EnvVar;
use crate::platform::Platform;

const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_ALLOWED_ORIGINS: &str = "chrome-extension://*";

#[derive(Args)]
pub struct Push {
    #[command(flatten)]
    pub platform: Platform,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true, help = "groq api key, prompted when absent")]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL, help = "groq model")]
    pub model: String,

    #[arg(long, default_value = DEFAULT_ALLOWED_ORIGINS, help = "comma separated cors origins")]
    pub allowed_origins: String,

    #[arg(long, help = "enable debug mode in production")]
    pub debug: bool,

    #[arg(long, help = "remove existing vars before adding")]
    pub replace: bool,

    #[arg(long, help = "only push env vars")]
    pub skip_redeploy: bool,
}

impl Push {
    pub async fn execute(&self) -> Result<()> {
        let api_key = match &self.api_key {
            Some(api_key) => api_key.clone(),
            None => prompt("GROQ_API_KEY").await?,
        };
        let vars = runbook_vars(api_key, &self.model, &self.allowed_origins, self.debug)?;

        push_env(&self.platform, &vars, self.replace).await?;

        if self.skip_redeploy {
            info!("skip redeploy, env changes apply on next deployment");
            return Ok(());
        }
        self.platform.deploy_production().await?;
        info!("production redeployed");
        Ok(())
    }
}

/// Production env vars in the order they are pushed.
pub fn runbook_vars(api_key: String, model: &str, allowed_origins: &str, debug: bool) -> Result<Vec<EnvVar>> {
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("GROQ_API_KEY must not be empty");
    }
    Ok(vec![
        EnvVar::secret("GROQ_API_KEY", api_key),
        EnvVar::plain("GROQ_MODEL", model.to_string()),
        EnvVar::plain("ALLOWED_ORIGINS", allowed_origins.to_string()),
        EnvVar::plain("DEBUG", debug.to_string()),
    ])
}

// returns the command lines in the order they ran
pub async fn push_env(platform: &Platform, vars: &[EnvVar], replace: bool) -> Result<Vec<String>> {
    let mut commands = vec![];
    for var in vars {
        if replace {
            match platform.env_rm(var.key).await {
                Ok(command) => commands.push(command),
                Err(err) => warn!("failed to remove env, key={}, error={err}", var.key),
            }
        }
        commands.push(platform.env_add(var).await?);
        info!("env pushed, key={}, value={}", var.key, var.shown_value());
    }
    Ok(commands)
}

async fn prompt(name: &str) -> Result<String> {
    print!("{name}: ");
    stdout().flush()?;
    let mut lines = BufReader::new(stdin()).lines();
    let line = lines.next_line().await?.with_context(|| format!("no value entered, name={name}"))?;
    Ok(line.trim().to_string())
}
