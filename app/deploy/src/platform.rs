use std::fmt;
use std::io::ErrorKind;
use std::process::Stdio;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Args;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

pub const SCOPE: &str = "production";
const MASK: &str = "********";

/// One variable of the production environment.
pub struct EnvVar {
    pub key: &'static str,
    pub value: String,
    pub secret: bool,
}

impl EnvVar {
    pub fn plain(key: &'static str, value: String) -> Self {
        EnvVar {
            key,
            value,
            secret: false,
        }
    }

    pub fn secret(key: &'static str, value: String) -> Self {
        EnvVar { key, value, secret: true }
    }

    pub fn shown_value(&self) -> &str {
        if self.secret { MASK } else { &self.value }
    }
}

impl fmt::Debug for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVar")
            .field("key", &self.key)
            .field("value", &self.shown_value())
            .field("secret", &self.secret)
            .finish()
    }
}

/// The deployment platform's command line tool.
#[derive(Args, Debug)]
pub struct Platform {
    #[arg(long, default_value = "vercel", help = "platform cli to invoke")]
    pub tool: String,

    #[arg(long, help = "print commands without running them")]
    pub dry_run: bool,
}

// each operation returns the command line it ran or, in dry run, printed
impl Platform {
    pub async fn env_add(&self, var: &EnvVar) -> Result<String> {
        self.run(&["env", "add", var.key, SCOPE], Some(var)).await
    }

    pub async fn env_rm(&self, key: &str) -> Result<String> {
        self.run(&["env", "rm", key, SCOPE, "--yes"], None).await
    }

    pub async fn deploy_production(&self) -> Result<String> {
        self.run(&["--prod"], None).await
    }

    async fn run(&self, args: &[&str], input: Option<&EnvVar>) -> Result<String> {
        let command_line = format!("{} {}", self.tool, args.join(" "));
        let shown = match input {
            Some(var) => format!("{command_line}  < {}", var.shown_value()),
            None => command_line.clone(),
        };

        if self.dry_run {
            println!("{shown}");
            return Ok(shown);
        }

        info!("run command, command={shown}");
        let mut child = Command::new(&self.tool)
            .args(args)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::inherit() })
            .spawn()
            .with_context(|| format!("failed to run command, command={command_line}"))?;

        if let Some(var) = input {
            let mut stdin = child.stdin.take().context("stdin of child process is not piped")?;
            // the platform stores stdin verbatim, so no line terminator
            match stdin.write_all(var.value.as_bytes()).await {
                Err(err) if err.kind() != ErrorKind::BrokenPipe => {
                    return Err(err).with_context(|| format!("failed to write value, command={command_line}"));
                }
                _ => {}
            }
            drop(stdin);
        }

        let status = child.wait().await?;
        if !status.success() {
            bail!("command failed, command={command_line}, status={status}");
        }
        Ok(shown)
    }
}
