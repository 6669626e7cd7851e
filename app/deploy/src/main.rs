use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use command::push::Push;
use command::redeploy::Redeploy;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod command;
mod platform;
#[cfg(all(test, unix))]
mod testing;

#[derive(Parser)]
#[command(author, version)]
#[command(about = "deploy pr context api to production")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
#[command(arg_required_else_help(true))]
pub enum Command {
    #[command(about = "push production env vars, then redeploy")]
    Push(Push),
    #[command(about = "redeploy production")]
    Redeploy(Redeploy),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().compact().with_line_number(true).with_thread_ids(true))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Push(command) => command.execute().await,
        Command::Redeploy(command) => command.execute().await,
    }
}
