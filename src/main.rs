use clap::Parser;
use tracing::warn;

use friend_circle::app::{shutdown, AppContext};
use friend_circle::cli::{commands, Cli, Commands};
use friend_circle::config::Config;
use friend_circle::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let subscriber = logging::build_subscriber(&config.log_level, &config.log_format, &config.log_color);
    tracing::subscriber::set_global_default(subscriber)?;

    let rules = commands::load_rules(&cli.rules)?;
    let ctx = AppContext::new(config, rules)?;

    match cli.action() {
        Commands::Run => {
            let (trigger, signal) = shutdown::channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling run");
                    trigger.trigger();
                }
            });
            commands::run(&ctx, &cli.export, signal).await?;
        }
        Commands::Discover => {
            commands::discover(&ctx).await?;
        }
        Commands::Export => {
            commands::export(&ctx, &cli.export)?;
        }
        Commands::Find { site, suffix } => {
            commands::find(&ctx, &site, &suffix).await?;
        }
    }

    Ok(())
}
