use anyhow::Result;
use clap::Parser;
use mpb_config::BridgeConfig;
use mpb_content::HttpTitleFetcher;
use mpb_publish::Publisher;
use mpb_store::LocalStore;
use tracing_subscriber::EnvFilter;

mod cli;
mod config_cmds;
mod media_cmds;
mod post_cmds;

use cli::{Cli, Commands, ConfigCommands, MediaCommands};

pub(crate) type App = Publisher<LocalStore, HttpTitleFetcher>;

fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    match &cli.config {
        Some(path) => {
            Ok(BridgeConfig::load_from(path)?.with_env_overrides(|key| std::env::var(key).ok()))
        }
        None => BridgeConfig::load(),
    }
}

fn build_app(config: BridgeConfig) -> Result<App> {
    config.validate()?;
    let store = LocalStore::new(config.store.root.clone());
    let titles = HttpTitleFetcher::new()?;
    tracing::debug!(root = %config.store.root.display(), me = %config.site.me, "bridge ready");
    Ok(Publisher::new(config, store, titles))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (output to stderr, initialize only once)
    let filter = if cli.verbose {
        EnvFilter::new("mpb=debug,mpb_publish=debug,mpb_content=debug,mpb_store=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    let format = cli.format;
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => config_cmds::handle_config_show(&config, format)?,
            ConfigCommands::Template => config_cmds::handle_config_template()?,
        },
        Commands::Create {
            json,
            fields,
            files,
            client_id,
        } => {
            let app = build_app(config)?;
            post_cmds::handle_create(&app, json, fields, files, client_id, format).await?;
        }
        Commands::Update { url, patch } => {
            let app = build_app(config)?;
            post_cmds::handle_update(&app, url, patch, format).await?;
        }
        Commands::Delete { url, permanent } => {
            let app = build_app(config)?;
            post_cmds::handle_delete(&app, url, permanent, format).await?;
        }
        Commands::Undelete { url } => {
            let app = build_app(config)?;
            post_cmds::handle_undelete(&app, url, format).await?;
        }
        Commands::Source { url, properties } => {
            let app = build_app(config)?;
            post_cmds::handle_source(&app, url, properties).await?;
        }
        Commands::Media { cmd } => {
            let app = build_app(config)?;
            match cmd {
                MediaCommands::Upload { path } => {
                    media_cmds::handle_media_upload(&app, &path, format).await?
                }
                MediaCommands::List { limit, offset } => {
                    media_cmds::handle_media_list(&app, limit, offset, format).await?
                }
            }
        }
    }

    Ok(())
}
