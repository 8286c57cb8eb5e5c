use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use teloxide::Bot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crosspost_agent::{ContentDeriver, OpenAiProvider, PublishCoordinator};
use crosspost_core::CrosspostConfig;
use crosspost_telegram::{
    Allowlist, BotContext, TelegramAdapter, TelegramChannelPublisher, TelegramMediaSource,
};
use crosspost_x::{XClient, XPublisher};

mod app;

#[derive(Parser)]
#[command(name = "crosspost", version)]
#[command(about = "Republish operator posts to a Telegram channel and X")]
struct Cli {
    /// Config file (default: ~/.crosspost/crosspost.toml)
    #[arg(long, short = 'c', env = "CROSSPOST_CONFIG")]
    config: Option<String>,

    /// Log level, overrides `log_level` from the config
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional; real env vars win.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = CrosspostConfig::load(cli.config.as_deref());
    let level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_tracing(&level);

    let config = loaded.context("failed to load configuration")?;
    if let Err(e) = config.validate() {
        error!(
            code = e.code(),
            error = %e,
            "configuration incomplete, set the missing values in crosspost.toml or the environment"
        );
        return Err(e.into());
    }

    let bot = Bot::new(&config.telegram.bot_token);
    let timeout = config.pipeline.request_timeout();

    // collaborators
    let media = Arc::new(TelegramMediaSource::new(
        bot.clone(),
        config.telegram.max_download_bytes,
    ));
    let provider = OpenAiProvider::new(
        config.openai.api_key.clone(),
        Some(config.openai.base_url.clone()),
        timeout,
    );
    let deriver = Arc::new(ContentDeriver::new(
        Box::new(provider),
        config.openai.model.clone(),
        timeout,
    ));
    let broadcast = Arc::new(
        TelegramChannelPublisher::new(bot.clone(), &config.telegram.channel_id)
            .context("invalid telegram.channel_id")?,
    );
    let x_client = Arc::new(XClient::new(&config.x, timeout));
    let microblog = Arc::new(XPublisher::new(x_client, config.x.handle.clone()));

    let coordinator = PublishCoordinator::new(&config, media, deriver, broadcast, microblog);
    let allowlist = Allowlist::new(config.telegram.allowed_users());

    info!("============================================================");
    info!("crosspost {}", env!("CARGO_PKG_VERSION"));
    info!(channel = %config.telegram.channel_id, "broadcast channel");
    info!(users = %allowlist.describe(), "authorized operators");
    info!(model = %config.openai.model, "language model");
    info!("============================================================");

    let ctx = Arc::new(BotContext::new(coordinator, allowlist));
    let health = Arc::new(app::HealthState::default());

    if config.http.enabled {
        let addr: SocketAddr = format!("{}:{}", config.http.bind, config.http.port)
            .parse()
            .context("invalid http.bind / http.port")?;
        let state = Arc::clone(&health);
        tokio::spawn(async move {
            if let Err(e) = app::serve(addr, state).await {
                error!(error = %e, %addr, "health endpoint stopped");
            }
        });
    }

    health.bot_running.store(true, Ordering::Relaxed);
    TelegramAdapter::new(bot, ctx).run().await;
    health.bot_running.store(false, Ordering::Relaxed);

    info!("bot stopped by operator");
    Ok(())
}

/// `RUST_LOG` wins when set; otherwise our crates log at `level`, the rest at warn.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(format!("warn,crosspost={level},tower_http=info"))
            .unwrap_or_else(|_| EnvFilter::new("warn,crosspost=info"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
