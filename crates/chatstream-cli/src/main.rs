mod config;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatstream_client::{
    ClientContext, EventStreamClient, HttpTransport, OwnMessageSource, ReadStatusPoller,
    StreamKind,
};

use crate::config::Config;
use crate::output::{JsonLinesHandler, JsonLinesMarks};

#[derive(Parser, Debug)]
#[command(name = "chatstream", version, about = "Follow chat streams from the terminal")]
struct Cli {
    /// Config file to use instead of config/default.toml + config/{ENV}.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Logged-in user id; messages from this user raise no notification
    #[arg(long, global = true)]
    current_user: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print new messages of one room
    Room { room_id: i64 },
    /// Print updates for all of the user's rooms
    Rooms,
    /// Print read marks for some of your own messages, refreshed periodically
    ReadStatus {
        room_id: i64,
        #[arg(required = true)]
        message_ids: Vec<i64>,
    },
}

struct FixedIds(Vec<i64>);

impl OwnMessageSource for FixedIds {
    fn own_message_ids(&self) -> Vec<i64> {
        self.0.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    config
        .client
        .validate()
        .context("Invalid client configuration")?;
    tracing::info!(base_url = %config.client.base_url, "Configuration loaded");

    let transport = Arc::new(HttpTransport::new(&config.client)?);

    let mut context = ClientContext::new();
    if let Some(user_id) = cli.current_user {
        context = context.with_current_user(user_id);
    }

    match cli.command {
        Command::Room { room_id } => {
            follow(&config, transport, StreamKind::Messages { room_id }, context).await
        }
        Command::Rooms => follow(&config, transport, StreamKind::Rooms, context).await,
        Command::ReadStatus {
            room_id,
            message_ids,
        } => {
            let mut poller = ReadStatusPoller::new(
                room_id,
                config.client.read_status_interval(),
                transport,
                Arc::new(FixedIds(message_ids)),
                Arc::new(JsonLinesMarks),
            );
            poller.start();
            tokio::signal::ctrl_c().await?;
            poller.stop();
            Ok(())
        }
    }
}

async fn follow(
    config: &Config,
    transport: Arc<HttpTransport>,
    kind: StreamKind,
    context: ClientContext,
) -> anyhow::Result<()> {
    let handler = Arc::new(JsonLinesHandler::default());

    let mut client = EventStreamClient::builder(kind)
        .transport(transport)
        .handler(handler.clone())
        .policy(config.client.policy_for(&kind))
        .context(context)
        .build()?;

    client.connect();

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => signal.map_err(anyhow::Error::from),
        _ = handler.exhausted() => Err(anyhow::anyhow!("{} stream gave up reconnecting", kind.label())),
    };

    client.disconnect();
    tracing::info!("Shutting down");
    outcome
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the JSON event lines
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
