use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curator::api::{self, AppState};
use curator::auth::Authorizer;
use curator::cli::{Cli, Commands, QueueCommands};
use curator::config::{self, Config};
use curator::decision::{DecisionEngine, DecisionHandler};
use curator::notifier::SuggestionNotifier;
use curator::poller::CursorPoller;
use curator::registry::ControlRegistry;
use curator::store::postgres::PgStore;
use curator::store::SuggestionStore;
use curator::transport::rest::RestTransport;
use curator::transport::{ActionKind, ChatTransport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "curator=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Serve { port }) => run_server(cfg, port).await,
        Some(Commands::Queue { command }) => run_queue_command(cfg, command).await,
        None => run_server(cfg, None).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let pg = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    pg.migrate().await?;
    let store: Arc<dyn SuggestionStore> = Arc::new(pg);

    let transport: Arc<dyn ChatTransport> =
        Arc::new(RestTransport::new(&cfg.transport_api, &cfg.transport_token));

    let channel_ref = transport
        .resolve_channel_by_name(&cfg.guild_id, &cfg.channel_name)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "channel '{}' not found in guild {}",
                cfg.channel_name,
                cfg.guild_id
            )
        })?;

    let registry = Arc::new(ControlRegistry::new());
    let restored = registry.rehydrate(store.as_ref()).await?;
    tracing::info!(restored, "restored live control bindings");

    let notifier = Arc::new(SuggestionNotifier::new(
        store.clone(),
        transport.clone(),
        registry.clone(),
        channel_ref,
    ));
    CursorPoller::new(
        store.clone(),
        notifier,
        Duration::from_secs(cfg.poll_secs),
    )
    .spawn();
    tracing::info!(period_secs = cfg.poll_secs, "cursor poller started");

    let authorizer = Authorizer::new(
        cfg.owner_id.clone(),
        cfg.mod_roles.clone(),
        transport.clone(),
    );
    let decisions = DecisionHandler::new(
        DecisionEngine::new(store.clone()),
        transport,
        registry,
        authorizer,
    );

    let state = Arc::new(AppState { decisions });
    let app = api::router(state).layer(tower_http::trace::TraceLayer::new_for_http());

    let port = port_override.unwrap_or(cfg.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("curator listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_queue_command(cfg: Config, cmd: QueueCommands) -> anyhow::Result<()> {
    let store: Arc<dyn SuggestionStore> = Arc::new(PgStore::connect(&cfg.database_url).await?);
    let engine = DecisionEngine::new(store.clone());

    match cmd {
        QueueCommands::List => {
            let pending = store
                .list_pending_since(DateTime::<Utc>::UNIX_EPOCH)
                .await?;
            if pending.is_empty() {
                println!("No pending suggestions.");
                return Ok(());
            }
            println!(
                "{:<8} {:<8} {:<8} {:<20} CREATED",
                "ID", "KIND", "TARGET", "SUBMITTER"
            );
            for s in pending {
                println!(
                    "{:<8} {:<8} {:<8} {:<20} {}",
                    s.id,
                    s.kind.to_string(),
                    s.target_record_id
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "-".into()),
                    s.submitted_by,
                    s.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        QueueCommands::Approve { suggestion_id } => {
            let outcome = engine
                .decide(suggestion_id, ActionKind::Approve, &cfg.owner_id)
                .await?;
            println!("{}", outcome.message());
        }
        QueueCommands::Reject { suggestion_id } => {
            let outcome = engine
                .decide(suggestion_id, ActionKind::Reject, &cfg.owner_id)
                .await?;
            println!("{}", outcome.message());
        }
    }
    Ok(())
}
