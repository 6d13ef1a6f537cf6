//! CLI entrypoint for Scribe Tutor
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod materials;

use anyhow::{bail, Context, Result};
use clap::Parser;
use scribe_application::{
    AskInput, AskQuestionUseCase, ConversationLogger, DeleteMaterialUseCase, IngestMaterialInput,
    IngestMaterialUseCase, NoConversationLogger, RagGateway, SessionStore,
};
use scribe_domain::SessionId;
use scribe_infrastructure::{
    ConfigLoader, FileStateStorage, HttpRagClient, JsonlConversationLogger,
};
use scribe_presentation::{ChatRepl, Cli, Command, ConsoleFormatter, PendingSpinner};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    info!("Starting Scribe Tutor");

    // === Dependency Injection ===
    let storage = Arc::new(FileStateStorage::new(config.storage.resolved_state_path()));
    let store = Arc::new(SessionStore::open(storage).context("Failed to open session store")?);

    let gateway: Arc<dyn RagGateway> = Arc::new(HttpRagClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.timeout_secs),
    )?);

    let conversation_logger: Arc<dyn ConversationLogger> = if config.logging.conversation_log {
        match JsonlConversationLogger::open(config.logging.resolved_log_path()) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoConversationLogger),
        }
    } else {
        Arc::new(NoConversationLogger)
    };

    match cli.command {
        Some(Command::Ask {
            question,
            session,
            top_k,
        }) => {
            if !session.is_empty() {
                let ids = session
                    .iter()
                    .map(|prefix| resolve_session(&store, prefix))
                    .collect::<Result<Vec<_>>>()?;
                store.select_scope(ids)?;
            }

            let use_case = AskQuestionUseCase::new(store.clone(), gateway.clone())
                .with_conversation_logger(conversation_logger.clone());

            let cancel = CancellationToken::new();
            let cancel_on_interrupt = cancel.clone();
            let watcher = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_on_interrupt.cancel();
                }
            });

            let mut input = AskInput::new(question).with_cancellation(cancel);
            if let Some(top_k) = top_k.or(config.backend.top_k) {
                input = input.with_top_k(top_k);
            }

            let spinner = (!cli.quiet).then(|| PendingSpinner::start("Thinking..."));
            let result = use_case.execute(input).await;
            watcher.abort();
            if let Some(spinner) = spinner {
                spinner.finish();
            }

            let outcome = result?;
            print!("{}", ConsoleFormatter::format_answer(&outcome));
        }

        Some(Command::Ingest {
            title,
            pdf,
            text,
            youtube,
        }) => {
            let items = materials::build_items(&pdf, &text, &youtube)?;
            if items.is_empty() {
                bail!("Nothing to ingest: pass --pdf, --text, or --youtube");
            }

            let mut input = IngestMaterialInput::new(items);
            if let Some(title) = title {
                input = input.with_title(title);
            }

            let use_case = IngestMaterialUseCase::new(store.clone(), gateway.clone())
                .with_conversation_logger(conversation_logger.clone());

            let spinner = (!cli.quiet).then(|| PendingSpinner::start("Ingesting..."));
            let result = use_case.execute(input).await;
            if let Some(spinner) = spinner {
                spinner.finish();
            }

            let outcome = result?;
            print!("{}", ConsoleFormatter::format_receipt(&outcome));
        }

        Some(Command::Sessions) => {
            println!(
                "{}",
                ConsoleFormatter::format_sessions(
                    &store.list_sessions(),
                    store.current_session_id().as_ref(),
                    &store.selection()
                )
            );
        }

        Some(Command::Delete { session_id }) => {
            let id = resolve_session(&store, &session_id)?;
            let use_case = DeleteMaterialUseCase::new(store.clone(), gateway.clone())
                .with_conversation_logger(conversation_logger.clone());

            let outcome = use_case.execute(&id).await?;
            println!("Deleted session {}.", outcome.session_id);
            if let Some(warning) = outcome.remote_warning {
                eprintln!("Warning: {}", warning);
            }
        }

        Some(Command::Health) => {
            let health = gateway.health().await?;
            print!("{}", ConsoleFormatter::format_health(&health));
        }

        // Chat mode is the default when no subcommand is given
        Some(Command::Chat) | None => {
            let repl = ChatRepl::new(store, gateway)
                .with_conversation_logger(conversation_logger)
                .with_progress(!cli.quiet)
                .with_top_k(config.backend.top_k);
            repl.run().await?;
        }
    }

    Ok(())
}

/// Resolve a session id or unique prefix against the store.
fn resolve_session(store: &SessionStore, prefix: &str) -> Result<SessionId> {
    let sessions = store.list_sessions();
    let matches: Vec<&SessionId> = sessions
        .iter()
        .map(|s| s.id())
        .filter(|id| id.as_str().starts_with(prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => bail!("No session matches '{}'", prefix),
        _ => bail!("'{}' is ambiguous: {} sessions match", prefix, matches.len()),
    }
}
