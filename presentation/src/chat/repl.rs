//! REPL (Read-Eval-Print Loop) for interactive study sessions

use crate::ConsoleFormatter;
use crate::PendingSpinner;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use scribe_application::{
    AskInput, AskQuestionUseCase, ConversationLogger, DeleteMaterialUseCase, RagGateway,
    SessionStore,
};
use scribe_domain::SessionId;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Interactive chat REPL
///
/// Plain lines are questions; slash commands manage sessions and scope.
pub struct ChatRepl {
    store: Arc<SessionStore>,
    gateway: Arc<dyn RagGateway>,
    ask: AskQuestionUseCase,
    delete: DeleteMaterialUseCase,
    show_progress: bool,
    top_k: Option<u32>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(store: Arc<SessionStore>, gateway: Arc<dyn RagGateway>) -> Self {
        Self {
            ask: AskQuestionUseCase::new(store.clone(), gateway.clone()),
            delete: DeleteMaterialUseCase::new(store.clone(), gateway.clone()),
            store,
            gateway,
            show_progress: true,
            top_k: None,
        }
    }

    /// Route conversation events from both use cases to the given logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.ask = AskQuestionUseCase::new(self.store.clone(), self.gateway.clone())
            .with_conversation_logger(logger.clone());
        self.delete = DeleteMaterialUseCase::new(self.store.clone(), self.gateway.clone())
            .with_conversation_logger(logger);
        self
    }

    /// Set whether to show the pending spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Set the retrieval depth sent with every question
    pub fn with_top_k(mut self, top_k: Option<u32>) -> Self {
        self.top_k = top_k;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("scribe-tutor").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(line);

                    self.process_question(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          Scribe Tutor - Chat Mode           │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Ask a question, or scope it first with /select.");
        println!();
        println!("Commands:");
        println!("  /sessions          - List sessions");
        println!("  /select <id>...    - Scope questions to these sessions");
        println!("  /all               - Search over all material");
        println!("  /new <title>       - Start a fresh session");
        println!("  /delete <id>       - Delete a session and its material");
        println!("  /health            - Check backend health");
        println!("  /help              - Show this help");
        println!("  /quit              - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return true;
            }
            "/help" | "/h" | "/?" => {
                self.print_welcome();
            }
            "/sessions" => {
                let sessions = self.store.list_sessions();
                let current = self.store.current_session_id();
                println!(
                    "{}",
                    ConsoleFormatter::format_sessions(
                        &sessions,
                        current.as_ref(),
                        &self.store.selection()
                    )
                );
            }
            "/select" => {
                if args.is_empty() {
                    println!("Usage: /select <id>...");
                    return false;
                }
                let mut ids = Vec::new();
                for prefix in &args {
                    match self.resolve_session(prefix) {
                        Some(id) => ids.push(id),
                        None => return false,
                    }
                }
                match self.store.select_scope(ids) {
                    Ok(selection) => {
                        println!("Scoped to {} session(s).", selection.len());
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "/all" => {
                self.store.clear_scope();
                println!("Scope cleared; questions now search all material.");
            }
            "/new" => {
                if args.is_empty() {
                    println!("Usage: /new <title>");
                    return false;
                }
                match self.store.create_session(args.join(" ")) {
                    Ok(id) => println!("Started session {}.", id),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "/delete" => {
                let Some(prefix) = args.first() else {
                    println!("Usage: /delete <id>");
                    return false;
                };
                let Some(id) = self.resolve_session(prefix) else {
                    return false;
                };
                match self.delete.execute(&id).await {
                    Ok(outcome) => {
                        println!("Deleted session {}.", outcome.session_id);
                        if let Some(warning) = outcome.remote_warning {
                            println!("Warning: {}", warning);
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "/health" => match self.gateway.health().await {
                Ok(health) => print!("{}", ConsoleFormatter::format_health(&health)),
                Err(e) => eprintln!("Error: {}", e),
            },
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_question(&self, question: &str) {
        println!();

        // Ctrl-C while waiting cancels the flight instead of killing the
        // REPL; the session still records the attempt.
        let cancel = CancellationToken::new();
        let cancel_on_interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel_on_interrupt.cancel();
            }
        });

        let mut input = AskInput::new(question).with_cancellation(cancel);
        if let Some(top_k) = self.top_k {
            input = input.with_top_k(top_k);
        }

        let spinner = self
            .show_progress
            .then(|| PendingSpinner::start("Thinking..."));
        let result = self.ask.execute(input).await;
        watcher.abort();
        if let Some(spinner) = spinner {
            spinner.finish();
        }

        match result {
            Ok(outcome) => {
                println!("{}", ConsoleFormatter::format_answer(&outcome));
            }
            Err(e) => {
                eprintln!("Error: {}", e);
            }
        }
        println!();
    }

    /// Resolve a session id prefix against the session list; prints a
    /// message and returns None when the prefix is unknown or ambiguous.
    fn resolve_session(&self, prefix: &str) -> Option<SessionId> {
        let sessions = self.store.list_sessions();
        let matches: Vec<&SessionId> = sessions
            .iter()
            .map(|s| s.id())
            .filter(|id| id.as_str().starts_with(prefix))
            .collect();

        match matches.as_slice() {
            [id] => Some((*id).clone()),
            [] => {
                println!("No session matches '{}'", prefix);
                None
            }
            _ => {
                println!(
                    "'{}' is ambiguous: {} sessions match",
                    prefix,
                    matches.len()
                );
                None
            }
        }
    }
}
