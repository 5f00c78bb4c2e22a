//! CLI entry point for the Intervue client

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Input;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use intervue_client::HttpChatClient;
use intervue_core::config::{expand_home, Config, ConfigLoader};
use intervue_core::logging::init_logging;
use intervue_core::session::{Message, Sender};
use intervue_core::storage::FileStore;
use intervue_engine::{ConversationEngine, EngineError, SessionManager};

#[derive(Parser)]
#[command(name = "intervue")]
#[command(about = "Command-line client for the Intervue interview bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Backend base URL, overriding the configured one
    #[arg(short, long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or resume an interactive chat session
    Chat,
    /// Send a single message within the current session
    Send {
        /// Message to send
        #[arg(short, long)]
        message: String,
    },
    /// Show the current session
    Status,
    /// Reset the conversation, keeping the session
    Reset,
    /// End the session and wipe local state
    Logout,
}

/// The wired-up client: session manager and conversation engine over one
/// transport and one store.
struct App {
    sessions: SessionManager,
    convo: ConversationEngine,
}

fn build_app(config: &Config, server: Option<String>) -> App {
    let base_url = server.unwrap_or_else(|| config.server.base_url.clone());
    let transport = Arc::new(HttpChatClient::new(base_url));
    let store = Arc::new(FileStore::new(expand_home(&config.chat.state_dir)));

    let sessions = SessionManager::new(
        transport.clone(),
        store.clone(),
        config.chat.reset_greeting.clone(),
    );
    let convo = ConversationEngine::new(transport, store);
    App { sessions, convo }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };
    let config = config_loader.load()?;
    let _guard = init_logging(&config.logging);

    let app = build_app(&config, cli.server);

    match cli.command {
        Commands::Chat => {
            info!("Starting interactive chat");
            run_chat(&app).await?;
        }
        Commands::Send { message } => {
            run_send(&app, &message).await?;
        }
        Commands::Status => {
            run_status(&app);
        }
        Commands::Reset => {
            run_reset(&app).await?;
        }
        Commands::Logout => {
            run_logout(&app)?;
        }
    }

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_message(message: &Message, username: &str) {
    match message.sender {
        Sender::User => println!("{}: {}", style(username).bold().blue(), message.text),
        Sender::Bot => println!("{}: {}", style("bot").bold().green(), message.text),
    }
}

fn print_bot(text: &str) {
    println!("{}: {}", style("bot").bold().green(), text);
}

fn print_error(error: &EngineError) {
    println!("{}", style(error).red());
}

async fn run_chat(app: &App) -> Result<()> {
    println!("{}", style("Intervue Bot").bold().cyan());

    let session = app.sessions.restore();
    if session.is_active() {
        println!("{}", style(format!("Welcome back, {}.", session.username)).dim());
        for message in &app.convo.restore_log() {
            print_message(message, &session.username);
        }
    }

    'outer: loop {
        if !app.sessions.is_active() {
            welcome(app).await?;
        }

        println!("{}", style("Commands: /reset, /new, /quit").dim());
        let username = app.sessions.snapshot().username;

        loop {
            let line: String = Input::new()
                .with_prompt(style(username.as_str()).bold().blue().to_string())
                .allow_empty(true)
                .interact_text()?;

            match line.trim() {
                "" => continue,
                "/quit" | "/exit" => break 'outer,
                "/new" => {
                    app.sessions.end_session()?;
                    app.convo.clear_log();
                    println!("{}", style("Session cleared.").dim());
                    continue 'outer;
                }
                "/reset" => {
                    let bar = spinner("Resetting chat...");
                    match app.sessions.reset_session().await {
                        Ok(greeting) => {
                            bar.finish_and_clear();
                            app.convo.replace_log_with_greeting(&greeting)?;
                            print_bot(&greeting);
                        }
                        Err(e) => {
                            bar.finish_and_clear();
                            print_error(&e);
                        }
                    }
                }
                text => {
                    let bar = spinner("Thinking...");
                    match app.convo.send_user_message(&app.sessions, text).await {
                        Ok(()) => {
                            bar.finish_and_clear();
                            if let Some(reply) = app
                                .convo
                                .messages()
                                .last()
                                .filter(|m| m.sender == Sender::Bot)
                            {
                                print_message(reply, &username);
                            }
                        }
                        Err(e) => {
                            bar.finish_and_clear();
                            // the user message stays in the log; the error
                            // line is the dismissable banner equivalent
                            print_error(&e);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

/// Prompt for a name until a session is established
async fn welcome(app: &App) -> Result<()> {
    println!(
        "{}",
        style("Please enter your name to begin the interview session.").dim()
    );

    loop {
        let name: String = Input::new().with_prompt("Your name").interact_text()?;
        let bar = spinner("Starting session...");
        match app.sessions.initialize(&name).await {
            Ok(greeting) => {
                bar.finish_and_clear();
                app.convo.replace_log_with_greeting(&greeting)?;
                print_bot(&greeting);
                return Ok(());
            }
            Err(e) => {
                bar.finish_and_clear();
                print_error(&e);
            }
        }
    }
}

async fn run_send(app: &App, message: &str) -> Result<()> {
    let session = app.sessions.restore();
    if !session.is_active() {
        anyhow::bail!("No active session; run `intervue chat` first");
    }
    app.convo.restore_log();

    match app.convo.send_user_message(&app.sessions, message).await {
        Ok(()) => {
            if let Some(reply) = app
                .convo
                .messages()
                .last()
                .filter(|m| m.sender == Sender::Bot)
            {
                println!("{}", reply.text);
            }
            Ok(())
        }
        Err(e) => anyhow::bail!("Failed to send message: {}", e),
    }
}

fn run_status(app: &App) {
    println!("{}", style("Intervue Status").bold().cyan());

    let session = app.sessions.restore();
    if !session.is_active() {
        println!("  Session: {}", style("none").dim());
        return;
    }

    println!("  Username: {}", session.username);
    if let Some(id) = session.session_id() {
        println!("  Session id: {}", id);
    }
    if let Some(node) = &session.current_node {
        println!("  Current node: {}", node);
    }
    println!("  Messages: {}", app.convo.restore_log().len());
}

async fn run_reset(app: &App) -> Result<()> {
    let session = app.sessions.restore();
    if !session.is_active() {
        anyhow::bail!("No active session; run `intervue chat` first");
    }

    let greeting = app.sessions.reset_session().await?;
    app.convo.replace_log_with_greeting(&greeting)?;
    println!("{}", greeting);
    Ok(())
}

fn run_logout(app: &App) -> Result<()> {
    app.sessions.restore();
    app.sessions.end_session()?;
    app.convo.clear_log();
    println!("{}", style("Session ended; local state cleared.").green());
    Ok(())
}
