//! Colloquy - Terminal chat client
//!
//! Main entry point for the Colloquy chat client.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use colloquy::cli::{AuthCommand, Cli, Commands, SessionCommand, SettingsCommand};
use colloquy::commands;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // If the user supplied a data directory on the CLI, mirror it into
    // COLLOQUY_DATA_DIR so the storage initializer picks it up.
    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var("COLLOQUY_DATA_DIR", data_dir);
        tracing::info!("Using data directory override from CLI: {}", data_dir);
    }

    // Execute command
    match cli.command {
        Commands::Chat { session, model } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(s) = &session {
                tracing::debug!("Resuming session: {}", s);
            }
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            commands::chat::run_chat(session, model).await
        }
        Commands::Sessions { command } => match command {
            SessionCommand::List { json } => commands::sessions::list_sessions(json).await,
            SessionCommand::Delete { id } => commands::sessions::delete_session(&id).await,
            SessionCommand::Clear { yes } => commands::sessions::clear_sessions(yes).await,
        },
        Commands::Auth { command } => match command {
            AuthCommand::Set { key } => commands::auth::set_credential(key).await,
            AuthCommand::Remove => commands::auth::remove_credential().await,
            AuthCommand::Show => commands::auth::show_credential().await,
        },
        Commands::Settings { command } => match command {
            SettingsCommand::Show => commands::settings::show_settings().await,
            SettingsCommand::Set {
                model,
                temperature,
                max_tokens,
                top_p,
            } => commands::settings::set_settings(model, temperature, max_tokens, top_p).await,
            SettingsCommand::Models => commands::settings::list_models().await,
        },
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "colloquy=debug"
    } else {
        "colloquy=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
