pub mod commands;
pub mod core;
pub mod shared;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{execute, format_result, parse_command, SessionCommand, HELP};
use crate::core::features::translator::TranslationSession;
use crate::shared::error::AppResult;
use crate::shared::events::SessionEvent;
use crate::shared::settings::AppSettings;

pub use crate::core::features::translator::swap;
pub use crate::shared::types::{Origin, TranslationRequest, TranslationResult};

fn init_tracing() {
    // Logs go to stderr so translations on stdout stay readable
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translator_session_lib=info".into()),
        )
        .try_init();
}

/// Run the terminal front end until stdin closes or `:quit` is entered.
pub async fn run() -> AppResult<()> {
    init_tracing();

    let settings = AppSettings::load_or_default().await;
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = TranslationSession::from_settings(&settings, events_tx).await?;

    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match event {
                SessionEvent::Translated(result) => println!("{}", format_result(&result)),
                SessionEvent::UnsupportedLanguage { source_code, target_code } => {
                    println!("! {} -> {} is not supported, pick another language pair", source_code, target_code);
                }
            }
        }
    });

    println!("{}", HELP);
    let (source, target) = session.selected_languages();
    println!(
        "{} -> {} (auto-translate {})",
        source,
        target,
        if session.is_auto_translate() { "on" } else { "off" }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => {
                if let Some(output) = execute(&mut session, command).await {
                    println!("{}", output);
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    // Dropping the session stops the scheduler, which closes the event channel
    session.shutdown();
    drop(session);
    let _ = printer.await;
    info!("Translator session closed");
    Ok(())
}
