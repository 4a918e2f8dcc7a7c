//! Line commands for the terminal front end
//!
//! Plain lines replace the current text; lines starting with `:` are commands.

use crate::core::features::translator::TranslationSession;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::TranslationResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Text(String),
    Translate,
    Swap,
    Auto(bool),
    From(String),
    To(String),
    Paste(String),
    Clear,
    Languages,
    Quit,
}

pub const HELP: &str = "\
Type text to translate it. Commands:
  :translate        translate the current text now
  :swap             swap source and target languages
  :auto on|off      toggle auto-translate
  :from <language>  set the source language
  :to <language>    set the target language
  :paste <text>     append text to the current text
  :clear            clear the current text
  :langs            list available languages
  :quit             exit";

pub fn parse_command(line: &str) -> AppResult<SessionCommand> {
    let Some(rest) = line.strip_prefix(':') else {
        return Ok(SessionCommand::Text(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest.trim(), ""),
    };

    let require_arg = |what: &str| -> AppResult<String> {
        if arg.is_empty() {
            Err(AppError::Validation(format!(":{} needs {}", name, what)))
        } else {
            Ok(arg.to_string())
        }
    };

    match name {
        "translate" | "t" => Ok(SessionCommand::Translate),
        "swap" => Ok(SessionCommand::Swap),
        "auto" => match arg {
            "on" => Ok(SessionCommand::Auto(true)),
            "off" => Ok(SessionCommand::Auto(false)),
            _ => Err(AppError::Validation(":auto expects on or off".to_string())),
        },
        "from" => Ok(SessionCommand::From(require_arg("a language")?)),
        "to" => Ok(SessionCommand::To(require_arg("a language")?)),
        // Keep the pasted text verbatim after the single separating space
        "paste" => {
            let text = rest.strip_prefix("paste").unwrap_or_default();
            Ok(SessionCommand::Paste(text.strip_prefix(' ').unwrap_or(text).to_string()))
        }
        "clear" => Ok(SessionCommand::Clear),
        "langs" => Ok(SessionCommand::Languages),
        "quit" | "q" => Ok(SessionCommand::Quit),
        other => Err(AppError::Validation(format!("Unknown command: :{}", other))),
    }
}

pub fn format_result(result: &TranslationResult) -> String {
    match result.error_kind {
        Some(kind) => format!("[{:?}, {:?}] {}", result.origin, kind, result.text),
        None => format!("[{:?}] {}", result.origin, result.text),
    }
}

/// Apply a command to the session. Returns whatever should be printed, if anything.
pub async fn execute(session: &mut TranslationSession, command: SessionCommand) -> Option<String> {
    match command {
        SessionCommand::Text(text) => {
            session.on_text_changed(&text);
            None
        }
        SessionCommand::Translate => Some(format_result(&session.translate_current().await)),
        SessionCommand::Swap => {
            let (source, target) = session.swap_languages();
            Some(format!("{} -> {}", source, target))
        }
        SessionCommand::Auto(enabled) => {
            session.set_auto_translate(enabled);
            Some(format!("Auto-translate {}", if enabled { "on" } else { "off" }))
        }
        SessionCommand::From(name) => {
            session.set_source_language(&name);
            let (source, target) = session.selected_languages();
            Some(format!("{} -> {}", source, target))
        }
        SessionCommand::To(name) => {
            session.set_target_language(&name);
            let (source, target) = session.selected_languages();
            Some(format!("{} -> {}", source, target))
        }
        SessionCommand::Paste(text) => {
            session.paste_text(&text);
            None
        }
        SessionCommand::Clear => {
            session.clear();
            None
        }
        SessionCommand::Languages => Some(session.language_names().join(", ")),
        SessionCommand::Quit => None,
    }
}
