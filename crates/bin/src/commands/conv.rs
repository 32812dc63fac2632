//! Conversation commands: the conversation list and thread view.

use std::io::{BufRead, Write};
use std::sync::Arc;

use spamscope::constants::REPLY_ERROR_PLACEHOLDER;
use spamscope::conversation::{AlwaysConfirm, Confirm};
use spamscope::{Conversation, ConversationSession, Settings, SystemClock, format_millis};

use crate::backend::{classifier, open_store};
use crate::cli::ConvCommand;
use crate::output::{OutputFormat, print_json, print_table, truncate};

/// Asks on the terminal; anything but "y" or "yes" declines.
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

async fn open_session(
    settings: &Settings,
) -> Result<ConversationSession, Box<dyn std::error::Error>> {
    let store = open_store(settings).await?;
    Ok(ConversationSession::open(store, Arc::new(SystemClock)).await?)
}

fn print_summary(
    conversation: &Conversation,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => println!("{}  {}", conversation.id, conversation.title),
        OutputFormat::Json => print_json(conversation)?,
    }
    Ok(())
}

fn print_thread(
    conversation: &Conversation,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if format == OutputFormat::Json {
        return print_json(conversation);
    }
    println!("{} ({})", conversation.title, conversation.id);
    if conversation.messages.is_empty() {
        println!("No messages.");
        return Ok(());
    }
    for message in &conversation.messages {
        println!();
        let at = format_millis(message.timestamp);
        match &message.title {
            Some(title) => println!("[{}] {at} - {title}", message.sender),
            None => println!("[{}] {at}", message.sender),
        }
        println!("{}", message.text);
    }
    Ok(())
}

/// Run a `conv` subcommand
pub async fn run(
    command: &ConvCommand,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(settings).await?;

    match command {
        ConvCommand::List => match format {
            OutputFormat::Human => {
                if session.conversations().is_empty() {
                    println!("No conversations yet.");
                    return Ok(());
                }
                let rows: Vec<Vec<String>> = session
                    .conversations()
                    .iter()
                    .map(|c| {
                        let last = c
                            .messages
                            .last()
                            .map(|m| format_millis(m.timestamp))
                            .unwrap_or_default();
                        vec![
                            c.id.clone(),
                            truncate(&c.title, 40),
                            c.messages.len().to_string(),
                            last,
                        ]
                    })
                    .collect();
                print_table(&["ID", "TITLE", "MESSAGES", "LAST"], &rows);
            }
            OutputFormat::Json => print_json(session.conversations())?,
        },
        ConvCommand::New { title } => {
            let mut created = session.create().await?;
            if let Some(title) = title {
                session.set_edited_title(title.clone());
                created.title = session.rename(&created.id).await?;
            }
            print_summary(&created, format)?;
        }
        ConvCommand::Show { id } => {
            session.select(id)?;
            if let Some(conversation) = session.selected() {
                print_thread(conversation, format)?;
            }
        }
        ConvCommand::Rename { id, title } => {
            session.begin_rename(id)?;
            session.set_edited_title(title.clone());
            session.rename(id).await?;
            session.select(id)?;
            if let Some(conversation) = session.selected() {
                print_summary(conversation, format)?;
            }
        }
        ConvCommand::Delete { id, yes } => {
            let confirm: &dyn Confirm = if *yes { &AlwaysConfirm } else { &TerminalConfirm };
            let deleted = session.delete(id, confirm).await?;
            match format {
                OutputFormat::Human if deleted => println!("Deleted {id}"),
                OutputFormat::Human => println!("Kept {id}"),
                OutputFormat::Json => {
                    print_json(&serde_json::json!({ "id": id, "deleted": deleted }))?
                }
            }
        }
        ConvCommand::Add { id, from, text } => {
            session.select(id)?;
            match session.add_message((*from).into(), text).await? {
                Some(message) => match format {
                    OutputFormat::Human => println!("Added message {}", message.id),
                    OutputFormat::Json => print_json(&message)?,
                },
                None => {
                    eprintln!("Nothing to add: message text is blank");
                    std::process::exit(1);
                }
            }
        }
        ConvCommand::Reply { id, prompt, append } => {
            session.select(id)?;
            if let Some(prompt) = prompt {
                session.set_scammer_draft(prompt.clone());
            }
            let api = classifier(settings)?;
            let Some(reply) = session.generate_reply(&api).await else {
                eprintln!("Nothing to reply to: no scammer message in {id}");
                std::process::exit(1);
            };
            let stored = if *append && reply != REPLY_ERROR_PLACEHOLDER {
                session.submit_reply().await?
            } else {
                None
            };
            match format {
                OutputFormat::Human => println!("{reply}"),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "reply": reply,
                    "message": stored,
                }))?,
            }
        }
    }

    Ok(())
}
