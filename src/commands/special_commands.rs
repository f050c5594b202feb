//! Special commands parser for the interactive session
//!
//! Everything the user types is either a special command, prefixed with
//! `/`, or chat text. Special commands fill in the contact form, submit
//! requests and inspect the session:
//! - `/name`, `/message`, `/phone`, `/time`, `/slot`, `/mood` edit fields
//! - `/chat` and `/callback` submit, `/cancel` withdraws a callback
//! - `/tip`, `/status`, `/leave`, `/help` and `/exit` control the session
//!
//! Command names are case-insensitive; arguments keep their case.

use crate::engine::{PreferredTime, TimeSlot};
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Set the nickname; an empty name clears it
    SetName(String),

    /// Set the chat message
    SetMessage(String),

    /// Edit the phone number
    SetPhone(String),

    /// Choose the preferred callback time, `None` clears it
    SetTime(Option<PreferredTime>),

    /// Choose the callback time slot
    SetSlot(TimeSlot),

    /// Pick a mood by label
    SelectMood(String),

    /// List the available moods
    ListMoods,

    /// Submit the chat request
    SubmitChat,

    /// Submit the callback request
    SubmitCallback,

    /// Withdraw a submitted callback request
    CancelCallback,

    /// Draw a new tip of the day
    NewTip,

    /// Show the form, the queue and the chat state
    ShowStatus,

    /// Leave the running chat
    Leave,

    /// Display help information
    Help,

    /// Exit the session
    Exit,

    /// Not a special command (chat text)
    None,
}

/// Parse user input into a special command
///
/// Returns `SpecialCommand::None` for input that is not a command.
///
/// # Errors
///
/// Returns `CommandError` for unknown commands, missing arguments and
/// arguments that name no known option.
///
/// # Examples
///
/// ```
/// use helpline::commands::special_commands::{parse_special_command, SpecialCommand};
/// use helpline::engine::{PreferredTime, TimeSlot};
///
/// let cmd = parse_special_command("/time ASAP").unwrap();
/// assert_eq!(cmd, SpecialCommand::SetTime(Some(PreferredTime::Asap)));
///
/// let cmd = parse_special_command("/slot 9-12").unwrap();
/// assert_eq!(cmd, SpecialCommand::SetSlot(TimeSlot::Morning));
///
/// let cmd = parse_special_command("Hej med dig").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let (head, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (trimmed, ""),
    };
    let command = head.to_lowercase();

    match command.as_str() {
        "exit" | "quit" | "/exit" | "/quit" if rest.is_empty() => return Ok(SpecialCommand::Exit),
        _ => {}
    }

    if !command.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    match command.as_str() {
        "/name" => Ok(SpecialCommand::SetName(rest.to_string())),
        "/message" | "/msg" => {
            require(&command, rest, "/message <hvad vil du gerne tale om>")?;
            Ok(SpecialCommand::SetMessage(rest.to_string()))
        }
        "/phone" => {
            require(&command, rest, "/phone <8 cifre>")?;
            Ok(SpecialCommand::SetPhone(rest.to_string()))
        }
        "/time" => {
            if rest.is_empty() {
                return Ok(SpecialCommand::SetTime(None));
            }
            PreferredTime::parse_str(rest)
                .map(|time| SpecialCommand::SetTime(Some(time)))
                .map_err(|_| unsupported(&command, rest))
        }
        "/slot" => {
            require(&command, rest, "/slot <9-12|12-15|15-18|18-21>")?;
            TimeSlot::parse_str(rest)
                .map(SpecialCommand::SetSlot)
                .map_err(|_| unsupported(&command, rest))
        }
        "/mood" => {
            if rest.is_empty() {
                Ok(SpecialCommand::ListMoods)
            } else {
                Ok(SpecialCommand::SelectMood(rest.to_string()))
            }
        }
        "/moods" => Ok(SpecialCommand::ListMoods),
        "/chat" => no_argument(&command, rest, SpecialCommand::SubmitChat),
        "/callback" => no_argument(&command, rest, SpecialCommand::SubmitCallback),
        "/cancel" => no_argument(&command, rest, SpecialCommand::CancelCallback),
        "/tip" => no_argument(&command, rest, SpecialCommand::NewTip),
        "/status" => no_argument(&command, rest, SpecialCommand::ShowStatus),
        "/leave" => no_argument(&command, rest, SpecialCommand::Leave),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        _ => Err(CommandError::UnknownCommand(head.to_string())),
    }
}

fn require(command: &str, rest: &str, usage: &str) -> Result<(), CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(())
    }
}

fn no_argument(
    command: &str,
    rest: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(unsupported(command, rest))
    }
}

fn unsupported(command: &str, arg: &str) -> CommandError {
    CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Kommandoer
==========

DIN PROFIL:
  /name <navn>      - Vælg et kaldenavn (valgfrit, /name alene fjerner det)
  /mood [humør]     - Vælg dit humør, eller vis listen
  /moods            - Vis alle humør

START EN CHAT:
  /message <tekst>  - Hvad vil du gerne tale om? (10-500 tegn)
  /chat             - Send chatanmodningen

RING MIG OP:
  /phone <nummer>   - Dit telefonnummer (8 cifre)
  /time <tidspunkt> - asap, today, tomorrow eller specific
  /slot <interval>  - 9-12, 12-15, 15-18 eller 18-21 (ved specific)
  /callback         - Send opkaldsanmodningen
  /cancel           - Annuller opkaldet

UNDER CHATTEN:
  <tekst>           - Skriv til din rådgiver
  /leave            - Forlad chatten

ANDET:
  /tip              - Vis et nyt dagens tip
  /status           - Vis formular, kø og chat
  /help             - Vis denne hjælp
  exit              - Afslut
"#
    );
}
