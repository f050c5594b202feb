/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`     : Interactive terminal session paced in real time
- `simulate` : A chat request run instantly on the virtual clock
- `callback` : A non-interactive callback request
- `roster`   : Counselor, mood and tip listings

All handlers drive the [`Helpline`](crate::engine::Helpline) engine and
render its updates with `render`.
*/

use crate::config::Config;
use crate::engine::{
    ChatState, Helpline, Sender, Snapshot, SubmissionKind, SubmitOutcome, TimedUpdate, Update,
};
use crate::error::{HelplineError, Result};
use crate::roster::{Mood, Roster};
use crate::validation::FormErrors;
use colored::Colorize;
use std::time::Duration;

// Special commands parser for the interactive session
pub mod special_commands;

/// Text rendering of engine state
pub mod render {
    use super::*;

    /// Shown with every accepted callback
    pub const CALLBACK_FOOTER: &str =
        "Du behøver ikke blive på siden - vi ringer til det nummer, du har oplyst.";

    /// Virtual time as `mm:ss`
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use helpline::commands::render::clock;
    ///
    /// assert_eq!(clock(Duration::from_millis(63_400)), "01:03");
    /// ```
    pub fn clock(at: Duration) -> String {
        let secs = at.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Plain text lines describing an update
    ///
    /// Names and confirmation texts are taken from `snapshot`.
    pub fn describe(update: &Update, snapshot: &Snapshot) -> Vec<String> {
        match update {
            Update::Submitted {
                kind: SubmissionKind::Chat,
            } => vec!["Din chatanmodning er sendt.".to_string()],
            Update::Submitted {
                kind: SubmissionKind::Callback,
            } => {
                let mut lines = vec!["Vi ringer dig op".to_string()];
                lines.extend(snapshot.form.callback_confirmation());
                lines.push(CALLBACK_FOOTER.to_string());
                lines
            }
            Update::Queue { status } => vec![status.to_string()],
            Update::State { state } => match state {
                ChatState::Initial => Vec::new(),
                ChatState::Queuing => vec![
                    "Du er i chat-køen".to_string(),
                    "Vi åbner et chat-vindue så snart en rådgiver er ledig.".to_string(),
                ],
                ChatState::Connecting => vec![
                    "Forbinder dig med en rådgiver".to_string(),
                    "Vent venligst et øjeblik...".to_string(),
                ],
                ChatState::Chatting => vec!["Du er nu i chatten.".to_string()],
                ChatState::Ended => vec!["Du har forladt chatten.".to_string()],
            },
            Update::CounselorAssigned { counselor } => {
                vec![format!("Din rådgiver er {}", counselor.name)]
            }
            Update::Message { message } => {
                let author = match message.sender() {
                    Sender::User => snapshot.display_name.as_str(),
                    Sender::Counselor => snapshot
                        .counselor
                        .as_ref()
                        .map_or("Rådgiver", |c| c.name.as_str()),
                };
                vec![format!("{}: {}", author, message.text())]
            }
        }
    }

    /// Print updates with colors
    ///
    /// Messages the user wrote are not echoed back.
    pub fn print_updates(updates: &[TimedUpdate], snapshot: &Snapshot) {
        for timed in updates {
            let lines = describe(&timed.update, snapshot);
            match &timed.update {
                Update::Message { message } if message.sender() == Sender::User => {}
                Update::Message { .. } => {
                    for line in lines {
                        println!("{}", line.green());
                    }
                }
                Update::Queue { .. } | Update::CounselorAssigned { .. } => {
                    for line in lines {
                        println!("{}", line.cyan());
                    }
                }
                Update::Submitted { .. } | Update::State { .. } => {
                    for line in lines {
                        println!("{}", line.bold());
                    }
                }
            }
        }
    }

    /// Print field errors
    pub fn print_errors(errors: &FormErrors) {
        for (field, message) in errors.iter() {
            eprintln!("{} {}", format!("{}:", field).red(), message.red());
        }
    }

    /// A mood line: icon, label in the mood's color, description
    pub fn mood_line(mood: &Mood) -> String {
        format!(
            "  {} {} {}",
            mood.icon,
            format!("{:<12}", mood.label).color(mood.color.as_str()),
            mood.description.dimmed()
        )
    }

    /// Field errors joined on one line
    pub fn join_errors(errors: &FormErrors) -> String {
        errors
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join("; ")
    }

}

// Interactive session handler
pub mod chat {
    //! Interactive session handler.
    //!
    //! A line reader thread feeds user input over a channel while the
    //! session loop waits for either input or the next engine timer. Virtual
    //! time follows the wall clock multiplied by the configured speed.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::time::Instant;
    use tokio::sync::mpsc;

    /// Input from the line reader thread
    #[derive(Debug)]
    enum Input {
        Line(String),
        Closed,
    }

    /// Whether the session continues after a line
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Flow {
        Continue,
        Exit,
    }

    /// Maps wall-clock time onto virtual time
    #[derive(Debug)]
    struct LiveClock {
        started: Instant,
        speed: f64,
    }

    impl LiveClock {
        fn new(speed: f64) -> Self {
            Self {
                started: Instant::now(),
                speed,
            }
        }

        fn virtual_now(&self) -> Duration {
            self.started.elapsed().mul_f64(self.speed)
        }

        /// Wall-clock wait until virtual time `due`
        fn wall_until(&self, due: Duration) -> Duration {
            due.saturating_sub(self.virtual_now()).div_f64(self.speed)
        }
    }

    /// Start the interactive session
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration (consumed)
    /// * `roster` - Counselors, moods and tips
    /// * `name` - Optional nickname to start with
    /// * `mood` - Optional mood label to start with
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown mood or when the terminal cannot be
    /// opened.
    pub async fn run_chat(
        config: Config,
        roster: Roster,
        name: Option<String>,
        mood: Option<String>,
    ) -> Result<()> {
        let speed = config.timing.speed;
        let mut helpline = Helpline::new(config, roster);

        if let Some(name) = name {
            helpline.set_name(&name);
        }
        if let Some(mood) = mood {
            if !helpline.select_mood(&mood) {
                return Err(HelplineError::UnknownValue {
                    kind: "mood",
                    value: mood,
                }
                .into());
            }
        }

        let mut input = spawn_reader()?;
        print_welcome_banner(&helpline);

        let clock = LiveClock::new(speed);
        tracing::info!(speed, "Interactive session started");

        loop {
            helpline.advance_to(clock.virtual_now());
            let updates = helpline.take_updates();
            if !updates.is_empty() {
                render::print_updates(&updates, &helpline.snapshot());
            }

            let wait = helpline.next_deadline().map(|due| clock.wall_until(due));
            tokio::select! {
                received = input.recv() => match received {
                    Some(Input::Line(line)) => {
                        helpline.advance_to(clock.virtual_now());
                        if handle_line(&mut helpline, &line) == Flow::Exit {
                            break;
                        }
                    }
                    Some(Input::Closed) | None => break,
                },
                _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {}
            }
        }

        helpline.teardown();
        println!("Pas godt på dig selv. Farvel!");
        Ok(())
    }

    fn spawn_reader() -> Result<mpsc::UnboundedReceiver<Input>> {
        let mut editor = DefaultEditor::new().map_err(HelplineError::from)?;
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let exit = parse_special_command(&line) == Ok(SpecialCommand::Exit);
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if tx.send(Input::Line(line)).is_err() || exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    let _ = tx.send(Input::Closed);
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    let _ = tx.send(Input::Closed);
                    break;
                }
            }
        });

        Ok(rx)
    }

    /// Apply one line of user input to the engine
    pub fn handle_line(helpline: &mut Helpline, line: &str) -> Flow {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Flow::Continue;
        }

        let command = match parse_special_command(trimmed) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e.to_string().red());
                return Flow::Continue;
            }
        };

        match command {
            SpecialCommand::SetName(name) => {
                helpline.set_name(&name);
                print_field_feedback(helpline);
            }
            SpecialCommand::SetMessage(message) => {
                helpline.set_message(&message);
                print_field_feedback(helpline);
            }
            SpecialCommand::SetPhone(phone) => {
                if helpline.set_phone(&phone) {
                    println!("Telefonnummer: {}", helpline.form().phone);
                    print_field_feedback(helpline);
                } else {
                    eprintln!("{}", "Telefonnummeret må kun indeholde cifre".yellow());
                }
            }
            SpecialCommand::SetTime(time) => {
                helpline.set_preferred_time(time);
                if let Some(time) = time {
                    println!("Tidspunkt: {}", time.label());
                }
                print_field_feedback(helpline);
            }
            SpecialCommand::SetSlot(slot) => {
                helpline.set_specific_time(Some(slot));
                println!("Tidspunkt: {}", slot.label());
            }
            SpecialCommand::SelectMood(label) => {
                if helpline.select_mood(&label) {
                    if let Some(mood) = helpline.mood() {
                        println!(
                            "Dit valgte humør: {} {}",
                            mood.icon,
                            mood.label.color(mood.color.as_str())
                        );
                    }
                } else {
                    eprintln!("{}", format!("Ukendt humør: {}", label).yellow());
                    print_moods(helpline.roster());
                }
            }
            SpecialCommand::ListMoods => print_moods(helpline.roster()),
            SpecialCommand::SubmitChat => print_outcome(helpline.submit_chat(), helpline),
            SpecialCommand::SubmitCallback => print_outcome(helpline.submit_callback(), helpline),
            SpecialCommand::CancelCallback => {
                if helpline.cancel_callback() {
                    println!("{}", "Dit opkald er annulleret.".yellow());
                } else {
                    println!("Du har ingen opkaldsanmodning at annullere.");
                }
            }
            SpecialCommand::NewTip => println!("{} {}", "Dagens tip:".bold(), helpline.new_tip()),
            SpecialCommand::ShowStatus => print_status_display(helpline),
            SpecialCommand::Leave => {
                if !helpline.leave_chat() {
                    println!("Du er ikke i en chat.");
                }
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => return Flow::Exit,
            SpecialCommand::None => {
                if helpline.chat_state() == ChatState::Chatting {
                    helpline.send_message(trimmed);
                } else {
                    println!(
                        "{}",
                        "Du er ikke i en chat endnu. Skriv /help for at se, hvordan du starter en."
                            .yellow()
                    );
                }
            }
        }
        Flow::Continue
    }

    fn print_outcome(outcome: SubmitOutcome, helpline: &Helpline) {
        match outcome {
            SubmitOutcome::Accepted => println!("{}", "Sender...".cyan()),
            SubmitOutcome::Rejected(errors) => render::print_errors(&errors),
            SubmitOutcome::Busy => {
                let text = match helpline.submission().kind() {
                    Some(SubmissionKind::Callback) => {
                        "Du har allerede bedt om et opkald. Skriv /cancel for at annullere."
                    }
                    _ => "Du har allerede sendt en anmodning.",
                };
                println!("{}", text.yellow());
            }
        }
    }

    fn print_field_feedback(helpline: &Helpline) {
        render::print_errors(helpline.errors());
    }

    fn print_moods(roster: &Roster) {
        println!("{}", "Hvordan har du det i dag?".bold());
        for mood in &roster.moods {
            println!("{}", render::mood_line(mood));
        }
    }

    fn print_welcome_banner(helpline: &Helpline) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Børnetelefonen - Velkommen!                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Du er altid 100% anonym hos os.\n");
        println!("{} {}\n", "Dagens tip:".bold(), helpline.tip());
        println!("Skriv /help for at se kommandoerne, 'exit' for at afslutte\n");
    }

    /// Show the form, the submission and the chat
    fn print_status_display(helpline: &Helpline) {
        let form = helpline.form();
        println!("\n{}", "Status".bold());
        println!("Kaldenavn:   {}", helpline.display_name());
        if let Some(mood) = helpline.mood() {
            println!("Humør:       {} {}", mood.icon, mood.label);
        }
        println!("Besked:      {}", form.message);
        println!("Telefon:     {}", form.phone);
        if let Some(time) = form.preferred_time {
            println!("Tidspunkt:   {}", time.label());
        }
        if let Some(slot) = form.specific_time {
            println!("Interval:    {}", slot.label());
        }
        println!("Anmodning:   {:?}", helpline.submission());
        println!("Chat:        {}", helpline.chat_state());
        if let Some(status) = helpline.queue_status() {
            println!("Kø:          {}", status);
        }
        if let Some(counselor) = helpline.counselor() {
            println!("Rådgiver:    {}", counselor.name);
        }
        println!("Beskeder:    {}", helpline.messages().len());
        if !helpline.errors().is_empty() {
            render::print_errors(helpline.errors());
        }
        println!();
    }

}

// Instant simulation handler
pub mod simulate {
    //! Runs a chat request to completion on the virtual clock.

    use super::*;
    use serde::Serialize;

    /// Timeline and final state of a simulated chat request
    #[derive(Debug, Clone, Serialize)]
    pub struct SimulationReport {
        pub timeline: Vec<TimedUpdate>,
        #[serde(rename = "final")]
        pub snapshot: Snapshot,
    }

    /// Submit a chat request and run every timer
    ///
    /// # Errors
    ///
    /// Returns an error when the message or nickname fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::commands::simulate::simulate_chat;
    /// use helpline::config::Config;
    /// use helpline::engine::ChatState;
    /// use helpline::roster::Roster;
    ///
    /// let report = simulate_chat(
    ///     Config::default(),
    ///     Roster::builtin(),
    ///     "Jeg har brug for at tale med nogen",
    ///     None,
    /// )
    /// .unwrap();
    /// assert_eq!(report.snapshot.chat_state, ChatState::Chatting);
    /// ```
    pub fn simulate_chat(
        config: Config,
        roster: Roster,
        message: &str,
        name: Option<&str>,
    ) -> Result<SimulationReport> {
        let mut helpline = Helpline::new(config, roster);
        if let Some(name) = name {
            helpline.set_name(name);
        }
        helpline.set_message(message);

        if let SubmitOutcome::Rejected(errors) = helpline.submit_chat() {
            return Err(anyhow::anyhow!(
                "Chat request rejected: {}",
                render::join_errors(&errors)
            ));
        }

        let fired = helpline.run_until_idle();
        tracing::debug!(fired, "Simulation finished");

        Ok(SimulationReport {
            timeline: helpline.take_updates(),
            snapshot: helpline.snapshot(),
        })
    }

    /// Run the simulation and print the timeline
    pub fn run_simulation(
        config: Config,
        roster: Roster,
        message: &str,
        name: Option<&str>,
        json: bool,
    ) -> Result<()> {
        let report = simulate_chat(config, roster, message, name)?;

        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).map_err(HelplineError::from)?
            );
            return Ok(());
        }

        for timed in &report.timeline {
            for line in render::describe(&timed.update, &report.snapshot) {
                println!("[{}] {}", render::clock(timed.at).dimmed(), line);
            }
        }
        Ok(())
    }

}

// Callback request handler
pub mod callback {
    //! Non-interactive callback requests.

    use super::*;
    use crate::engine::{PreferredTime, TimeSlot};

    /// Submit a callback request and return the confirmation lines
    ///
    /// # Errors
    ///
    /// Returns `HelplineError::UnknownValue` for an unknown time or slot,
    /// and an error listing the field errors when validation fails.
    pub fn request_callback(
        config: Config,
        roster: Roster,
        phone: &str,
        time: &str,
        slot: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<String>> {
        let time = PreferredTime::parse_str(time).map_err(|_| HelplineError::UnknownValue {
            kind: "preferred time",
            value: time.to_string(),
        })?;
        let slot = slot
            .map(|slot| {
                TimeSlot::parse_str(slot).map_err(|_| HelplineError::UnknownValue {
                    kind: "time slot",
                    value: slot.to_string(),
                })
            })
            .transpose()?;

        let mut helpline = Helpline::new(config, roster);
        if let Some(name) = name {
            helpline.set_name(name);
        }
        if !helpline.set_phone(phone) {
            tracing::debug!(phone, "Phone input ignored");
        }
        helpline.set_preferred_time(Some(time));
        helpline.set_specific_time(slot);

        if let SubmitOutcome::Rejected(errors) = helpline.submit_callback() {
            return Err(anyhow::anyhow!(
                "Callback request rejected: {}",
                render::join_errors(&errors)
            ));
        }
        helpline.run_until_idle();

        let snapshot = helpline.snapshot();
        Ok(helpline
            .take_updates()
            .iter()
            .flat_map(|timed| render::describe(&timed.update, &snapshot))
            .collect())
    }

    /// Submit a callback request and print the confirmation
    pub fn run_callback(
        config: Config,
        roster: Roster,
        phone: &str,
        time: &str,
        slot: Option<&str>,
        name: Option<&str>,
    ) -> Result<()> {
        let lines = request_callback(config, roster, phone, time, slot, name)?;
        for (index, line) in lines.iter().enumerate() {
            if index == 0 {
                println!("{}", line.bold());
            } else {
                println!("{}", line);
            }
        }
        Ok(())
    }

}

// Roster listing handlers
pub mod roster {
    //! Counselor, mood and tip listings.

    use super::*;

    /// Print counselors and moods
    pub fn list_roster(roster: &Roster) {
        println!("{}", "Rådgivere".bold());
        for counselor in &roster.counselors {
            println!(
                "  {:>3}  {:<12} {:<7} {}",
                counselor.id,
                counselor.name,
                counselor.gender,
                counselor.avatar.dimmed()
            );
        }
        println!("\n{}", "Humør".bold());
        for mood in &roster.moods {
            println!("{}", render::mood_line(mood));
        }
    }

    /// Print a tip drawn with the configured seed
    pub fn print_tip(config: Config, roster: Roster) {
        let helpline = Helpline::new(config, roster);
        println!("{} {}", "Dagens tip:".bold(), helpline.tip());
    }
}
