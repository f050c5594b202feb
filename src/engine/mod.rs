//! Helpline engine
//!
//! [`Helpline`] owns all state of one user's visit: the contact form, its
//! errors, the submission progress, the simulated queue and the chat
//! session. User intents are plain method calls. Every delayed effect is a
//! timer on a virtual-clock [`Scheduler`]; nothing happens until the caller
//! advances time with [`Helpline::advance_to`] or [`Helpline::advance_by`].
//!
//! Observable changes are collected as [`TimedUpdate`]s and handed out by
//! [`Helpline::take_updates`].
//!
//! # Example
//!
//! ```
//! use helpline::config::Config;
//! use helpline::engine::{ChatState, Helpline, SubmitOutcome};
//! use helpline::roster::Roster;
//!
//! let mut config = Config::default();
//! config.session.seed = Some(7);
//! let mut helpline = Helpline::new(config, Roster::builtin());
//!
//! helpline.set_message("Jeg har brug for at tale med nogen");
//! assert_eq!(helpline.submit_chat(), SubmitOutcome::Accepted);
//!
//! helpline.run_until_idle();
//! assert_eq!(helpline.chat_state(), ChatState::Chatting);
//! ```

pub mod conversation;
pub mod forms;
pub mod queue;
pub mod session;

pub use conversation::{Conversation, Message, Sender};
pub use forms::{ContactForm, PreferredTime, Submission, SubmissionKind, SubmitOutcome, TimeSlot};
pub use queue::{QueueParams, QueueSimulator, QueueStatus};
pub use session::{ChatSession, ChatState};

use crate::config::Config;
use crate::roster::{Counselor, Mood, Roster};
use crate::scheduler::{Fired, Scheduler, TimerId};
use crate::validation::{self, Field, FormErrors};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;

/// Timer payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The submitting delay elapsed
    SubmissionComplete(SubmissionKind),
    /// Periodic queue decay step
    QueueTick,
    /// The queue drained and the settle delay elapsed
    QueueSettled,
    /// Hard cap on the queue duration
    QueueDeadline,
    /// The counselor joined
    Connected,
}

/// An observable change of engine state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Update {
    /// A submission was accepted and completed
    Submitted { kind: SubmissionKind },
    /// New displayed queue values
    Queue { status: QueueStatus },
    /// The chat session changed state
    State { state: ChatState },
    /// A counselor was picked for the session
    CounselorAssigned { counselor: Counselor },
    /// A message was appended to the conversation
    Message { message: Message },
}

/// An [`Update`] stamped with the virtual time it happened at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedUpdate {
    #[serde(rename = "at_ms", serialize_with = "serialize_millis")]
    pub at: Duration,
    #[serde(flatten)]
    pub update: Update,
}

fn serialize_millis<S: serde::Serializer>(at: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(at.as_millis() as u64)
}

/// Serializable view of the whole engine state
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub now_ms: u64,
    pub chat_state: ChatState,
    pub submission: Submission,
    pub form: ContactForm,
    /// Nickname, or the default name when none was given
    pub display_name: String,
    pub errors: FormErrors,
    pub queue: Option<QueueStatus>,
    pub counselor: Option<Counselor>,
    pub messages: Vec<Message>,
    pub mood: Option<Mood>,
    pub tip: String,
}

/// How the queue finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Drained,
    Deadline,
}

/// Timers and decay state of the running queue
#[derive(Debug)]
struct QueueRun {
    simulator: QueueSimulator,
    tick: TimerId,
    deadline: TimerId,
    settle: Option<TimerId>,
    completed: bool,
}

/// The helpline engine
#[derive(Debug)]
pub struct Helpline {
    config: Config,
    roster: Roster,
    rng: StdRng,
    scheduler: Scheduler<Event>,
    epoch: DateTime<Utc>,
    form: ContactForm,
    errors: FormErrors,
    submission: Submission,
    queue: Option<QueueRun>,
    session: Option<ChatSession>,
    mood: Option<Mood>,
    tip: String,
    updates: Vec<TimedUpdate>,
    disposed: bool,
}

impl Helpline {
    /// Create an engine
    ///
    /// The random source is seeded from `config.session.seed` when set and
    /// from the operating system otherwise. A tip is drawn right away.
    pub fn new(config: Config, roster: Roster) -> Self {
        let rng = match config.session.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, roster, rng)
    }

    /// Create an engine with an explicit random source
    pub fn with_rng(config: Config, roster: Roster, mut rng: StdRng) -> Self {
        let tip = roster.pick_tip(&mut rng).to_string();
        tracing::debug!(
            counselors = roster.counselors.len(),
            seeded = config.session.seed.is_some(),
            "Helpline engine created"
        );
        Self {
            config,
            roster,
            rng,
            scheduler: Scheduler::new(),
            epoch: Utc::now(),
            form: ContactForm::default(),
            errors: FormErrors::new(),
            submission: Submission::default(),
            queue: None,
            session: None,
            mood: None,
            tip,
            updates: Vec::new(),
            disposed: false,
        }
    }

    /// Wall-clock time that virtual time zero maps to
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn submission(&self) -> Submission {
        self.submission
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    pub fn mood(&self) -> Option<&Mood> {
        self.mood.as_ref()
    }

    /// Current tip of the day
    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// True once [`Helpline::teardown`] ran
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// State of the chat session, [`ChatState::Initial`] before one exists
    pub fn chat_state(&self) -> ChatState {
        self.session
            .as_ref()
            .map_or(ChatState::Initial, ChatSession::state)
    }

    /// Displayed queue values while a chat request is queued
    pub fn queue_status(&self) -> Option<QueueStatus> {
        self.queue.as_ref().map(|run| run.simulator.status())
    }

    /// Counselor of the chat session
    pub fn counselor(&self) -> Option<&Counselor> {
        self.session.as_ref().and_then(ChatSession::counselor)
    }

    /// Messages of the chat session
    pub fn messages(&self) -> &[Message] {
        match &self.session {
            Some(session) => session.conversation().messages(),
            None => &[],
        }
    }

    /// Name the counselor greets the user with
    pub fn display_name(&self) -> &str {
        self.form.display_name(&self.config.session.default_name)
    }

    /// Capture the whole observable state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            now_ms: self.now().as_millis() as u64,
            chat_state: self.chat_state(),
            submission: self.submission,
            form: self.form.clone(),
            display_name: self.display_name().to_string(),
            errors: self.errors.clone(),
            queue: self.queue_status(),
            counselor: self.counselor().cloned(),
            messages: self.messages().to_vec(),
            mood: self.mood.clone(),
            tip: self.tip.clone(),
        }
    }

    /// Hand out the updates collected since the last call
    pub fn take_updates(&mut self) -> Vec<TimedUpdate> {
        std::mem::take(&mut self.updates)
    }

    // Field edits

    /// Edit the nickname
    pub fn set_name(&mut self, value: &str) {
        if self.disposed {
            return;
        }
        self.form.name = value.to_string();
        self.errors
            .set(Field::Name, validation::name_input_error(value));
    }

    /// Edit the chat message
    pub fn set_message(&mut self, value: &str) {
        if self.disposed {
            return;
        }
        self.form.message = value.to_string();
        self.errors
            .set(Field::Message, validation::message_input_error(value));
    }

    /// Edit the phone number
    ///
    /// Input with anything but digits and whitespace is ignored and false
    /// is returned, as is any edit after teardown. Accepted input is stored formatted.
    pub fn set_phone(&mut self, input: &str) -> bool {
        if self.disposed {
            return false;
        }
        if !validation::is_phone_input(input) {
            tracing::debug!("Ignoring non-numeric phone input");
            return false;
        }
        let formatted = validation::format_phone_number(input);
        self.errors
            .set(Field::Phone, validation::phone_input_error(&formatted));
        self.form.phone = formatted;
        true
    }

    /// Choose or clear the preferred callback time
    pub fn set_preferred_time(&mut self, time: Option<PreferredTime>) {
        if self.disposed {
            return;
        }
        self.form.preferred_time = time;
        self.errors.set(
            Field::PreferredTime,
            validation::preferred_time_input_error(time.is_some()),
        );
    }

    /// Choose or clear the concrete callback slot
    pub fn set_specific_time(&mut self, slot: Option<TimeSlot>) {
        if self.disposed {
            return;
        }
        self.form.specific_time = slot;
        if slot.is_some() && self.form.preferred_time.is_some() {
            self.errors.set(Field::PreferredTime, None);
        }
    }

    /// Select a mood by label
    ///
    /// Returns false when the roster has no such mood.
    pub fn select_mood(&mut self, label: &str) -> bool {
        if self.disposed {
            return false;
        }
        match self.roster.find_mood(label) {
            Some(mood) => {
                tracing::debug!(mood = %mood.label, "Mood selected");
                self.mood = Some(mood.clone());
                true
            }
            None => false,
        }
    }

    /// Draw a new tip of the day
    ///
    /// After teardown the current tip is returned unchanged.
    pub fn new_tip(&mut self) -> &str {
        if self.disposed {
            return &self.tip;
        }
        self.tip = self.roster.pick_tip(&mut self.rng).to_string();
        &self.tip
    }

    // Submissions

    /// Request a chat
    ///
    /// Validates message and nickname. On success the request completes
    /// after the submit delay and the queue starts.
    pub fn submit_chat(&mut self) -> SubmitOutcome {
        self.submit(SubmissionKind::Chat)
    }

    /// Request a callback
    ///
    /// Validates phone, preferred time and nickname. On success the
    /// request completes after the submit delay; nothing follows.
    pub fn submit_callback(&mut self) -> SubmitOutcome {
        self.submit(SubmissionKind::Callback)
    }

    fn submit(&mut self, kind: SubmissionKind) -> SubmitOutcome {
        if self.disposed || self.submission != Submission::Editing {
            tracing::debug!(%kind, submission = ?self.submission, "Submission refused");
            return SubmitOutcome::Busy;
        }

        let errors = match kind {
            SubmissionKind::Chat => self.form.validate_chat(),
            SubmissionKind::Callback => self.form.validate_callback(),
        };
        if !errors.is_empty() {
            tracing::info!(%kind, errors = errors.len(), "Submission rejected");
            self.errors = errors.clone();
            return SubmitOutcome::Rejected(errors);
        }

        self.errors.clear();
        self.submission = Submission::Submitting(kind);
        let delay = self.config.timing.submit_delay();
        self.scheduler
            .schedule_after(delay, Event::SubmissionComplete(kind));
        tracing::info!(%kind, "Submission accepted");
        SubmitOutcome::Accepted
    }

    /// Withdraw a submitted callback request
    ///
    /// Clears the phone number and the chosen time; nickname, message and
    /// mood are kept. Returns false unless a callback was submitted.
    pub fn cancel_callback(&mut self) -> bool {
        if self.disposed || self.submission != Submission::Submitted(SubmissionKind::Callback) {
            return false;
        }
        self.submission = Submission::Editing;
        self.form.reset_callback();
        self.errors.set(Field::Phone, None);
        self.errors.set(Field::PreferredTime, None);
        tracing::info!("Callback request cancelled");
        true
    }

    // Chat

    /// Send a message to the counselor
    ///
    /// Returns the appended message, or `None` when no chat is running, the
    /// text is blank or the engine was torn down.
    pub fn send_message(&mut self, text: &str) -> Option<Message> {
        if self.disposed {
            return None;
        }
        let timestamp = self.timestamp();
        let message = self
            .session
            .as_mut()?
            .send_user_message(text, timestamp)?
            .clone();
        self.emit(Update::Message {
            message: message.clone(),
        });
        Some(message)
    }

    /// Leave a running chat
    pub fn leave_chat(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let ended = self.session.as_mut().is_some_and(ChatSession::end);
        if ended {
            self.emit(Update::State {
                state: ChatState::Ended,
            });
        }
        ended
    }

    // Time

    /// Virtual time of the next pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.disposed {
            return None;
        }
        self.scheduler.next_due()
    }

    /// Fire every timer due up to `until` and move the clock there
    ///
    /// Returns the number of timers fired.
    pub fn advance_to(&mut self, until: Duration) -> usize {
        if self.disposed {
            return 0;
        }
        let mut fired = 0;
        while let Some(timer) = self.scheduler.pop_due(until) {
            fired += 1;
            self.handle(timer);
        }
        self.scheduler.advance_to(until);
        fired
    }

    /// Advance the clock by `delta`
    pub fn advance_by(&mut self, delta: Duration) -> usize {
        let until = self.now() + delta;
        self.advance_to(until)
    }

    /// Fire timers until none is pending
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(due) = self.next_deadline() {
            fired += self.advance_to(due);
        }
        fired
    }

    /// Cancel every pending timer
    ///
    /// The engine ignores time and user intents afterwards.
    pub fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        let cancelled = self.scheduler.cancel_all();
        self.disposed = true;
        tracing::info!(cancelled, "Helpline engine torn down");
    }

    fn handle(&mut self, timer: Fired<Event>) {
        tracing::trace!(event = ?timer.event, at_ms = timer.at.as_millis() as u64, "Timer fired");
        match timer.event {
            Event::SubmissionComplete(kind) => self.complete_submission(kind),
            Event::QueueTick => self.queue_tick(),
            Event::QueueSettled => self.complete_queue(Completion::Drained),
            Event::QueueDeadline => self.complete_queue(Completion::Deadline),
            Event::Connected => self.connected(),
        }
    }

    fn complete_submission(&mut self, kind: SubmissionKind) {
        if self.submission != Submission::Submitting(kind) {
            return;
        }
        self.submission = Submission::Submitted(kind);
        tracing::info!(%kind, "Submission completed");
        self.emit(Update::Submitted { kind });

        if kind == SubmissionKind::Chat {
            self.start_queue();
        }
    }

    fn start_queue(&mut self) {
        let params = QueueParams::sample(&self.config.queue, &mut self.rng);
        let simulator = QueueSimulator::new(params, self.config.timing.queue_steps);
        let status = simulator.status();

        let tick = self
            .scheduler
            .schedule_every(self.config.timing.queue_tick(), Event::QueueTick);
        let deadline = self
            .scheduler
            .schedule_after(self.config.timing.queue_deadline(), Event::QueueDeadline);

        self.queue = Some(QueueRun {
            simulator,
            tick,
            deadline,
            settle: None,
            completed: false,
        });
        self.session = Some(ChatSession::new());

        tracing::info!(
            position = params.position,
            wait_minutes = params.wait_minutes,
            "Chat request queued"
        );
        self.emit(Update::State {
            state: ChatState::Queuing,
        });
        self.emit(Update::Queue { status });
    }

    fn queue_tick(&mut self) {
        let settle_delay = self.config.timing.queue_settle();
        let Some(run) = self.queue.as_mut() else {
            return;
        };
        if run.completed {
            return;
        }

        let status = run.simulator.tick();
        if run.simulator.is_drained() {
            self.scheduler.cancel(run.tick);
            run.settle = Some(
                self.scheduler
                    .schedule_after(settle_delay, Event::QueueSettled),
            );
            tracing::debug!("Queue drained");
        }
        self.emit(Update::Queue { status });
    }

    fn complete_queue(&mut self, completion: Completion) {
        let Some(run) = self.queue.as_mut() else {
            return;
        };
        if run.completed {
            tracing::debug!(?completion, "Queue already completed");
            return;
        }
        run.completed = true;
        self.scheduler.cancel(run.tick);
        self.scheduler.cancel(run.deadline);
        if let Some(settle) = run.settle.take() {
            self.scheduler.cancel(settle);
        }
        tracing::info!(?completion, "Queue completed");

        let Some(session) = self.session.as_mut() else {
            return;
        };
        let counselor = session
            .begin_connecting(&self.roster, &mut self.rng)
            .cloned();
        self.emit(Update::State {
            state: ChatState::Connecting,
        });
        if let Some(counselor) = counselor {
            self.emit(Update::CounselorAssigned { counselor });
        }

        self.scheduler
            .schedule_after(self.config.timing.connect_delay(), Event::Connected);
    }

    fn connected(&mut self) {
        let timestamp = self.timestamp();
        let display_name = self.display_name().to_string();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let was = session.state();
        let welcome = session.enter_chatting(&display_name, timestamp).cloned();
        let now = session.state();

        if was != now {
            self.emit(Update::State { state: now });
        } else if now == ChatState::Connecting {
            tracing::warn!("No counselor joined the chat");
        }
        if let Some(message) = welcome {
            self.emit(Update::Message { message });
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.now()).unwrap_or_else(|_| chrono::Duration::zero());
        self.epoch + offset
    }

    fn emit(&mut self, update: Update) {
        self.updates.push(TimedUpdate {
            at: self.now(),
            update,
        });
    }
}
