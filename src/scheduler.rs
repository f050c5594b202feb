//! Virtual-clock timer queue
//!
//! Every delayed action in the engine is a timer registered here. The
//! scheduler never sleeps: callers advance virtual time explicitly and pop
//! the timers that became due. Tests run a full session instantly, while the
//! interactive CLI maps virtual time onto the wall clock.
//!
//! Timers due at the same instant fire in registration order. A periodic
//! timer keeps its original registration order each time it is re-armed.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle to a registered timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// A timer that became due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<E> {
    pub id: TimerId,
    /// Virtual time the timer was due at
    pub at: Duration,
    pub event: E,
}

#[derive(Debug)]
struct Timer<E> {
    event: E,
    period: Option<Duration>,
}

/// Timer queue driven by an explicit virtual clock
#[derive(Debug)]
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), Timer<E>>,
    due_at: HashMap<TimerId, Duration>,
}

impl<E: Clone> Scheduler<E> {
    /// Create an empty scheduler at virtual time zero
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            due_at: HashMap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Register a one-shot timer firing `delay` from now
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use helpline::scheduler::Scheduler;
    ///
    /// let mut scheduler = Scheduler::new();
    /// scheduler.schedule_after(Duration::from_secs(2), "connected");
    ///
    /// assert!(scheduler.pop_due(Duration::from_secs(1)).is_none());
    /// let fired = scheduler.pop_due(Duration::from_secs(5)).unwrap();
    /// assert_eq!(fired.event, "connected");
    /// assert_eq!(scheduler.now(), Duration::from_secs(2));
    /// ```
    pub fn schedule_after(&mut self, delay: Duration, event: E) -> TimerId {
        self.insert(delay, event, None)
    }

    /// Register a periodic timer first firing `period` from now
    ///
    /// A zero period would never let time advance, so it is clamped to one
    /// millisecond.
    pub fn schedule_every(&mut self, period: Duration, event: E) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(period, event, Some(period))
    }

    fn insert(&mut self, delay: Duration, event: E, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay;
        self.queue.insert((due, id), Timer { event, period });
        self.due_at.insert(id, due);
        tracing::trace!(timer = id.0, due_ms = due.as_millis() as u64, "Timer scheduled");
        id
    }

    /// Cancel a timer
    ///
    /// Returns false when the timer already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_at.remove(&id) {
            Some(due) => {
                self.queue.remove(&(due, id));
                tracing::trace!(timer = id.0, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were pending
    pub fn cancel_all(&mut self) -> usize {
        let pending = self.queue.len();
        self.queue.clear();
        self.due_at.clear();
        pending
    }

    /// True while the timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.due_at.contains_key(&id)
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// True when no timer is pending
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Virtual time of the earliest pending timer
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until`
    ///
    /// The clock moves forward to the timer's due time. Periodic timers are
    /// re-armed one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<E>> {
        let (due, id) = *self.queue.keys().next()?;
        if due > until {
            return None;
        }

        let timer = self.queue.remove(&(due, id))?;
        self.now = self.now.max(due);

        match timer.period {
            Some(period) => {
                let next = due + period;
                let event = timer.event.clone();
                self.queue.insert((next, id), timer);
                self.due_at.insert(id, next);
                Some(Fired { id, at: due, event })
            }
            None => {
                self.due_at.remove(&id);
                Some(Fired {
                    id,
                    at: due,
                    event: timer.event,
                })
            }
        }
    }

    /// Move the clock forward to `until` without firing anything
    ///
    /// Call after draining [`Scheduler::pop_due`]; time never moves
    /// backwards.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
