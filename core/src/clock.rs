use core::time::Duration;

/// Single-slot timer running on virtual time supplied by the host.
///
/// At most one tick is ever pending: arming replaces whatever was pending before. The host feeds wall-clock progress through [`GameClock::advance`] and drains due ticks
/// with [`GameClock::take_due`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameClock {
    now: Duration,
    due: Option<Duration>,
}

impl GameClock {
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
            due: None,
        }
    }

    /// Resets virtual time and arms the first tick after `delay`.
    pub fn start(&mut self, delay: Duration) {
        self.now = Duration::ZERO;
        self.due = Some(delay);
    }

    /// Arms a tick `delay` from now, cancelling any pending one.
    pub fn schedule(&mut self, delay: Duration) {
        self.schedule_at(self.now.saturating_add(delay));
    }

    /// Arms a tick at an absolute virtual instant, cancelling any pending one.
    pub fn schedule_at(&mut self, at: Duration) {
        self.due = Some(at);
    }

    pub fn stop(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// How long the host may wait before the pending tick becomes due.
    pub fn time_until_due(&self) -> Option<Duration> {
        self.due.map(|due| due.saturating_sub(self.now))
    }

    pub fn advance(&mut self, elapsed: Duration) {
        self.now = self.now.saturating_add(elapsed);
    }

    /// Pops the pending tick if it is due, returning the instant it was scheduled for.
    pub fn take_due(&mut self) -> Option<Duration> {
        match self.due {
            Some(due) if due <= self.now => {
                self.due = None;
                Some(due)
            }
            _ => None,
        }
    }
}
