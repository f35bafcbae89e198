use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Which of the engine's timers a token belongs to. Each role has a single slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerRole {
    /// Wait between two erosion cycles.
    Cycle,
    /// Flashing window before selected cells are removed.
    Flash,
    /// Grace period before the path itself erodes.
    FinalWarning,
}

impl TimerRole {
    pub const COUNT: usize = 3;

    pub const fn slot(self) -> usize {
        match self {
            Self::Cycle => 0,
            Self::Flash => 1,
            Self::FinalWarning => 2,
        }
    }
}

/// One arming of a timer. A fire only counts when its token is still the armed one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken {
    pub role: TimerRole,
    pub generation: u64,
}

/// Host side of the engine's timers.
///
/// When `delay` elapses after `arm`, the host hands the token back through
/// [`ErosionEngine::fire`](crate::ErosionEngine::fire). Cancelled tokens should not be handed
/// back, but the engine ignores them if they are.
pub trait Scheduler {
    fn arm(&mut self, timer: TimerToken, delay: Duration);

    fn cancel(&mut self, timer: TimerToken);
}

/// Deterministic virtual clock, nothing happens until the owner advances it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManualScheduler {
    now: Duration,
    pending: Vec<(Duration, TimerToken)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> impl Iterator<Item = &(Duration, TimerToken)> {
        self.pending.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, role: TimerRole) -> bool {
        self.pending.iter().any(|(_, timer)| timer.role == role)
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|(due, _)| *due).min()
    }

    /// Removes the earliest timer due at or before `until` and moves the clock to its deadline.
    /// Timers with the same deadline come out in arming order.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerToken> {
        let (index, &(due, timer)) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (due, _))| *due <= until)
            .min_by_key(|(index, (due, _))| (*due, *index))?;
        self.pending.remove(index);
        self.now = self.now.max(due);
        Some(timer)
    }

    /// Moves the clock forward without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, timer: TimerToken, delay: Duration) {
        self.pending.push((self.now.saturating_add(delay), timer));
    }

    fn cancel(&mut self, timer: TimerToken) {
        self.pending.retain(|(_, pending)| *pending != timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(role: TimerRole, generation: u64) -> TimerToken {
        TimerToken { role, generation }
    }

    #[test]
    fn pops_in_deadline_then_arming_order() {
        let mut scheduler = ManualScheduler::new();
        scheduler.arm(token(TimerRole::Cycle, 1), Duration::from_secs(10));
        scheduler.arm(token(TimerRole::Flash, 2), Duration::from_secs(3));
        scheduler.arm(token(TimerRole::FinalWarning, 3), Duration::from_secs(3));

        assert_eq!(scheduler.next_due(), Some(Duration::from_secs(3)));
        assert_eq!(scheduler.pop_due(Duration::from_secs(2)), None);
        assert_eq!(
            scheduler.pop_due(Duration::from_secs(20)),
            Some(token(TimerRole::Flash, 2))
        );
        assert_eq!(scheduler.now(), Duration::from_secs(3));
        assert_eq!(
            scheduler.pop_due(Duration::from_secs(20)),
            Some(token(TimerRole::FinalWarning, 3))
        );
        assert_eq!(
            scheduler.pop_due(Duration::from_secs(20)),
            Some(token(TimerRole::Cycle, 1))
        );
        assert_eq!(scheduler.now(), Duration::from_secs(10));
        assert_eq!(scheduler.pop_due(Duration::from_secs(20)), None);
    }

    #[test]
    fn arming_is_relative_to_the_clock() {
        let mut scheduler = ManualScheduler::new();
        scheduler.advance_to(Duration::from_secs(5));
        scheduler.arm(token(TimerRole::Cycle, 1), Duration::from_secs(10));

        assert_eq!(scheduler.next_due(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn cancel_only_drops_the_matching_token() {
        let mut scheduler = ManualScheduler::new();
        scheduler.arm(token(TimerRole::Cycle, 1), Duration::from_secs(1));
        scheduler.arm(token(TimerRole::Cycle, 2), Duration::from_secs(1));

        scheduler.cancel(token(TimerRole::Cycle, 1));

        assert_eq!(scheduler.pending_count(), 1);
        assert!(scheduler.is_pending(TimerRole::Cycle));
        assert!(!scheduler.is_pending(TimerRole::Flash));
    }
}
