//! Named periodic and one-shot tasks on a millisecond clock
//!
//! The clock only moves when the driver advances it. Suspending parks every
//! task with the time it still had to run, so a pause neither drops nor
//! restarts a partial period.

/// Every task the runtime can schedule
///
/// Declaration order breaks ties between tasks due at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskKind {
    /// One-shot: close the grace window
    ImmunityExpiry,
    /// Pre-game countdown, once per second
    Countdown,
    ElapsedSecond,
    DutyCycle,
    SoundSample,
    Reposition,
    PursuitStep,
}

#[derive(Debug, Clone)]
struct Slot {
    kind: TaskKind,
    /// Absolute while live, remaining time while suspended
    due_ms: u64,
    /// None for one-shot tasks
    period_ms: Option<u64>,
}

/// Cooperative task scheduler
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    slots: Vec<Slot>,
    suspended: Vec<Slot>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run `kind` every `period_ms`, first firing one period from now
    ///
    /// Replaces any existing schedule for the same kind.
    pub fn every(&mut self, kind: TaskKind, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.insert(Slot {
            kind,
            due_ms: self.now_ms + period_ms,
            period_ms: Some(period_ms),
        });
    }

    /// Run `kind` once after `delay_ms`
    pub fn once(&mut self, kind: TaskKind, delay_ms: u64) {
        self.insert(Slot {
            kind,
            due_ms: self.now_ms + delay_ms,
            period_ms: None,
        });
    }

    /// Cancel a task, live or suspended; returns whether it was scheduled
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let before = self.slots.len() + self.suspended.len();
        self.slots.retain(|s| s.kind != kind);
        self.suspended.retain(|s| s.kind != kind);
        self.slots.len() + self.suspended.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.slots.clear();
        self.suspended.clear();
    }

    /// Whether `kind` is live (suspended tasks do not count)
    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.slots.iter().any(|s| s.kind == kind)
    }

    pub fn is_suspended(&self, kind: TaskKind) -> bool {
        self.suspended.iter().any(|s| s.kind == kind)
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Park every live task, keeping the time each had left
    pub fn suspend(&mut self) {
        let now = self.now_ms;
        for mut slot in self.slots.drain(..) {
            slot.due_ms = slot.due_ms.saturating_sub(now);
            self.suspended.retain(|s| s.kind != slot.kind);
            self.suspended.push(slot);
        }
    }

    /// Bring suspended tasks back, due after their remaining time
    ///
    /// A live task of the same kind wins over its suspended copy. Returns the
    /// number of tasks restored.
    pub fn resume(&mut self) -> usize {
        let now = self.now_ms;
        let mut restored = 0;
        for mut slot in std::mem::take(&mut self.suspended) {
            if self.is_scheduled(slot.kind) {
                continue;
            }
            slot.due_ms += now;
            self.slots.push(slot);
            restored += 1;
        }
        restored
    }

    /// Pop the earliest task due at or before `until_ms`
    ///
    /// Moves the clock to the task's due time. Periodic tasks are re-armed
    /// before returning, so the caller may cancel them while handling.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TaskKind> {
        let idx = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= until_ms)
            .min_by_key(|(_, s)| (s.due_ms, s.kind))
            .map(|(i, _)| i)?;

        let Slot {
            kind,
            due_ms,
            period_ms,
        } = self.slots[idx].clone();
        self.now_ms = self.now_ms.max(due_ms);
        match period_ms {
            Some(period) => self.slots[idx].due_ms = due_ms + period,
            None => {
                self.slots.swap_remove(idx);
            }
        }
        Some(kind)
    }

    /// Move the clock forward once every due task has been popped
    pub fn finish(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn insert(&mut self, slot: Slot) {
        self.slots.retain(|s| s.kind != slot.kind);
        self.slots.push(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scheduler: &mut Scheduler, until: u64) -> Vec<(u64, TaskKind)> {
        let mut fired = Vec::new();
        while let Some(kind) = scheduler.pop_due(until) {
            fired.push((scheduler.now_ms(), kind));
        }
        scheduler.finish(until);
        fired
    }

    #[test]
    fn test_periodic_fires_in_order() {
        let mut s = Scheduler::new();
        s.every(TaskKind::PursuitStep, 50);
        s.every(TaskKind::ElapsedSecond, 1_000);
        let fired = drain(&mut s, 1_000);
        assert_eq!(fired.len(), 21);
        assert_eq!(fired[0], (50, TaskKind::PursuitStep));
        // Tie at 1000: ElapsedSecond is declared before PursuitStep
        assert_eq!(fired[19], (1_000, TaskKind::ElapsedSecond));
        assert_eq!(fired[20], (1_000, TaskKind::PursuitStep));
        assert_eq!(s.now_ms(), 1_000);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut s = Scheduler::new();
        s.once(TaskKind::ImmunityExpiry, 2_000);
        assert!(drain(&mut s, 1_999).is_empty());
        assert_eq!(drain(&mut s, 2_000), vec![(2_000, TaskKind::ImmunityExpiry)]);
        assert!(!s.is_scheduled(TaskKind::ImmunityExpiry));
        assert!(drain(&mut s, 10_000).is_empty());
    }

    #[test]
    fn test_cancel_mid_drain() {
        let mut s = Scheduler::new();
        s.every(TaskKind::PursuitStep, 50);
        s.every(TaskKind::Reposition, 120);
        let mut fired = Vec::new();
        while let Some(kind) = s.pop_due(1_000) {
            fired.push(kind);
            if kind == TaskKind::Reposition {
                s.cancel_all();
            }
        }
        assert_eq!(
            fired,
            vec![TaskKind::PursuitStep, TaskKind::PursuitStep, TaskKind::Reposition]
        );
        assert!(s.is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let mut s = Scheduler::new();
        s.every(TaskKind::SoundSample, 1_000);
        s.every(TaskKind::SoundSample, 300);
        assert_eq!(s.len(), 1);
        assert_eq!(drain(&mut s, 300), vec![(300, TaskKind::SoundSample)]);
    }

    #[test]
    fn test_schedules_relative_to_clock() {
        let mut s = Scheduler::new();
        s.finish(5_000);
        s.once(TaskKind::Countdown, 1_000);
        assert!(drain(&mut s, 5_999).is_empty());
        assert_eq!(drain(&mut s, 6_000).len(), 1);
    }

    #[test]
    fn test_suspend_keeps_remaining_time() {
        let mut s = Scheduler::new();
        s.every(TaskKind::ElapsedSecond, 1_000);
        s.once(TaskKind::ImmunityExpiry, 2_000);
        drain(&mut s, 1_700);
        s.suspend();
        assert!(s.is_empty());
        assert!(s.is_suspended(TaskKind::ElapsedSecond));

        // Time passes while parked
        assert!(drain(&mut s, 50_000).is_empty());
        assert_eq!(s.resume(), 2);
        assert_eq!(
            drain(&mut s, 51_000),
            vec![
                (50_300, TaskKind::ImmunityExpiry),
                (50_300, TaskKind::ElapsedSecond),
            ]
        );
        assert_eq!(drain(&mut s, 51_300), vec![(51_300, TaskKind::ElapsedSecond)]);
    }

    #[test]
    fn test_cancel_reaches_suspended_tasks() {
        let mut s = Scheduler::new();
        s.every(TaskKind::SoundSample, 1_000);
        s.every(TaskKind::DutyCycle, 10_000);
        s.suspend();
        assert!(s.cancel(TaskKind::SoundSample));
        assert!(!s.is_suspended(TaskKind::SoundSample));
        assert_eq!(s.resume(), 1);
        assert!(s.is_scheduled(TaskKind::DutyCycle));

        s.suspend();
        s.cancel_all();
        assert_eq!(s.resume(), 0);
        assert!(s.is_empty());
    }

    #[test]
    fn test_live_task_wins_over_suspended_copy() {
        let mut s = Scheduler::new();
        s.every(TaskKind::SoundSample, 1_000);
        s.suspend();
        s.finish(400);
        s.every(TaskKind::SoundSample, 250);
        assert_eq!(s.resume(), 0);
        assert_eq!(s.len(), 1);
        assert_eq!(drain(&mut s, 650), vec![(650, TaskKind::SoundSample)]);
    }

    #[test]
    fn test_zero_period_does_not_spin() {
        let mut s = Scheduler::new();
        s.every(TaskKind::PursuitStep, 0);
        assert_eq!(drain(&mut s, 10).len(), 10);
    }
}
