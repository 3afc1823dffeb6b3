//! Timers: the scheduling port, the dwell timer built on it, and a virtual
//! timer queue for hosts that keep their own clock.
//!
//! Timers never call back into the engine. When one fires the host sends a
//! `timer_fired` event carrying the handle, and the engine claims it with
//! [`Scheduler::take_fired`]. A handle that was canceled or already claimed
//! claims nothing, which makes late or duplicate firings harmless.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::types::feed::{FeedItemId, TimerHandle, TimerKind};

/// Host timer facility.
pub trait Scheduler {
    /// Schedules a one-shot timer.
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle;
    /// Cancels a timer that has not been claimed yet.
    fn cancel(&mut self, handle: TimerHandle);
    /// Claims a fired timer, returning what it was for.
    fn take_fired(&mut self, handle: TimerHandle) -> Option<TimerKind>;
}

/// Fixed-duration dwell timer.
#[derive(Debug, Clone, Copy)]
pub struct DwellTimer {
    duration: Duration,
}

impl DwellTimer {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn start<T: Scheduler + ?Sized>(&self, scheduler: &mut T, item_id: &FeedItemId) -> TimerHandle {
        scheduler.schedule(
            self.duration,
            TimerKind::Dwell {
                item_id: item_id.clone(),
            },
        )
    }

    pub fn cancel<T: Scheduler + ?Sized>(&self, scheduler: &mut T, handle: TimerHandle) {
        scheduler.cancel(handle);
    }
}

impl Default for DwellTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[derive(Debug, Clone)]
struct PendingTimer {
    due_ms: u64,
    kind: TimerKind,
}

/// Timer bookkeeping against a virtual millisecond clock.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now_ms: u64,
    next_handle: u64,
    pending: BTreeMap<TimerHandle, PendingTimer>,
    fired: BTreeMap<TimerHandle, TimerKind>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        let due_ms = self.now_ms.saturating_add(delay.as_millis() as u64);
        self.pending.insert(handle, PendingTimer { due_ms, kind });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) {
        self.pending.remove(&handle);
        self.fired.remove(&handle);
    }

    /// Claims a timer whether the virtual clock reached it or the host fired it.
    pub fn take_fired(&mut self, handle: TimerHandle) -> Option<TimerKind> {
        if let Some(kind) = self.fired.remove(&handle) {
            return Some(kind);
        }
        self.pending.remove(&handle).map(|timer| timer.kind)
    }

    /// Fires the earliest timer due at or before `until_ms`, moving the clock to it.
    ///
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerHandle> {
        let handle = self
            .pending
            .iter()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(handle, timer)| (timer.due_ms, **handle))
            .map(|(handle, _)| *handle)?;
        let timer = self.pending.remove(&handle)?;
        self.now_ms = self.now_ms.max(timer.due_ms);
        self.fired.insert(handle, timer.kind);
        Some(handle)
    }

    /// Moves the clock forward without firing anything.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Kinds of all timers not yet fired, in handle order.
    pub fn pending_kinds(&self) -> Vec<&TimerKind> {
        self.pending.values().map(|timer| &timer.kind).collect()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration, kind: TimerKind) -> TimerHandle {
        TimerQueue::schedule(self, delay, kind)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        TimerQueue::cancel(self, handle)
    }

    fn take_fired(&mut self, handle: TimerHandle) -> Option<TimerKind> {
        TimerQueue::take_fired(self, handle)
    }
}
