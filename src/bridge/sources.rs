//! Timer and socket sources for the event bridge.
//!
//! Removal is synchronous: after `remove` returns, the callback will not
//! run again, even if the source was already due. A callback may remove
//! its own source; firing takes the source out of the registry first and
//! only reinserts it when the callback kept it and nothing cancelled it
//! in flight.

use std::rc::Rc;
use std::time::{Duration, Instant};

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::toolkit::Toolkit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub(crate) u64);

/// Callback verdict: keep the source armed or drop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continue {
    Keep,
    Stop,
}

bitflags! {
    /// Socket readiness conditions a watch subscribes to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IoCondition: u8 {
        const READ = 1;
        const WRITE = 2;
    }
}

pub type TimerCallback = dyn Fn(&mut Toolkit) -> Continue;
pub type WatchCallback = dyn Fn(&mut Toolkit, IoCondition) -> Continue;

struct TimerSource {
    interval: Duration,
    deadline: Instant,
    callback: Rc<TimerCallback>,
}

struct WatchSource {
    fd: i32,
    condition: IoCondition,
    callback: Rc<WatchCallback>,
}

#[derive(Default)]
pub struct SourceRegistry {
    timers: FxHashMap<SourceId, TimerSource>,
    watches: FxHashMap<SourceId, WatchSource>,
    next_id: u64,
    /// Source currently running its callback, and whether a remove
    /// arrived while it ran.
    in_flight: Option<SourceId>,
    in_flight_removed: bool,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> SourceId {
        self.next_id += 1;
        SourceId(self.next_id)
    }

    /// Arm a repeating timer. The first firing comes one full interval
    /// from now.
    pub fn add_timer<F>(&mut self, interval: Duration, callback: F) -> SourceId
    where
        F: Fn(&mut Toolkit) -> Continue + 'static,
    {
        let id = self.next_id();
        self.timers.insert(
            id,
            TimerSource {
                interval,
                deadline: Instant::now() + interval,
                callback: Rc::new(callback),
            },
        );
        id
    }

    /// Watch a file descriptor for readiness.
    pub fn add_watch<F>(&mut self, fd: i32, condition: IoCondition, callback: F) -> SourceId
    where
        F: Fn(&mut Toolkit, IoCondition) -> Continue + 'static,
    {
        let id = self.next_id();
        self.watches.insert(
            id,
            WatchSource {
                fd,
                condition,
                callback: Rc::new(callback),
            },
        );
        id
    }

    /// Remove a source. Returns whether it existed. Removing the source
    /// whose callback is currently running suppresses its reinsertion.
    pub fn remove(&mut self, id: SourceId) -> bool {
        if self.in_flight == Some(id) {
            self.in_flight_removed = true;
            return true;
        }
        self.timers.remove(&id).is_some() || self.watches.remove(&id).is_some()
    }

    /// Earliest timer deadline, for the poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.deadline).min()
    }

    pub fn watch_fds(&self) -> Vec<(SourceId, i32, IoCondition)> {
        self.watches
            .iter()
            .map(|(id, w)| (*id, w.fd, w.condition))
            .collect()
    }

    fn due_timers(&self, now: Instant) -> Vec<SourceId> {
        let mut due: Vec<(Instant, SourceId)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .map(|(id, t)| (t.deadline, *id))
            .collect();
        due.sort();
        due.into_iter().map(|(_, id)| id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.watches.is_empty()
    }
}

/// Run every timer whose deadline has passed, as of `now`. The event
/// loop calls this each turn; tests use it to drive time by hand.
pub fn fire_due_timers(tk: &mut Toolkit, now: Instant) {
    for id in tk.sources.due_timers(now) {
        fire_timer(tk, id, now);
    }
}

/// Fire one timer: take it out, run the callback, reinsert with an
/// advanced deadline unless the callback stopped or removed it.
pub(crate) fn fire_timer(tk: &mut Toolkit, id: SourceId, now: Instant) {
    let Some(mut source) = tk.sources.timers.remove(&id) else {
        return;
    };
    tk.sources.in_flight = Some(id);
    tk.sources.in_flight_removed = false;
    let callback = source.callback.clone();
    let verdict = callback(tk);

    let removed = tk.sources.in_flight_removed;
    tk.sources.in_flight = None;
    tk.sources.in_flight_removed = false;
    if verdict == Continue::Keep && !removed {
        source.deadline = now + source.interval;
        tk.sources.timers.insert(id, source);
    }
}

/// Fire one watch for the readiness it reported.
pub(crate) fn fire_watch(tk: &mut Toolkit, id: SourceId, ready: IoCondition) {
    let Some(source) = tk.sources.watches.remove(&id) else {
        return;
    };
    tk.sources.in_flight = Some(id);
    tk.sources.in_flight_removed = false;
    let callback = source.callback.clone();
    let verdict = callback(tk, ready);

    let removed = tk.sources.in_flight_removed;
    tk.sources.in_flight = None;
    tk.sources.in_flight_removed = false;
    if verdict == Continue::Keep && !removed {
        tk.sources.watches.insert(id, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn remove_is_synchronous() {
        let mut tk = Toolkit::new();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        let id = tk
            .sources
            .add_timer(Duration::from_millis(1), move |_| {
                f.set(f.get() + 1);
                Continue::Keep
            });
        assert!(tk.sources.remove(id));
        fire_due_timers(&mut tk, Instant::now() + Duration::from_secs(1));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn keep_rearms_stop_drops() {
        let mut tk = Toolkit::new();
        let keep = tk.sources.add_timer(Duration::from_millis(1), |_| Continue::Keep);
        let stop = tk.sources.add_timer(Duration::from_millis(1), |_| Continue::Stop);
        let later = Instant::now() + Duration::from_secs(1);
        fire_due_timers(&mut tk, later);
        assert!(tk.sources.timers.contains_key(&keep));
        assert!(!tk.sources.timers.contains_key(&stop));
        // The dropped id is gone; a late manual cancel is a safe no-op.
        assert!(!tk.sources.remove(stop));
        assert!(tk.sources.timers.contains_key(&keep));
    }

    #[test]
    fn callback_may_cancel_its_own_source() {
        let mut tk = Toolkit::new();
        let slot: Rc<Cell<Option<SourceId>>> = Rc::new(Cell::new(None));
        let s = slot.clone();
        let id = tk.sources.add_timer(Duration::from_millis(1), move |tk| {
            if let Some(id) = s.get() {
                // Self-cancel while in flight; Keep must not resurrect it.
                tk.sources.remove(id);
            }
            Continue::Keep
        });
        slot.set(Some(id));
        fire_due_timers(&mut tk, Instant::now() + Duration::from_secs(1));
        assert!(tk.sources.is_empty());
    }

    #[test]
    fn next_deadline_is_earliest() {
        let mut tk = Toolkit::new();
        tk.sources.add_timer(Duration::from_secs(5), |_| Continue::Keep);
        let near = tk.sources.add_timer(Duration::from_millis(10), |_| Continue::Keep);
        let deadline = tk.sources.next_deadline().unwrap();
        assert_eq!(Some(deadline), tk.sources.timers.get(&near).map(|t| t.deadline));
    }
}
