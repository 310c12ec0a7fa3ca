use crate::{EventQueue, Timestamp};
use std::time::Duration;

/// Single-threaded virtual-time event scheduler.
///
/// The scheduler owns "now" and the configured stop time. Events are armed
/// either one-shot ([`schedule_in`]) or periodic ([`schedule_periodic`]);
/// a periodic arming is re-armed by the scheduler itself each time it fires,
/// replacing the self-rescheduling-callback pattern with something that can
/// be inspected and tested.
///
/// [`next`] advances "now" to the popped event's timestamp. Once the next
/// queued event would fire at or after the stop time the run is over:
/// `next` returns `None` and whatever is still queued is never executed —
/// there is no drain or flush step.
///
/// [`schedule_in`]: Scheduler::schedule_in
/// [`schedule_periodic`]: Scheduler::schedule_periodic
/// [`next`]: Scheduler::next
pub struct Scheduler<T> {
    now: Timestamp,
    stop_at: Timestamp,
    queue: EventQueue<Arming<T>>,
}

enum Arming<T> {
    Once(T),
    Every { every: Duration, event: T },
}

impl<T: Clone> Scheduler<T> {
    /// Create a scheduler that stops once virtual time reaches `run_for`.
    pub fn new(run_for: Duration) -> Self {
        Self {
            now: Timestamp::ZERO,
            stop_at: Timestamp::ZERO + run_for,
            queue: EventQueue::new(),
        }
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// The virtual time at which the run stops.
    #[inline]
    pub fn stop_time(&self) -> Timestamp {
        self.stop_at
    }

    /// Number of armed events still queued.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Arm `event` to fire once, `delta` after the current virtual time.
    pub fn schedule_in(&mut self, delta: Duration, event: T) {
        self.queue.push(self.now + delta, Arming::Once(event));
    }

    /// Arm `event` to fire first at `first_in` after the current virtual
    /// time, then again every `every`, until the stop time is reached.
    pub fn schedule_periodic(&mut self, first_in: Duration, every: Duration, event: T) {
        self.queue
            .push(self.now + first_in, Arming::Every { every, event });
    }

    /// Pop the next event and advance virtual time to its timestamp.
    ///
    /// Returns `None` once the next event would fire at or after the stop
    /// time; the remaining queue content is left untouched and never runs.
    pub fn next(&mut self) -> Option<(Timestamp, T)> {
        let at = self.queue.next_event_time()?;
        if at >= self.stop_at {
            return None;
        }
        let (at, arming) = self
            .queue
            .pop()
            .expect("we just peeked the queue, so a pop should always work");
        self.now = at;
        let event = match arming {
            Arming::Once(event) => event,
            Arming::Every { every, event } => {
                self.queue.push(
                    at + every,
                    Arming::Every {
                        every,
                        event: event.clone(),
                    },
                );
                event
            }
        };
        Some((at, event))
    }
}
