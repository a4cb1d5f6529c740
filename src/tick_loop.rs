use std::{sync::Arc, time::Instant};

use log::debug;

use crate::{
    registry::TimerRegistry,
    scheduler::{ClockEvent, TimerEventFn},
    timer::TimerKey,
};

pub(crate) struct TickEvaluator<K: TimerKey> {
    registry: Arc<TimerRegistry<K>>,
    event_sink: TimerEventFn<K>,
}

impl<K: TimerKey> TickEvaluator<K> {
    pub(crate) fn new(registry: Arc<TimerRegistry<K>>, event_sink: TimerEventFn<K>) -> Self {
        Self {
            registry,
            event_sink,
        }
    }

    /// One complete, synchronous evaluation pass over the registry. Each pass
    /// snapshots the registered ids, checks every live entry against `now`,
    /// queues the ids that fired, and evicts entries that went inert. The
    /// queued ids go out as a single batched event after the scan; ticks with
    /// no expirations emit nothing.
    ///
    /// Returns `true` when the registry is empty after the pass.
    pub(crate) fn run_pass(&self, now: Instant) -> bool {
        let mut fired_queue: Vec<K> = vec![];
        for id in self.registry.snapshot() {
            let checked = self
                .registry
                .with_timer_mut(&id, |timer| (timer.check_expiry(now), timer.target_time()));
            // entry removed by a caller since the snapshot was taken
            let Some((fired, target_time)) = checked else {
                continue;
            };
            if fired {
                fired_queue.push(id.clone());
            }
            if target_time.is_none() {
                self.registry.remove(&id);
            }
        }
        if !fired_queue.is_empty() {
            debug!("tick fired {} timer(s)", fired_queue.len());
            (self.event_sink)(ClockEvent::CallTimers(fired_queue));
        }
        self.registry.is_empty()
    }
}
