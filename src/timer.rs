pub use timer_key::TimerKey;
pub use timer_record::Timer;

mod timer_record {
    use std::time::{Duration, Instant};

    use super::timer_key::TimerKey;

    /// One scheduled timer: immutable identity, mutable schedule.
    ///
    /// `target_time == None` means the timer has already fired (or was never
    /// rearmed) and is inert, and the evaluator evicts such entries from the
    /// registry during the same tick's bookkeeping pass.
    #[derive(Clone, Debug)]
    pub struct Timer<K: TimerKey> {
        id: K,
        interval: Duration,
        target_time: Option<Instant>,
        repeats: bool,
    }

    impl<K: TimerKey> Timer<K> {
        pub(crate) fn new(id: K, interval: Duration, target_time: Instant, repeats: bool) -> Self {
            Self {
                id,
                interval,
                target_time: Some(target_time),
                repeats,
            }
        }
        pub(crate) fn id(&self) -> &K {
            &self.id
        }
        pub(crate) fn target_time(&self) -> Option<Instant> {
            self.target_time
        }

        /// The only place expiry and rescheduling live.
        ///
        /// Returns `true` when the timer is due at `now`. A repeating timer is
        /// rearmed to `now + interval`; a one-shot timer goes inert. Callers
        /// must invoke this at most once per tick per timer: a second call in
        /// the same tick double-advances a repeating schedule.
        pub(crate) fn check_expiry(&mut self, now: Instant) -> bool {
            let Some(target) = self.target_time else {
                return false;
            };
            if now < target {
                return false;
            }
            self.target_time = if self.repeats {
                Some(now + self.interval)
            } else {
                None
            };
            true
        }
    }
}

mod timer_key {
    use std::{fmt::Debug, hash::Hash};

    /// Trait implemented by types usable as timer ids.
    ///
    /// Ids are opaque to the scheduler: they are stored in the registry,
    /// compared for identity, and handed back to the consumer inside
    /// [`ClockEvent`](crate::ClockEvent) batches.
    ///
    /// ### Blanket implementation
    /// ```rust
    /// # use tick_clock::TimerKey;
    /// fn assert_key<K: TimerKey>() {}
    /// assert_key::<usize>();
    /// assert_key::<String>();
    /// ```
    pub trait TimerKey: Sized + Send + Sync + Clone + Hash + Eq + Debug + 'static {}

    impl<T: Send + Sync + Clone + Hash + Eq + Debug + 'static> TimerKey for T {}
}
