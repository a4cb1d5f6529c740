pub use main_type::{TickClock, TickClockBuilder};
pub use timer_event::ClockEvent;
pub(crate) use timer_event::TimerEventFn;

mod main_type {
    use std::{
        sync::{Arc, Weak},
        time::{Duration, Instant},
    };

    use log::{debug, warn};

    use crate::{
        config::TickClockConfig,
        errors::TickClockError,
        registry::TimerRegistry,
        sources::{LifecycleEvent, LifecycleHub, LifecycleSink, TickSink, TickSource},
        tick_loop::TickEvaluator,
        timer::{Timer, TimerKey},
    };

    use super::{
        activation::ActivationController,
        timer_event::{ClockEvent, TimerEventFn},
    };

    pub struct TickClockBuilder<K: TimerKey> {
        timer_event_call_back: Option<TimerEventFn<K>>,
        tick_source: Option<Arc<dyn TickSource>>,
        lifecycle_hub: Option<Arc<dyn LifecycleHub>>,
        config: TickClockConfig,
    }
    impl<K: TimerKey> TickClockBuilder<K> {
        /// Sets the consumer callback. Receives one
        /// [`ClockEvent::CallTimers`] per tick with expirations, and
        /// [`ClockEvent::FireImmediately`] synchronously for degenerate
        /// zero-duration one-shot timers.
        pub fn set_timer_event(
            &mut self,
            timer_event: impl Fn(ClockEvent<K>) + Send + Sync + 'static,
        ) -> &mut Self {
            self.timer_event_call_back = Some(Arc::new(timer_event));
            self
        }
        pub fn set_tick_source(&mut self, tick_source: Arc<dyn TickSource>) -> &mut Self {
            self.tick_source = Some(tick_source);
            self
        }
        /// Optional: without a hub the scheduler never sees lifecycle
        /// signals.
        pub fn set_lifecycle_hub(&mut self, lifecycle_hub: Arc<dyn LifecycleHub>) -> &mut Self {
            self.lifecycle_hub = Some(lifecycle_hub);
            self
        }
        pub fn build(&mut self) -> Result<TickClock<K>, TickClockError> {
            let Some(event_sink) = self.timer_event_call_back.take() else {
                return Err(TickClockError::BuildErrorNoEventSink);
            };
            let Some(tick_source) = self.tick_source.take() else {
                return Err(TickClockError::BuildErrorNoTickSource);
            };
            let lifecycle_hub = self.lifecycle_hub.take();
            let config = std::mem::replace(&mut self.config, TickClockConfig::default());

            let registry = Arc::new(TimerRegistry::new());
            let core = Arc::new_cyclic(|weak: &Weak<SchedulerCore<K>>| {
                let sink: Weak<dyn TickSink> = weak.clone();
                SchedulerCore {
                    evaluator: TickEvaluator::new(registry.clone(), event_sink.clone()),
                    activation: ActivationController::new(tick_source, sink, registry.clone()),
                    registry,
                    event_sink,
                    lifecycle_hub,
                    config,
                }
            });
            if let Some(hub) = &core.lifecycle_hub {
                let sink: Arc<dyn LifecycleSink> = core.clone();
                hub.subscribe(sink);
            }
            Ok(TickClock { core })
        }
    }

    /// Frame-synchronized timer scheduler.
    ///
    /// Manages one-shot and repeating timers keyed by opaque ids and, once
    /// per tick handed in by the external [`TickSource`], reports every
    /// expired id to the consumer in a single batched [`ClockEvent`]. The
    /// scheduler only holds a tick subscription while it has live timers and
    /// the host is not suspended.
    ///
    /// Handles are cheap to clone and share one underlying scheduler.
    ///
    /// ### Example
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    /// use std::time::Duration;
    ///
    /// use tick_clock::{TickClock, TickClockConfig, TickSink, TickSource};
    ///
    /// struct FrameClock(Mutex<Option<Arc<dyn TickSink>>>);
    /// impl TickSource for FrameClock {
    ///     fn subscribe(&self, sink: Arc<dyn TickSink>) {
    ///         *self.0.lock().unwrap() = Some(sink);
    ///     }
    ///     fn unsubscribe(&self) {
    ///         *self.0.lock().unwrap() = None;
    ///     }
    /// }
    ///
    /// let frame_clock = Arc::new(FrameClock(Mutex::new(None)));
    /// let clock = TickClock::<usize>::new(TickClockConfig::default())
    ///     .set_tick_source(frame_clock.clone())
    ///     .set_timer_event(|event| println!("{event}"))
    ///     .build()
    ///     .unwrap();
    ///
    /// clock.create_timer(1, Duration::from_secs(1), 0.0, false);
    /// ```
    pub struct TickClock<K: TimerKey> {
        core: Arc<SchedulerCore<K>>,
    }
    impl<K: TimerKey> Clone for TickClock<K> {
        fn clone(&self) -> Self {
            Self {
                core: self.core.clone(),
            }
        }
    }

    impl<K: TimerKey> TickClock<K> {
        /// Creates a new [`TickClockBuilder<K>`] to configure and build a
        /// [`TickClock<K>`]. A timer event callback and a tick source are
        /// required; a lifecycle hub is optional.
        pub fn new(config: TickClockConfig) -> TickClockBuilder<K> {
            TickClockBuilder {
                timer_event_call_back: None,
                tick_source: None,
                lifecycle_hub: None,
                config,
            }
        }

        /// Registers a timer due `duration_from_now` from now, corrected by
        /// the caller's scheduling-overhead hint (seconds already spent
        /// getting the request here).
        ///
        /// A zero-duration non-repeating timer never reaches the registry:
        /// its id is handed to the consumer synchronously as
        /// [`ClockEvent::FireImmediately`].
        ///
        /// A negative `overhead_hint_secs` (caller clock skew) is logged as
        /// an anomaly but used as supplied, pushing the target past
        /// `now + duration_from_now`. A hint exceeding the duration makes the
        /// timer due on the next tick.
        ///
        /// Creating a timer under an id that is already registered silently
        /// replaces the earlier schedule.
        pub fn create_timer(
            &self,
            id: K,
            duration_from_now: Duration,
            overhead_hint_secs: f64,
            repeats: bool,
        ) {
            self.core
                .create_timer(id, duration_from_now, overhead_hint_secs, repeats);
        }

        /// Removes a timer. Unknown ids are logged and ignored; deleting
        /// twice is the same as deleting once.
        pub fn delete_timer(&self, id: &K) {
            self.core.delete_timer(id);
        }

        /// Permanent teardown: unsubscribes from the tick source and the
        /// lifecycle hub. Every later call on this scheduler is a no-op.
        /// Idempotent.
        pub fn invalidate(&self) {
            self.core.invalidate();
        }

        pub fn timer_count(&self) -> usize {
            self.core.registry.len()
        }
        pub fn is_ticking(&self) -> bool {
            self.core.activation.is_ticking()
        }
    }

    pub(super) struct SchedulerCore<K: TimerKey> {
        registry: Arc<TimerRegistry<K>>,
        activation: ActivationController<K>,
        evaluator: TickEvaluator<K>,
        event_sink: TimerEventFn<K>,
        lifecycle_hub: Option<Arc<dyn LifecycleHub>>,
        config: TickClockConfig,
    }

    impl<K: TimerKey> SchedulerCore<K> {
        fn create_timer(
            &self,
            id: K,
            duration_from_now: Duration,
            overhead_hint_secs: f64,
            repeats: bool,
        ) {
            if self.activation.is_invalidated() {
                debug!("{}", TickClockError::InvalidContext("create_timer"));
                return;
            }
            if duration_from_now.is_zero() && !repeats {
                // degenerate one-shot: never waits for a tick
                (self.event_sink)(ClockEvent::FireImmediately(id));
                return;
            }
            if overhead_hint_secs < 0.0 {
                warn!("{}", TickClockError::ClockAnomaly(overhead_hint_secs));
            }
            let now = Instant::now();
            let offset_secs = duration_from_now.as_secs_f64() - overhead_hint_secs;
            let target_time = if offset_secs >= 0.0 {
                now + Duration::from_secs_f64(offset_secs)
            } else {
                // overhead already ate the whole delay: due on the next tick
                now
            };
            let interval = if duration_from_now < self.config.get_min_interval() {
                Duration::ZERO
            } else {
                duration_from_now
            };
            self.registry
                .insert(Timer::new(id, interval, target_time, repeats));
            self.activation.start_ticking();
        }

        fn delete_timer(&self, id: &K) {
            if self.activation.is_invalidated() {
                debug!("{}", TickClockError::InvalidContext("delete_timer"));
                return;
            }
            if !self.registry.remove(id) {
                warn!("{}", TickClockError::InvalidArgument(format!("{id:?}")));
                return;
            }
            if self.registry.is_empty() {
                self.activation.stop_ticking();
            }
        }

        fn invalidate(&self) {
            if !self.activation.invalidate() {
                return;
            }
            if let Some(hub) = &self.lifecycle_hub {
                hub.unsubscribe();
            }
        }
    }

    impl<K: TimerKey> TickSink for SchedulerCore<K> {
        fn on_tick(&self, now: Instant) {
            if self.activation.is_invalidated() {
                return;
            }
            let drained = self.evaluator.run_pass(now);
            if drained {
                self.activation.stop_ticking();
            }
        }
    }

    impl<K: TimerKey> LifecycleSink for SchedulerCore<K> {
        fn on_lifecycle(&self, event: LifecycleEvent) {
            debug!("lifecycle event {event:?}");
            if event.is_suspend() {
                self.activation.stop_ticking();
            } else {
                self.activation.start_ticking();
            }
        }
    }
}

mod activation {
    use std::sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    };

    use log::debug;

    use crate::{
        registry::TimerRegistry,
        sources::{TickSink, TickSource},
        timer::TimerKey,
    };

    /// Gates the tick subscription: subscribed only while the registry holds
    /// timers, the host is not suspended, and the scheduler has not been
    /// invalidated. The invalidation latch is permanent.
    pub(super) struct ActivationController<K: TimerKey> {
        tick_source: Arc<dyn TickSource>,
        sink: Weak<dyn TickSink>,
        registry: Arc<TimerRegistry<K>>,
        subscribed: AtomicBool,
        invalidated: AtomicBool,
    }

    impl<K: TimerKey> ActivationController<K> {
        pub(super) fn new(
            tick_source: Arc<dyn TickSource>,
            sink: Weak<dyn TickSink>,
            registry: Arc<TimerRegistry<K>>,
        ) -> Self {
            Self {
                tick_source,
                sink,
                registry,
                subscribed: AtomicBool::new(false),
                invalidated: AtomicBool::new(false),
            }
        }

        /// No-op when invalidated, when nothing is registered, or when
        /// already subscribed.
        pub(super) fn start_ticking(&self) {
            if self.invalidated.load(Ordering::Acquire) {
                debug!("start_ticking ignored : scheduler invalidated");
                return;
            }
            if self.registry.is_empty() {
                return;
            }
            let Some(sink) = self.sink.upgrade() else {
                return;
            };
            if self.subscribed.swap(true, Ordering::AcqRel) {
                return;
            }
            debug!("subscribing to tick source");
            self.tick_source.subscribe(sink);
        }

        /// Idempotent.
        pub(super) fn stop_ticking(&self) {
            if self.subscribed.swap(false, Ordering::AcqRel) {
                debug!("unsubscribing from tick source");
                self.tick_source.unsubscribe();
            }
        }

        /// Latches the controller invalid and halts ticking. Returns `false`
        /// if it was already latched.
        pub(super) fn invalidate(&self) -> bool {
            if self.invalidated.swap(true, Ordering::AcqRel) {
                return false;
            }
            self.stop_ticking();
            true
        }

        pub(super) fn is_invalidated(&self) -> bool {
            self.invalidated.load(Ordering::Acquire)
        }
        pub(super) fn is_ticking(&self) -> bool {
            self.subscribed.load(Ordering::Acquire)
        }
    }
}

mod timer_event {
    use std::{fmt::Display, sync::Arc};

    use crate::timer::TimerKey;

    pub(crate) type TimerEventFn<K> = Arc<dyn Fn(ClockEvent<K>) + Send + Sync + 'static>;

    /// Delivery from the scheduler to its consumer.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ClockEvent<K: TimerKey> {
        /// Every timer id that came due within one tick, in registration
        /// order. Emitted at most once per tick, never empty.
        CallTimers(Vec<K>),
        /// Zero-duration one-shot id handed over synchronously from
        /// `create_timer`, bypassing the tick machinery.
        FireImmediately(K),
    }

    impl<K: TimerKey> Display for ClockEvent<K> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::CallTimers(ids) => {
                    write!(f, "call timers {ids:?}")
                }
                Self::FireImmediately(id) => {
                    write!(f, "fire immediately {id:?}")
                }
            }
        }
    }
}
