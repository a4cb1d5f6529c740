pub use lifecycle::{LifecycleEvent, LifecycleHub, LifecycleSink};
pub use tick::{TickSink, TickSource};

mod tick {
    use std::{sync::Arc, time::Instant};

    /// External frame clock the scheduler subscribes to while it has live
    /// timers.
    ///
    /// The scheduler never initiates its own clock: while subscribed, the
    /// source invokes [`TickSink::on_tick`] once per tick with the tick's
    /// timestamp. `on_tick` must not be delivered from more than one thread
    /// at a time.
    pub trait TickSource: Send + Sync {
        fn subscribe(&self, sink: Arc<dyn TickSink>);
        /// Idempotent; the source drops its sink handle.
        fn unsubscribe(&self);
    }

    /// Receiver side of a tick subscription.
    pub trait TickSink: Send + Sync {
        fn on_tick(&self, now: Instant);
    }
}

mod lifecycle {
    use std::sync::Arc;

    /// Discrete host lifecycle transitions, classified into a suspend group
    /// (halt ticking regardless of registry contents) and a resume group
    /// (ticking may be recomputed).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum LifecycleEvent {
        WillResignActive,
        DidEnterBackground,
        WillTerminate,
        WillEnterForeground,
        DidBecomeActive,
    }

    impl LifecycleEvent {
        pub fn is_suspend(&self) -> bool {
            matches!(
                self,
                Self::WillResignActive | Self::DidEnterBackground | Self::WillTerminate
            )
        }
    }

    /// Injected publish/subscribe handle for host lifecycle signals.
    ///
    /// The scheduler subscribes at build time and unsubscribes when it is
    /// invalidated; the hub's lifetime is tied to the scheduler's own.
    pub trait LifecycleHub: Send + Sync {
        fn subscribe(&self, sink: Arc<dyn LifecycleSink>);
        fn unsubscribe(&self);
    }

    /// Receiver side of a lifecycle subscription.
    pub trait LifecycleSink: Send + Sync {
        fn on_lifecycle(&self, event: LifecycleEvent);
    }
}
