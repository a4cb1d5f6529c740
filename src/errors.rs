use std::fmt::Display;

/// Build failures are returned by [`TickClockBuilder::build`](crate::TickClockBuilder::build);
/// the runtime variants are only ever logged; nothing crosses the scheduler's
/// public boundary as an error once it is built.
#[derive(Debug)]
pub enum TickClockError {
    BuildErrorNoEventSink,
    BuildErrorNoTickSource,
    /// Caller handed an id the registry does not know.
    InvalidArgument(String),
    /// Negative scheduling-overhead hint (caller clock skew). The value is
    /// used as supplied.
    ClockAnomaly(f64),
    /// Operation arrived after `invalidate()`.
    InvalidContext(&'static str),
}

impl Display for TickClockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickClockError::BuildErrorNoEventSink => {
                write!(f, "Tick clock : Build error  No timer event callback set !")
            }
            TickClockError::BuildErrorNoTickSource => {
                write!(f, "Tick clock : Build error  No tick source set !")
            }
            TickClockError::InvalidArgument(what) => {
                write!(f, "Invalid argument : unknown timer id [{what}]")
            }
            TickClockError::ClockAnomaly(hint) => {
                write!(
                    f,
                    "Clock anomaly : negative scheduling overhead [{hint}s], used as supplied"
                )
            }
            TickClockError::InvalidContext(op) => {
                write!(f, "Scheduler invalidated, [{op}] ignored")
            }
        }
    }
}
