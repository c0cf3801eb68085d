use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crux_core::capability::{Capability, CapabilityContext, Operation};

/// What an armed timer is for. Each purpose owns at most one live timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerPurpose {
    /// Clears the deselect suppression after a selection.
    Grace,
    /// Recomputes the visible set once the viewport stops moving.
    Settle,
    /// Runs the address search once typing pauses.
    Search,
    /// Gives up on a geocoding lookup the shell has not answered.
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId {
    pub purpose: TimerPurpose,
    pub generation: u64,
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.purpose, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    Start { id: TimerId, millis: u64 },
    Cancel { id: TimerId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Elapsed,
    Cancelled,
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

/// One-shot timers executed by the shell. A started timer is resolved exactly
/// once, with `Elapsed` or, after a matching `Cancel`, with `Cancelled`.
pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn start<F>(&self, id: TimerId, after: Duration, make_event: F)
    where
        F: FnOnce(TimerOutput) -> Ev + Send + 'static,
    {
        let millis = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;
            ctx.update_app(make_event(output));
        });
    }

    pub fn cancel(&self, id: TimerId) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(TimerOperation::Cancel { id }).await;
        });
    }
}
