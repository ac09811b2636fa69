//! Step contract and the sequential executor.
//!
//! Every step is run in two phases:
//! 1. `pre_execute` checks that the contexts it depends on exist and decides
//!    whether the step applies to this invocation.
//! 2. `execute` performs the step's single responsibility.
//!
//! The first `Abort` from either phase stops the pipeline.

use tracing::{debug, info_span, warn};

use crate::context::Invocation;
use crate::pipeline::event::{Abort, Flow};

/// Result of a precondition check that did not abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Run,
    /// The step does not apply; continue with the next one.
    Skip,
}

pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    fn pre_execute(&self, _inv: &Invocation) -> Result<Gate, Abort> {
        Ok(Gate::Run)
    }

    fn execute(&self, inv: &mut Invocation) -> Result<(), Abort>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    Aborted { step: &'static str, abort: Abort },
}

impl PipelineOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed)
    }
}

pub struct Pipeline {
    flow: Flow,
    actions: Vec<Box<dyn Action>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("flow", &self.flow)
            .field("steps", &self.step_names())
            .finish()
    }
}

impl Pipeline {
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            actions: Vec::new(),
        }
    }

    pub fn then(mut self, action: impl Action + 'static) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Runs every step in order against `inv`.
    ///
    /// On abort the terminal event is recorded on `inv.event` and no further
    /// step runs.
    pub fn run(&self, inv: &mut Invocation) -> PipelineOutcome {
        let span = info_span!("pipeline", flow = %self.flow, invocation = %inv.id());
        let _entered = span.enter();

        for action in &self.actions {
            let step = action.name();

            match action.pre_execute(inv) {
                Ok(Gate::Run) => {}
                Ok(Gate::Skip) => {
                    debug!(step, "step not applicable, skipped");
                    continue;
                }
                Err(abort) => return Self::abort(inv, step, abort),
            }

            if let Err(abort) = action.execute(inv) {
                return Self::abort(inv, step, abort);
            }
            debug!(step, "step completed");
        }

        PipelineOutcome::Completed
    }

    fn abort(inv: &mut Invocation, step: &'static str, abort: Abort) -> PipelineOutcome {
        warn!(step, event = %abort.event, detail = %abort.detail, "pipeline aborted");
        inv.event = Some(abort.clone());
        PipelineOutcome::Aborted { step, abort }
    }
}
