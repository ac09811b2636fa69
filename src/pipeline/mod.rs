//! Step contract, executor, terminal events and lookup strategies.

pub mod action;
pub mod event;
pub mod strategy;

pub use action::{Action, Gate, Pipeline, PipelineOutcome};
pub use event::{Abort, ErrorKind, ErrorObject, Event, Flow};
