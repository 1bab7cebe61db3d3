//! Plan executor: the batching, conditional-gate, and cancellation-aware
//! engine that runs a compiled [`conduit_types::plan::Plan`] to completion.

pub mod dispatch_trait;
pub mod executor;
pub mod gate;
pub mod progress;

pub use dispatch_trait::{StepDispatch, StepOutcome};
pub use executor::execute;
pub use progress::ProgressSink;
