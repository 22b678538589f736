//! Eligibility rules and the sweep that applies them.

pub mod evaluator;
mod orchestrator;
mod result;
pub mod shutdown;

pub use evaluator::{evaluate, Decision, KeepReason, Policy, TorrentFacts};
pub use orchestrator::{sweep, Sweeper};
pub use result::{Outcome, SweepResult};
pub use shutdown::{Shutdown, ShutdownTrigger};
