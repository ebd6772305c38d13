//! # Orchestration
//!
//! Invocation of hook chains.
//!
//! The [`ChainOrchestrator`] is the host-facing entry point: hosts call
//! [`ChainOrchestrator::invoke`] at a hook point and act on the returned
//! [`InvocationOutcome`] (use the handlers' result when `bypassed`, and so on).

pub mod chain_orchestrator;

pub use chain_orchestrator::{ChainOrchestrator, InvocationOutcome};
