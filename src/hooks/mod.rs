//! # Observer Hooks
//!
//! The handler-facing side of the hook chain.
//!
//! ## Overview
//!
//! A host defines one event type per hook family (implementing [`HookEvent`])
//! and lets plugins register [`Observer`]s for it. When the host reaches the
//! hook point it asks the orchestrator to invoke the chain; every observer
//! receives the same [`ObserverContext`], in priority order.
//!
//! ## Control Signals
//!
//! - **bypass**: the observer's own result should replace the host's default
//!   computation. The chain keeps running.
//! - **complete**: the observers after the current one are skipped.
//!
//! Neither signal is an error. A handler that returns `Err` (or panics) aborts
//! the invocation instead.

pub mod caller;
pub mod context;
pub mod observer;

pub use caller::{
    with_remote_caller, CallerIdentity, CallerResolver, NoRemoteCaller, RequestScopeResolver,
    StaticCallerResolver,
};
pub use context::ObserverContext;
pub use observer::{HandlerResult, HookEvent, Observer};
