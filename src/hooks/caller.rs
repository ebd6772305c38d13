//! # Caller Resolution
//!
//! Handlers can ask their [`ObserverContext`](super::ObserverContext) who
//! triggered the event. Unless the invoker named a caller explicitly, the
//! context asks a [`CallerResolver`] injected into the orchestrator.
//!
//! Three resolvers ship with the crate:
//!
//! - [`NoRemoteCaller`]: there is never an ambient caller
//! - [`StaticCallerResolver`]: a fixed (but replaceable) answer
//! - [`RequestScopeResolver`]: reads the caller installed for the current task
//!   by [`with_remote_caller`]

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Identity of the principal that triggered a hook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallerIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CallerIdentity {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Answers "is there an ambient remote caller right now?"
///
/// Implementations must be cheap and side-effect free; they are queried at
/// most once per invocation, from whichever task runs the invocation.
pub trait CallerResolver: Send + Sync {
    fn current_remote_caller(&self) -> Option<CallerIdentity>;
}

/// Resolver for hosts that never run hooks on behalf of a remote caller
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRemoteCaller;

impl CallerResolver for NoRemoteCaller {
    fn current_remote_caller(&self) -> Option<CallerIdentity> {
        None
    }
}

/// Resolver returning a fixed caller that can be swapped at runtime
#[derive(Debug, Default)]
pub struct StaticCallerResolver {
    caller: RwLock<Option<CallerIdentity>>,
}

impl StaticCallerResolver {
    pub fn new(caller: Option<CallerIdentity>) -> Self {
        Self {
            caller: RwLock::new(caller),
        }
    }

    pub fn with_caller(caller: impl Into<CallerIdentity>) -> Self {
        Self::new(Some(caller.into()))
    }

    /// Replace the answer given to subsequent queries
    pub fn set(&self, caller: Option<CallerIdentity>) {
        *self.caller.write() = caller;
    }
}

impl CallerResolver for StaticCallerResolver {
    fn current_remote_caller(&self) -> Option<CallerIdentity> {
        self.caller.read().clone()
    }
}

tokio::task_local! {
    static REMOTE_CALLER: CallerIdentity;
}

/// Run a future with `caller` as the ambient remote caller of the current task
///
/// This is the hook for the request-handling layer: wrap the handling of one
/// remote request in this scope and [`RequestScopeResolver`] will report the
/// caller to every hook invoked inside it.
pub async fn with_remote_caller<F, T>(caller: CallerIdentity, future: F) -> T
where
    F: Future<Output = T>,
{
    REMOTE_CALLER.scope(caller, future).await
}

/// Resolver backed by the task-local scope installed by [`with_remote_caller`]
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestScopeResolver;

impl CallerResolver for RequestScopeResolver {
    fn current_remote_caller(&self) -> Option<CallerIdentity> {
        REMOTE_CALLER.try_with(|caller| caller.clone()).ok()
    }
}
