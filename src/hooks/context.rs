//! # Observer Context
//!
//! Execution state for one invocation of a hook chain. A single context is
//! created per [`ChainOrchestrator::invoke`](crate::orchestration::ChainOrchestrator::invoke)
//! call and handed by `&mut` to every handler in chain order, with the
//! environment swapped for each handler.
//!
//! Handlers use it to:
//!
//! - read their own environment ([`ObserverContext::environment`])
//! - override the default outcome ([`ObserverContext::bypass`])
//! - stop the rest of the chain ([`ObserverContext::complete`])
//! - learn who triggered the event ([`ObserverContext::caller`])

use crate::error::ContextError;
use crate::hooks::caller::{CallerIdentity, CallerResolver, NoRemoteCaller};
use std::fmt;
use std::sync::{Arc, OnceLock};

pub struct ObserverContext<Env> {
    environment: Option<Arc<Env>>,
    hook_point: String,
    bypassable: bool,
    bypass: bool,
    complete: bool,
    explicit_caller: Option<CallerIdentity>,
    resolved_caller: OnceLock<Option<CallerIdentity>>,
    resolver: Arc<dyn CallerResolver>,
}

impl<Env> ObserverContext<Env> {
    /// Create the context for one invocation of `hook_point`
    pub fn new(
        hook_point: impl Into<String>,
        bypassable: bool,
        explicit_caller: Option<CallerIdentity>,
        resolver: Arc<dyn CallerResolver>,
    ) -> Self {
        Self {
            environment: None,
            hook_point: hook_point.into(),
            bypassable,
            bypass: false,
            complete: false,
            explicit_caller,
            resolved_caller: OnceLock::new(),
            resolver,
        }
    }

    /// Standalone context bound to `environment`, with no ambient caller.
    ///
    /// Useful for exercising a single handler outside of a chain.
    pub fn for_environment(environment: Arc<Env>) -> Self {
        let mut ctx = Self::new("standalone", true, None, Arc::new(NoRemoteCaller));
        ctx.set_environment(environment);
        ctx
    }

    /// The environment of the handler currently executing
    ///
    /// `None` only before the first handler of the chain has been entered.
    pub fn environment(&self) -> Option<&Env> {
        self.environment.as_deref()
    }

    /// Use the current handler's result in place of the default outcome.
    ///
    /// Idempotent, and does not stop later handlers from running. Fails when
    /// the hook point being handled cannot be bypassed.
    pub fn bypass(&mut self) -> Result<(), ContextError> {
        if !self.bypassable {
            return Err(ContextError::BypassNotSupported {
                hook_point: self.hook_point.clone(),
            });
        }
        self.bypass = true;
        Ok(())
    }

    /// Skip every handler after the current one.
    pub fn complete(&mut self) {
        self.complete = true;
    }

    /// The principal that triggered this invocation.
    ///
    /// An explicit caller given to `invoke` always wins. Otherwise the
    /// resolver is queried on first use and its answer, present or not, is
    /// kept for the rest of the invocation.
    pub fn caller(&self) -> Option<CallerIdentity> {
        if let Some(caller) = &self.explicit_caller {
            return Some(caller.clone());
        }
        self.resolved_caller
            .get_or_init(|| self.resolver.current_remote_caller())
            .clone()
    }

    pub fn hook_point(&self) -> &str {
        &self.hook_point
    }

    pub fn is_bypassable(&self) -> bool {
        self.bypassable
    }

    pub fn should_bypass(&self) -> bool {
        self.bypass
    }

    pub fn should_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn set_environment(&mut self, environment: Arc<Env>) {
        self.environment = Some(environment);
    }

    /// Caller known to this invocation without querying the resolver again
    pub(crate) fn known_caller(&self) -> Option<CallerIdentity> {
        self.explicit_caller
            .clone()
            .or_else(|| self.resolved_caller.get().cloned().flatten())
    }
}

impl<Env> fmt::Debug for ObserverContext<Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverContext")
            .field("hook_point", &self.hook_point)
            .field("has_environment", &self.environment.is_some())
            .field("bypassable", &self.bypassable)
            .field("bypass", &self.bypass)
            .field("complete", &self.complete)
            .field("explicit_caller", &self.explicit_caller)
            .field("resolved_caller", &self.resolved_caller.get())
            .finish()
    }
}
