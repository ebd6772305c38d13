//! # Chain Orchestrator
//!
//! Drives one hook chain for one triggering event.
//!
//! ## Invocation
//!
//! 1. Capture the registry's current snapshot
//! 2. Create a single [`ObserverContext`] for the invocation
//! 3. For each binding, in `(priority, sequence)` order: swap in the binding's
//!    environment, run the handler, then stop if it signalled `complete`
//! 4. Report the final flags as an [`InvocationOutcome`]
//!
//! ## Failure Policy
//!
//! Fail-fast. A handler that returns an error or panics aborts the invocation
//! on the spot: the remaining handlers are not run and the failure is returned
//! as a [`HandlerInvocationError`]. Retrying or aborting the surrounding
//! operation is the invoker's decision.
//!
//! No lock is held while handlers run; the snapshot and the context are both
//! private to the invocation.

use crate::config::HookChainConfig;
use crate::error::{HandlerInvocationError, HandlerPanic};
use crate::hooks::{CallerIdentity, CallerResolver, HookEvent, NoRemoteCaller, ObserverContext};
use crate::logging::log_invocation_failure;
use crate::registry::{ChainRegistry, ChainSnapshot, HandlerBinding};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// Result of a chain invocation that ran to completion or was completed early
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationOutcome {
    /// At least one handler asked for its result to replace the default
    pub bypassed: bool,
    /// A handler called `complete()`; handlers after it were skipped
    pub completed_early: bool,
    /// Explicit caller, or the ambient caller if a handler asked for it
    pub caller: Option<CallerIdentity>,
    /// Names of the handlers that ran, in order
    pub visited: Vec<String>,
    /// Registry version of the snapshot that was invoked
    pub snapshot_version: u64,
}

impl InvocationOutcome {
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

/// Invokes the chain held by a [`ChainRegistry`]
pub struct ChainOrchestrator<Ev, Env> {
    registry: Arc<ChainRegistry<Ev, Env>>,
    resolver: Arc<dyn CallerResolver>,
    config: HookChainConfig,
}

impl<Ev, Env> ChainOrchestrator<Ev, Env>
where
    Ev: HookEvent + 'static,
    Env: Send + Sync + 'static,
{
    pub fn new(registry: Arc<ChainRegistry<Ev, Env>>, resolver: Arc<dyn CallerResolver>) -> Self {
        Self::with_config(registry, resolver, HookChainConfig::default())
    }

    pub fn with_config(
        registry: Arc<ChainRegistry<Ev, Env>>,
        resolver: Arc<dyn CallerResolver>,
        config: HookChainConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            config,
        }
    }

    /// Orchestrator for hosts without any notion of a remote caller
    pub fn without_resolver(registry: Arc<ChainRegistry<Ev, Env>>) -> Self {
        Self::new(registry, Arc::new(NoRemoteCaller))
    }

    pub fn registry(&self) -> &Arc<ChainRegistry<Ev, Env>> {
        &self.registry
    }

    pub fn config(&self) -> &HookChainConfig {
        &self.config
    }

    /// Run every handler of the chain against `event`.
    ///
    /// `explicit_caller`, when given, is what handlers see from
    /// [`ObserverContext::caller`] regardless of the resolver.
    pub async fn invoke(
        &self,
        event: &Ev,
        explicit_caller: Option<CallerIdentity>,
    ) -> Result<InvocationOutcome, HandlerInvocationError> {
        let snapshot = self.registry.current_snapshot();
        let span = tracing::debug_span!(
            "hook_invocation",
            hook_point = event.hook_point(),
            invocation_id = %Uuid::new_v4(),
            snapshot_version = snapshot.version(),
            handlers = snapshot.len()
        );

        self.run_chain(&snapshot, event, explicit_caller)
            .instrument(span)
            .await
    }

    async fn run_chain(
        &self,
        snapshot: &ChainSnapshot<Ev, Env>,
        event: &Ev,
        explicit_caller: Option<CallerIdentity>,
    ) -> Result<InvocationOutcome, HandlerInvocationError> {
        let mut ctx = ObserverContext::new(
            event.hook_point(),
            event.bypassable(),
            explicit_caller,
            Arc::clone(&self.resolver),
        );
        let mut visited = Vec::with_capacity(snapshot.len());

        for (position, binding) in snapshot.iter().enumerate() {
            ctx.set_environment(Arc::clone(binding.environment()));
            visited.push(binding.name().to_string());

            let started = Instant::now();
            let result = AssertUnwindSafe(binding.handler().on_event(&mut ctx, event))
                .catch_unwind()
                .await;
            self.check_duration(binding.name(), started.elapsed());

            let cause = match result {
                Ok(Ok(())) => None,
                Ok(Err(handler_error)) => Some(handler_error),
                Err(panic) => Some(anyhow::Error::new(HandlerPanic {
                    message: panic_message(panic.as_ref()),
                })),
            };

            if let Some(cause) = cause {
                return Err(self.handle_failure(binding, position, cause, &ctx));
            }

            if ctx.should_complete() {
                debug!(
                    handler = binding.name(),
                    skipped = snapshot.len() - position - 1,
                    "Handler completed the chain"
                );
                break;
            }
        }

        debug!(
            bypassed = ctx.should_bypass(),
            completed = ctx.should_complete(),
            visited = visited.len(),
            "Hook chain finished"
        );

        Ok(InvocationOutcome {
            bypassed: ctx.should_bypass(),
            completed_early: ctx.should_complete(),
            caller: ctx.known_caller(),
            visited,
            snapshot_version: snapshot.version(),
        })
    }

    fn handle_failure(
        &self,
        binding: &Arc<HandlerBinding<Ev, Env>>,
        position: usize,
        cause: anyhow::Error,
        ctx: &ObserverContext<Env>,
    ) -> HandlerInvocationError {
        let error = HandlerInvocationError {
            handler: binding.name().to_string(),
            hook_point: ctx.hook_point().to_string(),
            position,
            cause,
            bypassed_at_failure: ctx.should_bypass(),
            completed_at_failure: ctx.should_complete(),
        };
        log_invocation_failure(&error);

        if self.config.unregister_failed_handlers {
            // Only the binding that failed; a replacement under the same name stays
            if self.registry.unregister_binding(binding) {
                warn!(
                    handler = binding.name(),
                    hook_point = ctx.hook_point(),
                    "Removed failing handler from chain"
                );
            } else {
                debug!(
                    handler = binding.name(),
                    sequence = binding.sequence(),
                    "Failing binding already removed"
                );
            }
        }

        error
    }

    fn check_duration(&self, handler: &str, elapsed: Duration) {
        let threshold = Duration::from_millis(self.config.slow_handler_threshold_ms);
        if elapsed > threshold {
            warn!(
                handler = handler,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = self.config.slow_handler_threshold_ms,
                "Slow hook handler"
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
