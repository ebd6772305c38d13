#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Tasker Hooks
//!
//! Ordered observer hook chains for server-side extension points.
//!
//! ## Overview
//!
//! A host exposes hook points (before a write, after a region opens, ...).
//! Plugins register observers on those hook points; when the host reaches one
//! it invokes the chain and every observer sees the event in a deterministic
//! order. Any observer may:
//!
//! - **bypass**: have its own result used instead of the host's default
//! - **complete**: stop the observers after it from running
//! - ask **who the caller is**, resolved lazily once per invocation
//!
//! ## Module Organization
//!
//! - [`hooks`] - Observer traits, the per-invocation context, caller resolution
//! - [`registry`] - Copy-on-write chain registry with snapshot isolation
//! - [`orchestration`] - Chain invocation and failure wrapping
//! - [`config`] - Layered configuration (defaults, TOML, environment)
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup and helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use async_trait::async_trait;
//! use std::sync::Arc;
//! use tasker_hooks::constants::Priority;
//! use tasker_hooks::hooks::{HandlerResult, HookEvent, Observer, ObserverContext};
//! use tasker_hooks::orchestration::ChainOrchestrator;
//! use tasker_hooks::registry::ChainRegistry;
//!
//! struct PreDelete {
//!     key: String,
//! }
//!
//! impl HookEvent for PreDelete {
//!     fn hook_point(&self) -> &str {
//!         "pre_delete"
//!     }
//! }
//!
//! struct ProtectedKeys {
//!     keys: Vec<String>,
//! }
//!
//! struct Guard;
//!
//! #[async_trait]
//! impl Observer<PreDelete, ProtectedKeys> for Guard {
//!     fn name(&self) -> &str {
//!         "guard"
//!     }
//!
//!     async fn on_event(
//!         &self,
//!         ctx: &mut ObserverContext<ProtectedKeys>,
//!         event: &PreDelete,
//!     ) -> HandlerResult {
//!         let protected = ctx
//!             .environment()
//!             .is_some_and(|env| env.keys.contains(&event.key));
//!         if protected {
//!             ctx.bypass()?;
//!             ctx.complete();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry: Arc<ChainRegistry<PreDelete, ProtectedKeys>> = Arc::new(ChainRegistry::new());
//! registry.register(
//!     Arc::new(Guard),
//!     Arc::new(ProtectedKeys { keys: vec!["root".to_string()] }),
//!     Priority::SYSTEM,
//! )?;
//!
//! let orchestrator = ChainOrchestrator::without_resolver(registry);
//! let outcome = orchestrator
//!     .invoke(&PreDelete { key: "root".to_string() }, None)
//!     .await?;
//! assert!(outcome.bypassed && outcome.completed_early);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod orchestration;
pub mod registry;

pub use config::{ConfigLoader, ConfigurationError, HookChainConfig};
pub use constants::Priority;
pub use error::{
    ContextError, HandlerInvocationError, HandlerPanic, HookChainError, RegistryError, Result,
};
pub use hooks::{
    with_remote_caller, CallerIdentity, CallerResolver, HandlerResult, HookEvent, NoRemoteCaller,
    Observer, ObserverContext, RequestScopeResolver, StaticCallerResolver,
};
pub use logging::init_structured_logging;
pub use orchestration::{ChainOrchestrator, InvocationOutcome};
pub use registry::{ChainRegistry, ChainSnapshot, HandlerBinding, RegistryStats};
