//! Error types for the hook chain.
//!
//! Registry mutations fail with [`RegistryError`], handler failures during an
//! invocation surface as [`HandlerInvocationError`], and configuration loading
//! fails with [`ConfigurationError`]. [`HookChainError`] unifies them for
//! callers that just want one error type.

use crate::config::ConfigurationError;
use thiserror::Error;

/// Errors raised by [`ChainRegistry`](crate::registry::ChainRegistry) mutations.
///
/// Both variants leave the registry unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A handler with this name is already part of the chain
    #[error("Handler '{name}' is already registered")]
    DuplicateHandler { name: String },
    /// No handler with this name is part of the chain
    #[error("Handler '{name}' is not registered")]
    UnknownHandler { name: String },
}

/// Errors returned to a handler by its [`ObserverContext`](crate::hooks::ObserverContext).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// `bypass()` was called while handling an event that cannot be bypassed
    #[error("Hook point '{hook_point}' does not support bypass")]
    BypassNotSupported { hook_point: String },
}

/// A handler failed while the chain was being invoked.
///
/// The invocation is aborted at the failing handler. The flags record what the
/// chain had signalled up to and including the failing handler.
#[derive(Debug, Error)]
#[error("Handler '{handler}' failed at position {position} of hook '{hook_point}': {cause}")]
pub struct HandlerInvocationError {
    pub handler: String,
    pub hook_point: String,
    /// Zero-based index of the failing handler in the invoked snapshot
    pub position: usize,
    #[source]
    pub cause: anyhow::Error,
    pub bypassed_at_failure: bool,
    pub completed_at_failure: bool,
}

impl HandlerInvocationError {
    /// True when the handler panicked rather than returning an error
    pub fn is_panic(&self) -> bool {
        self.cause.downcast_ref::<HandlerPanic>().is_some()
    }
}

/// Cause recorded when a handler panics instead of returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("handler panicked: {message}")]
pub struct HandlerPanic {
    pub message: String,
}

/// Crate-level error for callers that mix registration, invocation and configuration.
#[derive(Debug, Error)]
pub enum HookChainError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Invocation(#[from] HandlerInvocationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

pub type Result<T> = std::result::Result<T, HookChainError>;
