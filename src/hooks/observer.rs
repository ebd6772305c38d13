//! Core observer traits.

use crate::hooks::context::ObserverContext;
use async_trait::async_trait;

/// Outcome of a single handler call.
///
/// Returning `Err` aborts the whole invocation; bypass and completion are
/// signalled through the context instead.
pub type HandlerResult = anyhow::Result<()>;

/// An event that can trigger a hook chain.
pub trait HookEvent: Send + Sync {
    /// Name of the hook point this event belongs to, used in logs and errors
    fn hook_point(&self) -> &str;

    /// Whether handlers may call [`ObserverContext::bypass`] for this event.
    ///
    /// Default: `true`.
    fn bypassable(&self) -> bool {
        true
    }
}

/// A handler registered on a hook chain.
///
/// `Ev` is the event family the observer reacts to and `Env` the environment
/// it was registered with. Names must be unique within one registry.
#[async_trait]
pub trait Observer<Ev, Env>: Send + Sync {
    /// A unique name for this observer.
    fn name(&self) -> &str;

    /// React to `event`.
    async fn on_event(&self, ctx: &mut ObserverContext<Env>, event: &Ev) -> HandlerResult;
}
