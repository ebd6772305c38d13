//! # Chain Registry
//!
//! Ordered, copy-on-write registry of handler bindings for one hook chain.
//!
//! ## Overview
//!
//! Every mutation builds a new [`ChainSnapshot`] and publishes it by atomically
//! swapping a single `Arc`. Readers take the current snapshot in O(1) without
//! taking a lock, and keep it for
//! as long as they like: later registrations never touch a snapshot that has
//! already been handed out, so an in-flight invocation always sees exactly
//! the chain that existed when it started.
//!
//! ## Ordering
//!
//! Bindings are ordered by `(priority, sequence)` ascending. The sequence is a
//! monotonically increasing registration counter, so handlers sharing a
//! priority run in registration order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = ChainRegistry::new();
//! registry.register(Arc::new(AuditObserver), Arc::new(audit_env), Priority::SYSTEM)?;
//!
//! let snapshot = registry.current_snapshot();
//! for binding in snapshot.iter() {
//!     println!("{} @ {}", binding.name(), binding.priority());
//! }
//! ```

use crate::config::HookChainConfig;
use crate::constants::Priority;
use crate::error::RegistryError;
use crate::hooks::{HookEvent, Observer};
use crate::logging::log_registry_operation;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One handler paired with the environment it observes.
///
/// Immutable once created; the registry only ever adds or drops bindings.
pub struct HandlerBinding<Ev, Env> {
    handler: Arc<dyn Observer<Ev, Env>>,
    environment: Arc<Env>,
    priority: i64,
    sequence: u64,
}

impl<Ev, Env> HandlerBinding<Ev, Env> {
    pub fn name(&self) -> &str {
        self.handler.name()
    }

    pub fn handler(&self) -> &Arc<dyn Observer<Ev, Env>> {
        &self.handler
    }

    pub fn environment(&self) -> &Arc<Env> {
        &self.environment
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn sort_key(&self) -> (i64, u64) {
        (self.priority, self.sequence)
    }
}

impl<Ev, Env> fmt::Debug for HandlerBinding<Ev, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("name", &self.name())
            .field("handler", &"<Arc<dyn Observer>>")
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Immutable, ordered view of a chain at one registry version
pub struct ChainSnapshot<Ev, Env> {
    version: u64,
    bindings: Vec<Arc<HandlerBinding<Ev, Env>>>,
}

impl<Ev, Env> ChainSnapshot<Ev, Env> {
    fn empty() -> Self {
        Self {
            version: 0,
            bindings: Vec::new(),
        }
    }

    /// Registry version this snapshot was published at
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<HandlerBinding<Ev, Env>>> {
        self.bindings.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<HandlerBinding<Ev, Env>>> {
        self.bindings.get(index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b.name() == name)
    }

    /// Handler names in chain order
    pub fn names(&self) -> Vec<String> {
        self.bindings.iter().map(|b| b.name().to_string()).collect()
    }
}

impl<Ev, Env> fmt::Debug for ChainSnapshot<Ev, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSnapshot")
            .field("version", &self.version)
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Registry statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub handler_count: usize,
    pub version: u64,
    pub total_registrations: u64,
    pub total_unregistrations: u64,
}

/// Bookkeeping owned by whichever writer holds the lock
#[derive(Debug, Default)]
struct WriterState {
    next_sequence: u64,
    registrations: u64,
    unregistrations: u64,
}

/// Registry of handler bindings for one hook chain
pub struct ChainRegistry<Ev, Env> {
    /// Currently published snapshot
    current: ArcSwap<ChainSnapshot<Ev, Env>>,
    /// Serializes writers so each mutation starts from the latest snapshot
    writer: Mutex<WriterState>,
    default_priority: i64,
}

impl<Ev, Env> ChainRegistry<Ev, Env>
where
    Ev: HookEvent + 'static,
    Env: Send + Sync + 'static,
{
    /// Create an empty registry using [`Priority::USER`] as default priority
    pub fn new() -> Self {
        Self::with_default_priority(Priority::USER)
    }

    pub fn with_default_priority(default_priority: i64) -> Self {
        Self {
            current: ArcSwap::from_pointee(ChainSnapshot::empty()),
            writer: Mutex::new(WriterState::default()),
            default_priority,
        }
    }

    pub fn from_config(config: &HookChainConfig) -> Self {
        Self::with_default_priority(config.default_priority)
    }

    /// Register `handler` with `environment` at `priority`.
    ///
    /// Lower priority runs first. Fails if a handler with the same name is
    /// already registered.
    pub fn register(
        &self,
        handler: Arc<dyn Observer<Ev, Env>>,
        environment: Arc<Env>,
        priority: i64,
    ) -> Result<(), RegistryError> {
        let name = handler.name().to_string();
        let mut writer = self.writer.lock();
        let current = self.current_snapshot();

        if current.contains(&name) {
            log_registry_operation("register", &name, Some(priority), "rejected", Some("duplicate"));
            return Err(RegistryError::DuplicateHandler { name });
        }

        let binding = Arc::new(HandlerBinding {
            handler,
            environment,
            priority,
            sequence: writer.next_sequence,
        });
        writer.next_sequence += 1;

        let mut bindings = current.bindings.clone();
        // The new sequence is the largest, so it goes after every equal priority
        let position = bindings.partition_point(|b| b.sort_key() < binding.sort_key());
        bindings.insert(position, binding);

        let version = self.publish(&current, bindings);
        writer.registrations += 1;

        log_registry_operation("register", &name, Some(priority), "success", None);
        tracing::debug!(handler = %name, priority, version, position, "Handler bound to chain");
        Ok(())
    }

    /// Register `handler` at the registry's default priority
    pub fn register_with_default_priority(
        &self,
        handler: Arc<dyn Observer<Ev, Env>>,
        environment: Arc<Env>,
    ) -> Result<(), RegistryError> {
        self.register(handler, environment, self.default_priority)
    }

    /// Remove the handler named `name`.
    ///
    /// Snapshots already taken keep the binding.
    pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        let mut writer = self.writer.lock();
        let current = self.current_snapshot();

        if !current.contains(name) {
            log_registry_operation("unregister", name, None, "rejected", Some("unknown handler"));
            return Err(RegistryError::UnknownHandler {
                name: name.to_string(),
            });
        }

        let bindings: Vec<_> = current
            .bindings
            .iter()
            .filter(|b| b.name() != name)
            .cloned()
            .collect();

        let version = self.publish(&current, bindings);
        writer.unregistrations += 1;

        log_registry_operation("unregister", name, None, "success", None);
        tracing::debug!(handler = %name, version, "Handler removed from chain");
        Ok(())
    }

    /// Remove exactly `binding`, if it is still part of the chain.
    ///
    /// Unlike [`unregister`](Self::unregister) this never touches a newer
    /// binding that reuses the same name. Returns whether anything was removed.
    pub fn unregister_binding(&self, binding: &Arc<HandlerBinding<Ev, Env>>) -> bool {
        let mut writer = self.writer.lock();
        let current = self.current_snapshot();

        if !current.bindings.iter().any(|b| Arc::ptr_eq(b, binding)) {
            log_registry_operation(
                "unregister_binding",
                binding.name(),
                Some(binding.priority()),
                "skipped",
                Some("binding no longer registered"),
            );
            return false;
        }

        let bindings: Vec<_> = current
            .bindings
            .iter()
            .filter(|b| !Arc::ptr_eq(b, binding))
            .cloned()
            .collect();

        let version = self.publish(&current, bindings);
        writer.unregistrations += 1;

        log_registry_operation(
            "unregister_binding",
            binding.name(),
            Some(binding.priority()),
            "success",
            None,
        );
        tracing::debug!(
            handler = binding.name(),
            sequence = binding.sequence(),
            version,
            "Binding removed from chain"
        );
        true
    }

    /// The chain as currently published. Never blocks.
    pub fn current_snapshot(&self) -> Arc<ChainSnapshot<Ev, Env>> {
        self.current.load_full()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.current_snapshot().contains(name)
    }

    /// Registered handler names in chain order
    pub fn handler_names(&self) -> Vec<String> {
        self.current_snapshot().names()
    }

    pub fn len(&self) -> usize {
        self.current_snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_snapshot().is_empty()
    }

    pub fn version(&self) -> u64 {
        self.current_snapshot().version()
    }

    pub fn default_priority(&self) -> i64 {
        self.default_priority
    }

    pub fn stats(&self) -> RegistryStats {
        let writer = self.writer.lock();
        let snapshot = self.current_snapshot();
        RegistryStats {
            handler_count: snapshot.len(),
            version: snapshot.version(),
            total_registrations: writer.registrations,
            total_unregistrations: writer.unregistrations,
        }
    }

    /// Swap in a new snapshot. Callers must hold the writer lock.
    fn publish(
        &self,
        previous: &ChainSnapshot<Ev, Env>,
        bindings: Vec<Arc<HandlerBinding<Ev, Env>>>,
    ) -> u64 {
        let version = previous.version + 1;
        self.current.store(Arc::new(ChainSnapshot { version, bindings }));
        version
    }
}

impl<Ev, Env> Default for ChainRegistry<Ev, Env>
where
    Ev: HookEvent + 'static,
    Env: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
