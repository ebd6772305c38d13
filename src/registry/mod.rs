//! # Registry Infrastructure
//!
//! Registration of observers on hook chains.
//!
//! ## Overview
//!
//! A [`ChainRegistry`] owns the ordered bindings of one hook chain. It is the
//! only state shared between invocations, so it publishes immutable
//! [`ChainSnapshot`]s rather than letting readers see a list being edited.
//!
//! ```text
//! Registry Infrastructure
//! └── ChainRegistry    (copy-on-write handler bindings per hook chain)
//!     └── ChainSnapshot  (immutable, ordered by priority then registration)
//! ```

pub mod chain_registry;

pub use chain_registry::{ChainRegistry, ChainSnapshot, HandlerBinding, RegistryStats};
