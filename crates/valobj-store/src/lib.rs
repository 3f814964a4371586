//! Flyweight storage for value objects.
//!
//! This crate owns the only shared mutable state of the system: the
//! flyweight cache mapping `(type tag, canonical value)` to a single live
//! instance. Everything the cache hands out is immutable.
//!
//! # Components
//!
//! - [`Frozen`]: read-only shared handle; the immutability enforcer
//! - [`FlyweightCache`]: per-type partitions of content-addressed slots
//! - [`Flyweight`]: what a cache can store (cheap clone, weak handles)
//!
//! # Design Rules
//!
//! 1. At most one live instance per `(tag, ValueId)` while the cache is enabled.
//! 2. Check-then-insert is atomic: it runs under the partition write lock.
//! 3. A disabled cache never reads or writes its partitions.
//! 4. Resolution has no failure mode; only lock poisoning can panic.

pub mod cache;
pub mod frozen;

pub use cache::{CacheStats, Flyweight, FlyweightCache, Retention};
pub use frozen::{freeze, Frozen};
