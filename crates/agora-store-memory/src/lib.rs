//! In-memory backend for the Agora forum store.
//!
//! Nothing survives a restart. All state sits in [`dashmap`] maps so request
//! workers can read and write concurrently without a global lock.

mod store;

pub use store::MemoryStore;
