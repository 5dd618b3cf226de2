//! Session model, shared handle and durable storage contract.

mod model;
mod storage;

pub use model::{Session, SessionHandle};
pub use storage::{IDENTITY_KEY, KeyValueStore, MemoryKeyValueStore, TOKEN_KEY};
