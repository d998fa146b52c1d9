//! Storage contracts the session services depend on.

pub mod session_store;

pub use session_store::{NoOpSessionStore, SessionStore};

#[cfg(test)]
pub use session_store::MockSessionStore;
