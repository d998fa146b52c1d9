//! Request guard built on the token session manager
//!
//! Transport layers hand the raw `Authorization` and device headers to
//! [`SessionGuard::authenticate`] and receive an [`IdentityContext`] to
//! attach to the request. Permission checks then run against that context.

mod context;
mod session_guard;


pub use context::IdentityContext;
pub use session_guard::{extract_bearer_token, SessionGuard, DEVICE_HEADER};
