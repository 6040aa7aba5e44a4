//! Tracker session lifecycle: restore, CAPTCHA login, persist.
//!
//! A run always tries `restore()` first. Only when no usable session is on
//! disk does it `login()`, after which the new state is persisted at once.
//! A restored session is not re-validated; an expired one shows up later as
//! a redirect to the login page on an ordinary fetch.

mod jar;
mod manager;
mod store;
mod types;

pub use jar::SessionJar;
pub use manager::{LoginForm, SessionManager};
pub use store::SessionStore;
pub use types::*;
