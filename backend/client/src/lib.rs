//! Typed HTTP client for the developer network API, plus the client side
//! state container that keeps auth, profile, post and alert state in sync
//! with it.
pub mod api;
pub mod reducers;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use reducers::{Action, AlertKind, AppState};
pub use store::Store;
