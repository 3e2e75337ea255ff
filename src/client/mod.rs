//! Typed client for the REST API.
//!
//! [`ApiClient`] unwraps response envelopes and caches reads,
//! [`SessionStore`] persists the login between runs and revalidates it,
//! and [`Pagination`] does page math over list `meta` blocks.

pub mod cache;
pub mod error;
pub mod http;
pub mod pagination;
pub mod session;

pub use cache::QueryCache;
pub use error::ApiError;
pub use http::ApiClient;
pub use pagination::Pagination;
pub use session::{SessionState, SessionStore};
