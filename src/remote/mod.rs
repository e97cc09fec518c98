//! Remote collaborators: the key-value backed HTTP API and the auth provider.
//!
//! Both sit behind `async_trait` traits so the loader and the scheduler can run
//! against the real service or against the in-process [`MemoryRemoteStore`].
use thiserror::Error;

pub mod auth;
pub mod memory;
pub mod records;
pub mod store;

pub use auth::{AuthProvider, HttpAuthProvider, StaticAuthProvider};
pub use memory::MemoryRemoteStore;
pub use records::{GlobalConfigRecord, NarrativesRecord, ProgressSave, UserDataRecord};
pub use store::{HttpRemoteStore, RemoteStore};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("remote returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("not authenticated")]
    NotAuthenticated,

    /// Injected or transport-level outage.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    #[error("session cache error: {0}")]
    Io(#[from] std::io::Error),
}
