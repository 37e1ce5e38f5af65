pub mod models;
pub mod store;

pub use models::{Preferences, Theme, DEFAULT_REFRESH_INTERVAL_SECS};
pub use store::PreferenceStore;

use crate::{storage::StorageError, units::UnknownUnit};

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("refresh interval must be a positive number of seconds, got {0}")]
    InvalidRefreshInterval(i64),
    #[error(transparent)]
    UnknownUnit(#[from] UnknownUnit),
    #[error("unknown theme: {0:?}")]
    UnknownTheme(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
