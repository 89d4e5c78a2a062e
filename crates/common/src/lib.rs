pub mod config;
pub mod error;
pub mod repository;
pub mod types;

pub use config::Config;
pub use error::{Error, FieldErrors, Result};
pub use repository::{PreferenceStore, SignalRepository};
pub use types::*;
