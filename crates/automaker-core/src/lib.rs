pub mod credentials;
pub mod document;
pub mod error;
pub mod io;
pub mod migration;
pub mod paths;
pub mod resolve;
pub mod store;
pub mod types;

pub use error::{AutomakerError, Result};
pub use store::{Load, SettingsStore};
