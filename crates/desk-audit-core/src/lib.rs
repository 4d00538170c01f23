pub mod apps;
pub mod config;
pub mod confirm;
pub mod error;
pub mod inventory;
pub mod paths;
pub mod policy;
pub mod profiles;
pub mod progress;
pub mod report;

pub use config::AppConfig;
pub use confirm::{Confirm, FixedAnswer};
pub use error::{Error, Result};
pub use progress::{ProgressReporter, SilentReporter};
