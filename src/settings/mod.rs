//! # Settings
//!
//! Administrator-editable key/value settings read by feature gates.

pub mod errors;
pub mod store;

pub use errors::{SettingsError, SettingsResult};
pub use store::{parse_flag, SettingEntry, SettingsStore, APPLICATIONS_OPEN};
