//! # Form Schemas
//!
//! Versioned application form definitions. Administrators create and edit
//! versions; exactly one version at a time is served to applicants.

pub mod errors;
pub mod store;
pub mod types;

pub use errors::{FormSchemaError, FormSchemaResult};
pub use store::ActiveVersionStore;
pub use types::{FormSchemaPatch, FormSchemaVersion, NewFormSchema};
