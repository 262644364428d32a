//! Observable events
//!
//! Every log line the service emits names one of these events.

use std::fmt;

use super::logger::Severity;

/// Observable events in entrydesk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded and validated
    ConfigLoaded,
    /// HTTP server bound and serving
    ServerStarted,
    /// A schema migration was applied
    MigrationApplied,

    // Form schemas
    /// New (inactive) form schema version stored
    FormSchemaCreated,
    /// Content fields of a version changed
    FormSchemaUpdated,
    /// A version became the single active version
    FormSchemaActivated,
    /// A version was deleted
    FormSchemaRemoved,

    // Settings
    /// A setting value was written
    SettingUpdated,

    // Media
    /// A presigned upload grant was issued
    UploadGrantIssued,
    /// A signed object write was refused
    UploadRejected,
    /// A signed object write was persisted
    ObjectStored,
    /// Client-side upload finished (either outcome)
    UploadFinished,

    // Requests
    /// Bearer credential missing or invalid
    AuthRejected,
    /// Request failed with a server-side error
    RequestFailed,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerStarted => "SERVER_STARTED",
            Event::MigrationApplied => "MIGRATION_APPLIED",
            Event::FormSchemaCreated => "FORM_SCHEMA_CREATED",
            Event::FormSchemaUpdated => "FORM_SCHEMA_UPDATED",
            Event::FormSchemaActivated => "FORM_SCHEMA_ACTIVATED",
            Event::FormSchemaRemoved => "FORM_SCHEMA_REMOVED",
            Event::SettingUpdated => "SETTING_UPDATED",
            Event::UploadGrantIssued => "UPLOAD_GRANT_ISSUED",
            Event::UploadRejected => "UPLOAD_REJECTED",
            Event::ObjectStored => "OBJECT_STORED",
            Event::UploadFinished => "UPLOAD_FINISHED",
            Event::AuthRejected => "AUTH_REJECTED",
            Event::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::UploadRejected | Event::AuthRejected => Severity::Warn,
            Event::RequestFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
