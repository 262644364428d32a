//! Observability for entrydesk
//!
//! Structured JSON logging keyed by typed events.
//!
//! # Usage
//!
//! ```ignore
//! use entrydesk::observability::{log_event, Event};
//!
//! log_event(Event::FormSchemaActivated, &[("id", "2")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log an event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
