//! entrydesk - back-office service for application forms and media uploads
//!
//! Administrators manage versioned form schemas with exactly one active
//! version, and feature settings. Applicants upload media directly to
//! storage through short-lived presigned write URLs.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod file_storage;
pub mod form_schema;
pub mod http_server;
pub mod media;
pub mod observability;
pub mod settings;
