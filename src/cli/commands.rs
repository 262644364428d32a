//! CLI command implementations

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::auth::{JwtManager, Role};
use crate::config::AppConfig;
use crate::db::Database;
use crate::http_server::{AppState, HttpServer};
use crate::media::{UploadClient, UploadFile, DEFAULT_UPLOAD_TIMEOUT};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Token {
            config,
            subject,
            role,
        } => token(&config, &subject, &role),
        Command::Upload {
            url,
            file,
            content_type,
            config,
            timeout_secs,
        } => {
            let timeout = upload_timeout(timeout_secs, config.as_deref())?;
            upload(&url, &file, content_type.as_deref(), timeout)
        }
    }
}

/// Create the data directory and database
///
/// Refuses to run twice against the same database file.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let db_path = config.database_path();

    if db_path.exists() {
        return Err(CliError::already_initialized());
    }

    for dir in [config.data_path().to_path_buf(), config.object_root()] {
        fs::create_dir_all(&dir).map_err(|e| {
            CliError::config_error(format!("Failed to create directory {:?}: {}", dir, e))
        })?;
    }

    let db = Database::open(&db_path)?;
    let version = db.schema_version()?;

    write_response(json!({
        "initialized": true,
        "database": db_path.display().to_string(),
        "schema_version": version,
    }))
}

/// Open the database and serve HTTP until stopped
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = AppConfig::load(config_path)?;
    let db_path = config.database_path();

    if !db_path.exists() {
        return Err(CliError::not_initialized());
    }
    if let Some(port) = port {
        config.http.port = port;
    }

    // Opening also applies any migrations added since init.
    let db = Database::open(&db_path)?;
    let state = AppState::from_config(&config, db)
        .map_err(|e| CliError::boot_failed(format!("Failed to build services: {}", e)))?;
    let server = HttpServer::new(config.http.clone(), Arc::new(state));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Print a freshly signed bearer token
pub fn token(config_path: &Path, subject: &str, role: &str) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    let role = parse_role(role)?;

    let jwt = JwtManager::new(config.jwt_config());
    let token = jwt
        .issue(subject, role)
        .map_err(|e| CliError::token_failed(e.to_string()))?;

    write_response(json!({
        "token": token,
        "subject": subject,
        "role": role.as_str(),
        "expires_at": jwt.expiration().to_rfc3339(),
    }))
}

/// Deadline for an upload: the flag wins, then the config file, then the default
pub fn upload_timeout(flag_secs: Option<u64>, config_path: Option<&Path>) -> CliResult<Duration> {
    if let Some(secs) = flag_secs {
        if secs == 0 {
            return Err(CliError::config_error("--timeout-secs must be > 0"));
        }
        return Ok(Duration::from_secs(secs));
    }
    match config_path {
        Some(path) => Ok(AppConfig::load(path)?.upload_timeout()),
        None => Ok(DEFAULT_UPLOAD_TIMEOUT),
    }
}

/// PUT a local file to a signed URL
pub fn upload(
    url: &str,
    file_path: &Path,
    content_type: Option<&str>,
    timeout: Duration,
) -> CliResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let status = rt.block_on(async {
        let file = UploadFile::from_path(file_path, content_type)
            .await
            .map_err(|e| {
                CliError::io_error(format!("Failed to read {}: {}", file_path.display(), e))
            })?;
        let client = UploadClient::with_timeout(timeout)
            .map_err(|e| CliError::boot_failed(e.to_string()))?;

        let status = client.upload_and_verify(url, &file).await.into_result()?;
        Ok::<_, CliError>((file.name, status))
    })?;

    write_response(json!({
        "file": status.0,
        "status": status.1,
        "uploaded": true,
    }))
}

fn parse_role(role: &str) -> CliResult<Role> {
    match role {
        "admin" => Ok(Role::Admin),
        "applicant" => Ok(Role::Applicant),
        other => Err(CliError::config_error(format!(
            "Invalid role: '{}'. Must be 'admin' or 'applicant'.",
            other
        ))),
    }
}
