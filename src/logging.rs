//! # Structured Logging Module
//!
//! Environment-aware structured logging for hosts embedding hook chains, plus
//! helpers that give registry and invocation events consistent fields.

use crate::error::HandlerInvocationError;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// `RUST_LOG` wins over the environment default when set. Output is JSON when
/// `TASKER_LOG_FORMAT=json`, human-readable otherwise.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = if use_json_format() {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        // A host or test harness may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
        }

        tracing::info!(environment = %environment, "Structured logging initialized");
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("TASKER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn use_json_format() -> bool {
    std::env::var("TASKER_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for registry operations
pub fn log_registry_operation(
    operation: &str,
    handler: &str,
    priority: Option<i64>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        handler = %handler,
        priority = priority,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "REGISTRY_OPERATION"
    );
}

/// Log a handler failure that aborted an invocation
pub fn log_invocation_failure(error: &HandlerInvocationError) {
    tracing::error!(
        handler = %error.handler,
        hook_point = %error.hook_point,
        position = error.position,
        cause = %error.cause,
        panicked = error.is_panic(),
        bypassed_at_failure = error.bypassed_at_failure,
        completed_at_failure = error.completed_at_failure,
        timestamp = %Utc::now().to_rfc3339(),
        "HOOK_INVOCATION_FAILED"
    );
}
