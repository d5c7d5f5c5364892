use std::env;

use tracing::Dispatch;
use tracing_subscriber::{
    Registry, filter::Targets, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use crate::{
    Result, SettingsError,
    logging::{LogLevel, LoggingContext},
};

/// Environment variable selecting `pretty` or `json` output.
pub const LOG_FORMAT_VAR: &str = "PLUGIN_SETTINGS_LOG_FORMAT";

/// Initialize tracing for the process and return the context controlling it.
///
/// Directives from `RUST_LOG` are honoured; `default` applies to every target
/// they leave unspecified. Output is pretty unless `PLUGIN_SETTINGS_LOG_FORMAT`
/// is `json`.
///
/// # Errors
/// Returns `SettingsError::Logging` if a global subscriber is already set.
pub fn init(default: LogLevel) -> Result<LoggingContext> {
    let (filter, handle) = reload::Layer::new(initial_targets(default));
    let format = env::var(LOG_FORMAT_VAR).unwrap_or_else(|_| "pretty".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_target(true).with_level(true))
            .try_init(),
        _ => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.map_err(|e| SettingsError::Logging(e.to_string()))?;

    Ok(LoggingContext::from_handle(handle))
}

/// Build a subscriber without installing it globally.
///
/// The returned dispatcher keeps the filter alive; use it with
/// `tracing::dispatcher::with_default` or `set_default`.
pub fn scoped(default: LogLevel) -> (LoggingContext, Dispatch) {
    let (filter, handle) =
        reload::Layer::<Targets, Registry>::new(Targets::new().with_default(default.as_filter()));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_test_writer());

    (LoggingContext::from_handle(handle), Dispatch::new(subscriber))
}

fn initial_targets(default: LogLevel) -> Targets {
    let from_env = env::var("RUST_LOG")
        .ok()
        .and_then(|directives| directives.parse::<Targets>().ok());

    match from_env {
        Some(targets) if targets.default_level().is_some() => targets,
        Some(targets) => targets.with_default(default.as_filter()),
        None => Targets::new().with_default(default.as_filter()),
    }
}
