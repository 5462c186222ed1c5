//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration. Runs before any network activity.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_source(config.options.url.as_deref(), config.options.list.is_some())?;
    validate_delay(config.options.delay_ms)?;
    validate_batch(config)?;
    validate_retry(config)?;
    validate_tools(config)?;

    if config.http.timeout_secs == 0 {
        return Err(invalid("http.timeout_secs", "Timeout must be greater than zero"));
    }

    Ok(())
}

/// Exactly one of `--url` and `--list` must be given.
pub fn validate_source(url: Option<&str>, has_list: bool) -> Result<()> {
    match (url, has_list) {
        (None, false) => Err(Error::MissingConfig(
            "a share URL (--url) or a list file (--list)".to_string(),
        )),
        (Some(_), true) => Err(invalid("url", "--url and --list are mutually exclusive")),
        (Some(url), false) if url.trim().is_empty() => {
            Err(invalid("url", "Share URL cannot be empty"))
        }
        _ => Ok(()),
    }
}

/// The inter-download delay override must not be negative.
pub fn validate_delay(delay_ms: Option<i64>) -> Result<()> {
    match delay_ms {
        Some(ms) if ms < 0 => Err(invalid(
            "timeout",
            &format!("Delay must be zero or more milliseconds (got {})", ms),
        )),
        _ => Ok(()),
    }
}

fn validate_batch(config: &Config) -> Result<()> {
    if config.batch.concurrency == 0 {
        return Err(invalid("batch.concurrency", "Concurrency must be at least 1"));
    }

    if config.batch.done_log.as_os_str().is_empty() {
        return Err(Error::MissingConfig("batch.done_log".to_string()));
    }

    Ok(())
}

fn validate_retry(config: &Config) -> Result<()> {
    let retry = &config.retry;

    if retry.max_retries == 0 {
        return Err(invalid("retry.max_retries", "At least one attempt is required"));
    }

    if retry.multiplier.is_nan() || retry.multiplier < 1.0 {
        return Err(invalid(
            "retry.multiplier",
            &format!("Multiplier must be 1.0 or more (got {})", retry.multiplier),
        ));
    }

    if retry.initial_delay_ms > retry.max_delay_ms {
        return Err(invalid(
            "retry.initial_delay_ms",
            &format!(
                "Initial delay ({} ms) exceeds max delay ({} ms)",
                retry.initial_delay_ms, retry.max_delay_ms
            ),
        ));
    }

    Ok(())
}

fn validate_tools(config: &Config) -> Result<()> {
    if config.tools.preferred.is_empty() {
        return Err(Error::MissingConfig("tools.preferred".to_string()));
    }

    if config.tools.formats.iter().all(|f| f.trim().is_empty()) {
        return Err(Error::MissingConfig("tools.formats".to_string()));
    }

    let container = config.tools.container.trim_start_matches('.');
    if container.is_empty() || !container.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid(
            "tools.container",
            &format!("Invalid container extension: '{}'", config.tools.container),
        ));
    }

    Ok(())
}

fn invalid(field: &str, message: &str) -> Error {
    Error::ConfigValidation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
