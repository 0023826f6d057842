use super::types::{Config, ConfigError};

/// Validate a loaded configuration.
///
/// A missing API key or profile is deliberately not rejected here: that is
/// a per-job configuration failure recorded on the job at orchestration
/// time, so the rest of the service (poller, read APIs) can still run.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.editor.base_url.is_empty() {
        return Err(ConfigError::Invalid("editor.base_url is empty".into()));
    }
    if !config.editor.base_url.starts_with("http://")
        && !config.editor.base_url.starts_with("https://")
    {
        return Err(ConfigError::Invalid(format!(
            "editor.base_url is not an http(s) URL: {}",
            config.editor.base_url
        )));
    }
    if config.editor.timeout_secs == 0 {
        return Err(ConfigError::Invalid("editor.timeout_secs must be > 0".into()));
    }
    if config.pipeline.upload_batch_size == 0 {
        return Err(ConfigError::Invalid(
            "pipeline.upload_batch_size must be > 0".into(),
        ));
    }
    if config.pipeline.poll_interval_secs == 0 {
        return Err(ConfigError::Invalid(
            "pipeline.poll_interval_secs must be > 0".into(),
        ));
    }
    if config.pipeline.scan_max_pages == 0 {
        return Err(ConfigError::Invalid(
            "pipeline.scan_max_pages must be > 0".into(),
        ));
    }
    Ok(())
}
