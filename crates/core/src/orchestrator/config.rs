//! Orchestrator configuration and profile selection.

use crate::config::Config;

use super::types::OrchestratorError;

/// Configuration for the job orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Concurrent uploads per batch; batches run sequentially.
    pub upload_batch_size: usize,
    /// Editing profile for RAW batches.
    pub raw_profile_id: Option<String>,
    /// Editing profile for JPG-only batches.
    pub jpg_profile_id: Option<String>,
    /// Whether an editing credential is configured at all.
    pub credential_configured: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            upload_batch_size: 5,
            raw_profile_id: None,
            jpg_profile_id: None,
            credential_configured: false,
        }
    }
}

impl OrchestratorConfig {
    /// Derive orchestrator settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_batch_size: config.pipeline.upload_batch_size,
            raw_profile_id: config.editor.raw_profile_id.clone(),
            jpg_profile_id: config.editor.jpg_profile_id.clone(),
            credential_configured: !config.editor.api_key.is_empty(),
        }
    }

    /// Resolve the editing profile for a batch.
    ///
    /// An explicit override always wins; otherwise the JPG profile is used
    /// when every staged key has a JPG extension, the RAW profile when not.
    /// Missing credential or profile is a configuration error — the job
    /// fails before any remote call is made.
    pub fn resolve_profile(
        &self,
        raw_keys: &[String],
        override_id: Option<&str>,
    ) -> Result<String, OrchestratorError> {
        if !self.credential_configured {
            return Err(OrchestratorError::Configuration(
                "no editing credential configured".to_string(),
            ));
        }

        if let Some(profile_id) = override_id {
            return Ok(profile_id.to_string());
        }

        let (profile, kind) = if is_jpg_batch(raw_keys) {
            (&self.jpg_profile_id, "jpg")
        } else {
            (&self.raw_profile_id, "raw")
        };

        profile.clone().ok_or_else(|| {
            OrchestratorError::Configuration(format!("no {} profile configured", kind))
        })
    }
}

/// True when every key has a `.jpg`/`.jpeg` extension (case-insensitive).
fn is_jpg_batch(raw_keys: &[String]) -> bool {
    raw_keys.iter().all(|key| {
        let lower = key.to_ascii_lowercase();
        lower.ends_with(".jpg") || lower.ends_with(".jpeg")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OrchestratorConfig {
        OrchestratorConfig {
            upload_batch_size: 5,
            raw_profile_id: Some("profile-raw".to_string()),
            jpg_profile_id: Some("profile-jpg".to_string()),
            credential_configured: true,
        }
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("staging/{}", n)).collect()
    }

    #[test]
    fn test_jpg_only_batch_selects_jpg_profile() {
        let profile = config()
            .resolve_profile(&keys(&["a.jpg", "b.JPEG", "c.Jpg"]), None)
            .unwrap();
        assert_eq!(profile, "profile-jpg");
    }

    #[test]
    fn test_mixed_batch_selects_raw_profile() {
        let profile = config()
            .resolve_profile(&keys(&["a.jpg", "b.CR2"]), None)
            .unwrap();
        assert_eq!(profile, "profile-raw");
    }

    #[test]
    fn test_raw_batch_selects_raw_profile() {
        let profile = config()
            .resolve_profile(&keys(&["a.NEF", "b.CR3"]), None)
            .unwrap();
        assert_eq!(profile, "profile-raw");
    }

    #[test]
    fn test_explicit_override_wins() {
        let profile = config()
            .resolve_profile(&keys(&["a.jpg"]), Some("profile-custom"))
            .unwrap();
        assert_eq!(profile, "profile-custom");
    }

    #[test]
    fn test_missing_credential_fails() {
        let mut cfg = config();
        cfg.credential_configured = false;
        let result = cfg.resolve_profile(&keys(&["a.CR2"]), None);
        assert!(matches!(result, Err(OrchestratorError::Configuration(_))));
    }

    #[test]
    fn test_missing_profile_fails() {
        let mut cfg = config();
        cfg.raw_profile_id = None;
        let result = cfg.resolve_profile(&keys(&["a.CR2"]), None);
        assert!(matches!(result, Err(OrchestratorError::Configuration(_))));
    }

    #[test]
    fn test_override_skips_profile_lookup() {
        let mut cfg = config();
        cfg.raw_profile_id = None;
        cfg.jpg_profile_id = None;
        let profile = cfg
            .resolve_profile(&keys(&["a.CR2"]), Some("profile-x"))
            .unwrap();
        assert_eq!(profile, "profile-x");
    }
}
