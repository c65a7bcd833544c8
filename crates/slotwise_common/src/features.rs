//! Runtime feature switches.
//!
//! A feature is on when its `use_*` flag is set and its config section exists.
//! Email piggybacks on the Google section because mail is sent through the
//! same delegated service account.

use slotwise_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar gateway should be built.
pub fn is_gcal_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gcal, config.gcal.as_ref())
}

/// Check if notification emails should be sent.
pub fn is_email_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_email, config.gcal.as_ref())
}
