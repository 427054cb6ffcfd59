use std::env;
use std::time::Duration;

const DEFAULT_COMMAND_CAPACITY: usize = 16;
const DEFAULT_EVENT_CAPACITY: usize = 64;
const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1000;
const DEFAULT_SAVE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CAPABILITY_MAX_AGE_SECS: u64 = 86_400;
const DEFAULT_SUBFOLDER: &str = "Recordings";

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub command_capacity: usize,
    pub event_capacity: usize,
    /// Cadence at which the encoder emits chunks during capture.
    pub flush_interval: Duration,
    /// Deadline on finalize-and-save; expiry becomes a saving error with a
    /// timeout reason instead of a session stuck in `Saving`.
    pub save_timeout: Duration,
    /// Maximum age of a cached directory capability's last validation.
    pub capability_max_age: Duration,
    /// Well-known subfolder created beneath the granted directory.
    pub subfolder: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ControllerConfig {
    pub fn from_env() -> Self {
        Self {
            command_capacity: env::var("RECAP_COMMAND_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COMMAND_CAPACITY),
            event_capacity: env::var("RECAP_EVENT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_EVENT_CAPACITY),
            flush_interval: Duration::from_millis(
                env::var("RECAP_FLUSH_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_FLUSH_INTERVAL_MS),
            ),
            save_timeout: Duration::from_secs(
                env::var("RECAP_SAVE_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_SAVE_TIMEOUT_SECS),
            ),
            capability_max_age: Duration::from_secs(
                env::var("RECAP_CAPABILITY_MAX_AGE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CAPABILITY_MAX_AGE_SECS),
            ),
            subfolder: env::var("RECAP_SUBFOLDER").unwrap_or_else(|_| DEFAULT_SUBFOLDER.into()),
        }
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    pub fn with_save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = timeout;
        self
    }

    pub fn with_capability_max_age(mut self, max_age: Duration) -> Self {
        self.capability_max_age = max_age;
        self
    }

    pub fn with_subfolder(mut self, subfolder: impl Into<String>) -> Self {
        self.subfolder = subfolder.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = ControllerConfig::from_env();
        assert_eq!(config.command_capacity, DEFAULT_COMMAND_CAPACITY);
        assert_eq!(config.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(
            config.flush_interval,
            Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS)
        );
        assert_eq!(
            config.save_timeout,
            Duration::from_secs(DEFAULT_SAVE_TIMEOUT_SECS)
        );
        assert_eq!(config.subfolder, DEFAULT_SUBFOLDER);
    }

    #[test]
    fn builder_overrides() {
        let config = ControllerConfig::from_env()
            .with_command_capacity(4)
            .with_event_capacity(8)
            .with_flush_interval(Duration::from_millis(50))
            .with_save_timeout(Duration::from_secs(5))
            .with_capability_max_age(Duration::from_secs(60))
            .with_subfolder("Clips");

        assert_eq!(config.command_capacity, 4);
        assert_eq!(config.event_capacity, 8);
        assert_eq!(config.flush_interval, Duration::from_millis(50));
        assert_eq!(config.save_timeout, Duration::from_secs(5));
        assert_eq!(config.capability_max_age, Duration::from_secs(60));
        assert_eq!(config.subfolder, "Clips");
    }
}
