//! Configuration for the poll coordinator

use std::time::Duration;

/// Configuration for [`PollCoordinator`](crate::PollCoordinator)
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval between scheduled refresh cycles
    /// Default: 30 seconds
    pub update_interval: Duration,

    /// How long a device's optimistic command state suppresses scheduled
    /// cycles before the next one reconciles it anyway
    /// Default: 30 seconds
    pub optimistic_hold: Duration,

    /// Fetch pool water-quality telemetry each cycle
    /// Default: true
    pub fetch_water_quality: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(30),
            optimistic_hold: Duration::from_secs(30),
            fetch_water_quality: true,
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.update_interval == Duration::ZERO {
            return Err("update_interval must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn with_optimistic_hold(mut self, hold: Duration) -> Self {
        self.optimistic_hold = hold;
        self
    }

    pub fn with_water_quality(mut self, enabled: bool) -> Self {
        self.fetch_water_quality = enabled;
        self
    }
}
