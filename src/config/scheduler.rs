//! Scheduler service configuration.

use std::env;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;
use crate::util::serde::RoomId;

const ENV_INSTANCE_COUNT: &str = "HVAC_INSTANCE_COUNT";
const ENV_ROOM_COUNT: &str = "HVAC_ROOM_COUNT";
const ENV_AUDIT_BUFFER: &str = "HVAC_AUDIT_BUFFER";
const ENV_THREAD_NAME: &str = "HVAC_THREAD_NAME";

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of physical serving slots.
    #[serde(default = "default_instance_count")]
    pub instance_count: usize,
    /// Rooms are numbered `1..=room_count`.
    #[serde(default = "default_room_count")]
    pub room_count: RoomId,
    /// Capacity of the in-memory audit buffer.
    #[serde(default = "default_audit_buffer")]
    pub audit_buffer: usize,
    /// Name of the scheduling thread.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

const fn default_instance_count() -> usize {
    3
}

const fn default_room_count() -> RoomId {
    200
}

const fn default_audit_buffer() -> usize {
    1024
}

fn default_thread_name() -> String {
    "hvac-scheduler".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            instance_count: default_instance_count(),
            room_count: default_room_count(),
            audit_buffer: default_audit_buffer(),
            thread_name: default_thread_name(),
        }
    }
}

impl SchedulerConfig {
    /// Set the number of serving slots.
    #[must_use]
    pub const fn with_instance_count(mut self, instance_count: usize) -> Self {
        self.instance_count = instance_count;
        self
    }

    /// Set the number of rooms.
    #[must_use]
    pub const fn with_room_count(mut self, room_count: RoomId) -> Self {
        self.room_count = room_count;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.instance_count == 0 {
            return Err("instance_count must be greater than 0".into());
        }
        if self.room_count == 0 {
            return Err("room_count must be greater than 0".into());
        }
        if self.audit_buffer == 0 {
            return Err("audit_buffer must be greater than 0".into());
        }
        if self.thread_name.trim().is_empty() {
            return Err("thread_name must not be empty".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from environment variables (and a `.env` file if present) over
    /// the defaults.
    ///
    /// # Errors
    ///
    /// A variable that does not parse, or an invalid result.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();
        let cfg = Self {
            instance_count: env_or(ENV_INSTANCE_COUNT, defaults.instance_count)?,
            room_count: env_or(ENV_ROOM_COUNT, defaults.room_count)?,
            audit_buffer: env_or(ENV_AUDIT_BUFFER, defaults.audit_buffer)?,
            thread_name: env::var(ENV_THREAD_NAME).unwrap_or(defaults.thread_name),
        };
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn env_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} is not valid: {raw:?}")),
        Err(_) => Ok(default),
    }
}
