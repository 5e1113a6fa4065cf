//! Serializable value types shared across the scheduler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;

/// Room identifier; the unique key of a request.
pub type RoomId = u32;

/// Priority tier derived from the requested fan speed.
///
/// Ordering follows priority: `Low < Mid < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Fan speed 1.
    Low = 1,
    /// Fan speed 2.
    Mid = 2,
    /// Fan speed 3.
    High = 3,
}

impl Tier {
    /// All tiers from highest to lowest priority.
    pub const DESCENDING: [Self; 3] = [Self::High, Self::Mid, Self::Low];

    /// Map a requested fan speed to its tier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidPriority`] for any speed outside `1..=3`.
    pub fn from_speed(speed: u8) -> Result<Self, SchedulerError> {
        match speed {
            1 => Ok(Self::Low),
            2 => Ok(Self::Mid),
            3 => Ok(Self::High),
            other => Err(SchedulerError::InvalidPriority(other)),
        }
    }

    /// Integer rank of the tier (1, 2 or 3). Empty slots rank 0.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Fan speed delivered while a request of this tier is served.
    #[must_use]
    pub const fn speed(self) -> u8 {
        self.rank()
    }

    pub(crate) const fn index(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Mid => write!(f, "mid"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Power status declared by a room's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Unit is on and wants airflow.
    On,
    /// Unit is powered off.
    #[default]
    Off,
    /// Unit is hibernating: powered but not asking for airflow.
    Hibernate,
}

impl RoomStatus {
    /// Whether this status asks the scheduler for airflow.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::On)
    }
}

impl FromStr for RoomStatus {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(Self::On),
            "off" | "poweroff" => Ok(Self::Off),
            "hibernate" => Ok(Self::Hibernate),
            _ => Err(SchedulerError::InvalidStatus(s.to_string())),
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => write!(f, "on"),
            Self::Off => write!(f, "off"),
            Self::Hibernate => write!(f, "hibernate"),
        }
    }
}
