//! Configuration models for the scheduler service.

pub mod scheduler;

pub use scheduler::SchedulerConfig;
