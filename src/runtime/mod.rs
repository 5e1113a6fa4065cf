//! Scheduling runtime and API surface.

pub mod api;
pub mod service;

pub use api::{submit, EventSubmission, Health, UpdateResponse};
pub use service::SchedulerService;
