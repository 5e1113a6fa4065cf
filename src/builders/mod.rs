//! Builders to construct scheduler components from configuration.

pub mod service_builder;

pub use service_builder::{build_in_memory_service, build_scheduler, build_service, InMemoryHandles};
