//! Builders to construct the scheduler and its service from configuration.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::core::{
    CompositeObserver, InMemoryAuditSink, RecordStore, Scheduler, SchedulerError,
    ServiceObserver, TracingObserver, UsageLog,
};
use crate::infra::InMemoryRecordStore;
use crate::runtime::SchedulerService;
use crate::util::clock::{Clock, SystemClock};

/// In-memory collaborators created by [`build_in_memory_service`].
pub struct InMemoryHandles {
    /// Room records.
    pub records: Arc<InMemoryRecordStore>,
    /// Bounded audit trail.
    pub audit: Arc<InMemoryAuditSink>,
    /// Per-room usage log.
    pub usage: Arc<UsageLog>,
}

/// Build a scheduler from configuration and collaborators.
///
/// # Errors
///
/// [`SchedulerError::InvalidConfig`] if the configuration is invalid.
pub fn build_scheduler(
    cfg: &SchedulerConfig,
    records: Arc<dyn RecordStore>,
    observer: Arc<dyn ServiceObserver>,
    clock: Arc<dyn Clock>,
) -> Result<Scheduler, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    Ok(Scheduler::new(cfg.instance_count, records, observer, clock))
}

/// Build and start a service on the system clock.
///
/// # Errors
///
/// Invalid configuration or thread spawn failure.
pub fn build_service(
    cfg: SchedulerConfig,
    records: Arc<dyn RecordStore>,
    observer: Arc<dyn ServiceObserver>,
) -> Result<SchedulerService, SchedulerError> {
    let scheduler = build_scheduler(&cfg, records, observer, Arc::new(SystemClock))?;
    SchedulerService::start(cfg, scheduler)
}

/// Build and start a service backed entirely by in-memory collaborators.
///
/// Rooms `1..=room_count` are registered in the default off state; every
/// callback is logged, kept in a bounded audit buffer and in a usage log.
///
/// # Errors
///
/// Invalid configuration or thread spawn failure.
pub fn build_in_memory_service(
    cfg: SchedulerConfig,
) -> Result<(SchedulerService, InMemoryHandles), SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    let handles = InMemoryHandles {
        records: Arc::new(InMemoryRecordStore::with_rooms(cfg.room_count)),
        audit: Arc::new(InMemoryAuditSink::new(cfg.audit_buffer)),
        usage: Arc::new(UsageLog::with_capacity(cfg.audit_buffer)),
    };
    let observer = CompositeObserver::new()
        .with(Arc::new(TracingObserver))
        .with(handles.audit.clone())
        .with(handles.usage.clone());
    let service = build_service(cfg, handles.records.clone(), Arc::new(observer))?;
    Ok((service, handles))
}
