//! Core scheduling abstractions: requests, slots, tier queues and the scheduler.

pub mod audit;
pub mod cluster;
pub mod error;
pub mod queues;
pub mod records;
pub mod request;
pub mod scheduler;

pub use audit::{
    build_audit_event, AuditEvent, ChannelObserver, CompositeObserver, InMemoryAuditSink,
    ServiceAction, ServiceObserver, TracingObserver, UsageLog, UsageRecord,
};
pub use cluster::{ClusterSnapshot, ServingCluster, ServingInstance};
pub use error::{AppResult, SchedulerError};
pub use queues::PriorityQueueSet;
pub use records::{RecordStore, RoomRecord};
pub use request::AirRequest;
pub use scheduler::{
    EventClass, InboundEvent, ReconcileReport, SchedulerSnapshot, SchedulerState, ServedRoom,
    Scheduler,
};
