//! # HVAC Parking Lot
//!
//! A priority admission and preemption scheduler that multiplexes a fixed number
//! of air-handling units among room requests.
//!
//! Rooms ask for airflow at one of three fan speeds. At most `instance_count`
//! rooms are served at once; everything else parks in one FIFO queue per speed
//! tier and is woken when a slot frees up or when it outranks a served room.
//!
//! ## Core Problem Solved
//!
//! - **Scarce units**: far more rooms than air-handling units
//! - **Fairness within a tier**: arrival order decides among equal speeds
//! - **Billing**: waiting time is accumulated per request and reported when
//!   the request leaves the system
//!
//! ## Key Features
//!
//! - **Greedy Reconciliation**: each pass fills free slots from the highest tier,
//!   then swaps the weakest served request for a stronger waiter while one exists
//! - **Single Writer**: one scheduling thread owns all state; API producers only
//!   append to a mailbox guarded by a lock and a not-empty signal
//! - **Observer Callbacks**: service start/stop and final wait time are pushed
//!   to pluggable [`ServiceObserver`](crate::core::ServiceObserver)s (tracing, audit buffer, usage log,
//!   channel)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use hvac_parking_lot::builders::build_in_memory_service;
//! use hvac_parking_lot::config::SchedulerConfig;
//! use hvac_parking_lot::util::serde::RoomStatus;
//!
//! let (service, handles) = build_in_memory_service(SchedulerConfig::default())?;
//! service.submit_event(101, RoomStatus::On, 22.0, 3)?;
//! service.settle(Duration::from_secs(1))?;
//! assert_eq!(service.current_speed(101), 3);
//! let final_state = service.shutdown()?;
//! ```
//!
//! For complete scenarios, see `tests/scheduler_scenarios_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: requests, slots, tier queues and the scheduler.
pub mod core;
/// Configuration models for the scheduler service.
pub mod config;
/// Builders to construct scheduler components from configuration.
pub mod builders;
/// Infrastructure adapters for the inbound mailbox and room records.
pub mod infra;
/// Scheduling thread and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
