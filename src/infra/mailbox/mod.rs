//! Inbound mailbox backends.

pub mod memory;

pub use memory::InboundMailbox;
