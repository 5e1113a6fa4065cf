//! Infrastructure adapters for the inbound mailbox and room records.

pub mod mailbox;
pub mod records;
pub use mailbox::InboundMailbox;
pub use records::InMemoryRecordStore;
