//! Subtrack Core - Domain entities, services, and traits.
//!
//! This crate contains the recurrence, billing-cycle and reminder logic of
//! the subscription tracker. It is storage-agnostic and defines traits for
//! persistence and notification delivery that hosts implement.

pub mod aggregation;
pub mod amounts;
pub mod constants;
pub mod errors;
pub mod reminders;
pub mod schedule;
pub mod settings;
pub mod subscriptions;
pub mod utils;

// Re-export the domain types hosts use most
pub use subscriptions::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
