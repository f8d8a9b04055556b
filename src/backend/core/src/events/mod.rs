//! Container Event Log
//!
//! This module provides the append-only observation log:
//!
//! - **`event`**: `ContainerEvent`, the closed `ContainerState` set, and the derived
//!   `VerifiedContainer` / `ContainerTally` views.
//! - **`store`**: The `EventStore` trait (append, per-container fetch, store-wide tally).
//! - **`memory`**: `InMemoryEventStore`, a lock-guarded in-process implementation.
//! - **`postgres`**: `PgEventStore`, the durable implementation over sqlx.

pub mod event;
pub mod memory;
pub mod postgres;
pub mod store;

pub use event::*;
pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;
pub use store::EventStore;
