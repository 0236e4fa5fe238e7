//! # Event Bus
//!
//! A type-keyed broadcast bus shared by every slice of the server.
//!
//! Each event type gets its own `tokio::sync::broadcast` channel, created lazily
//! on first publish or subscribe. Publishing never blocks: with no subscribers the
//! event is dropped, and slow subscribers skip ahead instead of stalling writers.
//!
//! # Example
//!
//! ```rust
//! use brgy_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug, PartialEq)]
//! struct ReportFiled { id: u64 }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<ReportFiled>()?;
//!     bus.publish(ReportFiled { id: 7 })?;
//!
//!     let event = rx.next_event().await.expect("channel open");
//!     assert_eq!(event.id, 7);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus};
pub use error::EventBusError;
pub use receiver::EventReceiverExt;
