//! # Bookery Testing
//!
//! Deterministic test doubles for the Bookery workflow:
//!
//! - [`FixedClock`]: pinned time, reproducible timestamps
//! - [`InMemoryCatalog`], [`InMemoryOrders`], [`InMemoryUsers`]:
//!   in-memory implementations of the core store traits with the same
//!   single-document atomicity and revision semantics an external
//!   document database would provide
//! - [`fixtures`]: ready-made books and users
//!
//! The server binary reuses the in-memory stores when no external
//! database is wired in, so they live here rather than behind
//! `#[cfg(test)]`.
//!
//! ## Example
//!
//! ```
//! use bookery_core::{OrderService, PageRequest};
//! use bookery_testing::{fixtures, test_clock, InMemoryCatalog, InMemoryOrders};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = OrderService::new(
//!     Arc::new(InMemoryCatalog::new()),
//!     Arc::new(InMemoryOrders::new()),
//!     Arc::new(test_clock()),
//! );
//!
//! let caller = fixtures::customer("reader");
//! let mine = service.my_orders(&caller, PageRequest::default()).await;
//! assert_eq!(mine.map(|page| page.total), Ok(0));
//! # }
//! ```

pub mod catalog;
pub mod clock;
pub mod fixtures;
pub mod orders;
pub mod users;

pub use catalog::InMemoryCatalog;
pub use clock::{test_clock, FixedClock};
pub use orders::InMemoryOrders;
pub use users::InMemoryUsers;
